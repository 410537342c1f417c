//! Drill orchestrator.
//!
//! Action-based driver: the runtime feeds it [`ServerEvent`]s and
//! executes the [`ServerAction`]s it returns. The driver itself does
//! no I/O beyond the synchronous drill store, which keeps the whole
//! request pipeline testable without sockets.
//!
//! Persistence happens inside the driver, before any broadcast or
//! delivery action is emitted. A drill that fails to store produces an
//! error reply and nothing else, so no notification can ever reference
//! a drill that isn't durably recorded.

use drillcast_core::{Environment, Room, drill};
use drillcast_proto::{ClientRequest, ErrorReply, Role, ServerMessage};

use crate::{
    directory::Directory,
    notify::SmsTarget,
    registry::{SessionInfo, SessionRegistry},
    server_error::ServerError,
    storage::{DrillStore, StorageError},
};

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Maximum concurrent sessions. Connections beyond this are
    /// closed on accept.
    pub max_connections: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { max_connections: 10_000 }
    }
}

/// Events the driver processes.
///
/// Produced by the external runtime (production or tests).
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// A new connection was accepted.
    ConnectionAccepted {
        /// Unique session id assigned by the runtime.
        session_id: u64,
    },

    /// A decoded request arrived from a session.
    RequestReceived {
        /// Session that sent the request.
        session_id: u64,
        /// The decoded request.
        request: ClientRequest,
    },

    /// A connection was closed (by peer or error).
    ConnectionClosed {
        /// Session that was closed.
        session_id: u64,
        /// Reason for closure.
        reason: String,
    },
}

/// Actions the driver produces.
///
/// Executed by runtime-specific code.
#[derive(Debug, Clone)]
pub enum ServerAction {
    /// Send a message to one session.
    SendToSession {
        /// Target session.
        session_id: u64,
        /// Message to send.
        message: ServerMessage,
    },

    /// Send a message to every current member of a room.
    BroadcastToRoom {
        /// Target room.
        room: Room,
        /// Message to broadcast.
        message: ServerMessage,
    },

    /// Run the SMS fan-out for an already-stored alert, then reply
    /// [`ServerMessage::AlertDelivered`] to the requesting session.
    DeliverAlert {
        /// Session awaiting the aggregate outcome.
        session_id: u64,
        /// The stored alert.
        drill: drillcast_proto::Drill,
        /// Roster members to notify.
        targets: Vec<SmsTarget>,
    },

    /// Close a connection.
    CloseConnection {
        /// Session to close.
        session_id: u64,
        /// Reason for closure.
        reason: String,
    },
}

/// Action-based drill driver.
///
/// Owns the session registry and routes every request through storage
/// and the member directory.
pub struct DrillDriver<E, S, D>
where
    E: Environment,
    S: DrillStore,
    D: Directory,
{
    /// Session/room registry.
    pub(crate) registry: SessionRegistry,
    /// Drill and response persistence.
    storage: S,
    /// Member directory, for roster targeting and response joins.
    directory: D,
    /// Environment (clock, RNG).
    env: E,
    /// Driver configuration.
    config: DriverConfig,
}

impl<E, S, D> DrillDriver<E, S, D>
where
    E: Environment,
    S: DrillStore,
    D: Directory,
{
    /// Create a new driver.
    pub fn new(env: E, storage: S, directory: D, config: DriverConfig) -> Self {
        Self { registry: SessionRegistry::new(), storage, directory, env, config }
    }

    /// Process one event and return the actions to execute.
    pub fn process_event(&mut self, event: ServerEvent) -> Result<Vec<ServerAction>, ServerError> {
        match event {
            ServerEvent::ConnectionAccepted { session_id } => {
                self.handle_connection_accepted(session_id)
            },
            ServerEvent::RequestReceived { session_id, request } => {
                self.handle_request(session_id, request)
            },
            ServerEvent::ConnectionClosed { session_id, reason } => {
                self.handle_connection_closed(session_id, &reason)
            },
        }
    }

    fn handle_connection_accepted(
        &mut self,
        session_id: u64,
    ) -> Result<Vec<ServerAction>, ServerError> {
        if self.registry.session_count() >= self.config.max_connections {
            return Ok(vec![ServerAction::CloseConnection {
                session_id,
                reason: "max connections exceeded".to_string(),
            }]);
        }

        self.registry.register_session(session_id);
        tracing::debug!(session_id, "connection accepted");
        Ok(Vec::new())
    }

    fn handle_connection_closed(
        &mut self,
        session_id: u64,
        reason: &str,
    ) -> Result<Vec<ServerAction>, ServerError> {
        if let Some((info, rooms)) = self.registry.unregister_session(session_id) {
            tracing::info!(
                session_id,
                username = info.username.as_deref().unwrap_or("-"),
                rooms = rooms.len(),
                reason,
                "connection closed"
            );
        }
        Ok(Vec::new())
    }

    fn handle_request(
        &mut self,
        session_id: u64,
        request: ClientRequest,
    ) -> Result<Vec<ServerAction>, ServerError> {
        if !self.registry.has_session(session_id) {
            return Err(ServerError::SessionNotFound(session_id));
        }

        match request {
            ClientRequest::Join { role, class, username, user_id } => {
                Ok(self.handle_join(session_id, role, class, username, user_id))
            },
            ClientRequest::StartDrill { kind, class, message, started_by } => {
                Ok(self.handle_start_drill(session_id, &kind, &class, &message, &started_by))
            },
            ClientRequest::SendAlert { kind, class, message, started_by } => {
                Ok(self.handle_send_alert(session_id, &kind, &class, &message, &started_by))
            },
            ClientRequest::MarkSafe { drill_id, student_id } => {
                Ok(self.handle_mark_safe(session_id, drill_id, student_id))
            },
            ClientRequest::CurrentDrill { class } => {
                Ok(self.handle_current_drill(session_id, &class))
            },
            ClientRequest::ListReports => Ok(self.handle_list_reports(session_id)),
            ClientRequest::ListResponses { drill_id } => {
                Ok(self.handle_list_responses(session_id, drill_id))
            },
        }
    }

    /// Join puts a session into its role room and, when present, its
    /// class room. Membership is set based, so repeat joins are no-ops.
    fn handle_join(
        &mut self,
        session_id: u64,
        role: Role,
        class: Option<String>,
        username: String,
        user_id: u64,
    ) -> Vec<ServerAction> {
        self.registry.subscribe(session_id, Room::Role(role));
        if let Some(class) = class.as_deref().filter(|c| !c.trim().is_empty()) {
            self.registry.subscribe(session_id, Room::class(class));
        }

        tracing::debug!(session_id, %username, %role, class = class.as_deref(), "session joined");
        self.registry.set_info(session_id, SessionInfo::joined(role, class, username, user_id));
        Vec::new()
    }

    fn handle_start_drill(
        &mut self,
        session_id: u64,
        kind: &str,
        class: &str,
        message: &str,
        started_by: &str,
    ) -> Vec<ServerAction> {
        if let Err(e) = drill::validate_request(kind, class) {
            return vec![error_reply(session_id, ErrorReply::validation(e.to_string()))];
        }

        let started_at_ms = self.env.wall_clock_millis();
        let stored =
            match self.storage.create_drill(kind, class, message, started_by, started_at_ms) {
                Ok(drill) => drill,
                Err(e) => {
                    tracing::error!(error = %e, kind, class, "drill insert failed");
                    return vec![error_reply(session_id, ErrorReply::storage(e.to_string()))];
                },
            };

        tracing::info!(drill_id = stored.id, kind, class, started_by, "drill started");

        let mut actions: Vec<ServerAction> = Room::audiences_for(&stored.class)
            .into_iter()
            .map(|room| ServerAction::BroadcastToRoom {
                room,
                message: ServerMessage::DrillStarted(stored.clone()),
            })
            .collect();
        actions.push(ServerAction::SendToSession {
            session_id,
            message: ServerMessage::DrillCreated(stored),
        });
        actions
    }

    /// Alerts are drills with an SMS fan-out attached. The record is
    /// stored and broadcast first; delivery is handed to the runtime
    /// as a [`ServerAction::DeliverAlert`] and its aggregate outcome
    /// reaches the caller as [`ServerMessage::AlertDelivered`].
    fn handle_send_alert(
        &mut self,
        session_id: u64,
        kind: &str,
        class: &str,
        message: &str,
        started_by: &str,
    ) -> Vec<ServerAction> {
        if let Err(e) = drill::validate_request(kind, class) {
            return vec![error_reply(session_id, ErrorReply::validation(e.to_string()))];
        }

        let started_at_ms = self.env.wall_clock_millis();
        let stored =
            match self.storage.create_drill(kind, class, message, started_by, started_at_ms) {
                Ok(drill) => drill,
                Err(e) => {
                    tracing::error!(error = %e, kind, class, "alert insert failed");
                    return vec![error_reply(session_id, ErrorReply::storage(e.to_string()))];
                },
            };

        let body = drill::sms_body(&stored.kind, &stored.message, &stored.started_by);
        let targets: Vec<SmsTarget> = self
            .directory
            .class_members(&stored.class)
            .into_iter()
            .map(|member| SmsTarget { username: member.username, to: member.contact, body: body.clone() })
            .collect();

        tracing::info!(
            drill_id = stored.id,
            kind,
            class,
            targets = targets.len(),
            "alert stored, starting fan-out"
        );

        let mut actions: Vec<ServerAction> = Room::audiences_for(&stored.class)
            .into_iter()
            .map(|room| ServerAction::BroadcastToRoom {
                room,
                message: ServerMessage::Alert(stored.clone()),
            })
            .collect();
        actions.push(ServerAction::DeliverAlert { session_id, drill: stored, targets });
        actions
    }

    fn handle_mark_safe(
        &mut self,
        session_id: u64,
        drill_id: u64,
        student_id: u64,
    ) -> Vec<ServerAction> {
        let time_ms = self.env.wall_clock_millis();
        let recorded = match self.storage.record_response(drill_id, student_id, time_ms) {
            Ok(recorded) => recorded,
            Err(StorageError::UnknownDrill(id)) => {
                return vec![error_reply(session_id, ErrorReply::unknown_drill(id))];
            },
            Err(e) => {
                tracing::error!(error = %e, drill_id, student_id, "response insert failed");
                return vec![error_reply(session_id, ErrorReply::storage(e.to_string()))];
            },
        };

        let response = recorded.response;
        let mut actions = vec![ServerAction::SendToSession {
            session_id,
            message: ServerMessage::SafeRecorded(response.clone()),
        }];

        // Repeat acknowledgements reply but never re-notify teachers.
        if recorded.newly_recorded {
            actions.push(ServerAction::BroadcastToRoom {
                room: Room::Role(Role::Teacher),
                message: ServerMessage::StudentResponded {
                    drill_id: response.drill_id,
                    student_id: response.student_id,
                    time_ms: response.time_ms,
                },
            });
        }
        actions
    }

    fn handle_current_drill(&self, session_id: u64, class: &str) -> Vec<ServerAction> {
        match self.storage.latest_for_class(class) {
            Ok(drill) => vec![ServerAction::SendToSession {
                session_id,
                message: ServerMessage::CurrentDrillReply(drill),
            }],
            Err(e) => vec![error_reply(session_id, ErrorReply::storage(e.to_string()))],
        }
    }

    fn handle_list_reports(&self, session_id: u64) -> Vec<ServerAction> {
        match self.storage.list_reports() {
            Ok(reports) => vec![ServerAction::SendToSession {
                session_id,
                message: ServerMessage::Reports(reports),
            }],
            Err(e) => vec![error_reply(session_id, ErrorReply::storage(e.to_string()))],
        }
    }

    /// Responses joined with student identities. A response whose
    /// student is no longer in the directory is dropped from the view,
    /// matching an inner join; the stored row itself is untouched.
    fn handle_list_responses(&self, session_id: u64, drill_id: u64) -> Vec<ServerAction> {
        let responses = match self.storage.responses_for(drill_id) {
            Ok(responses) => responses,
            Err(e) => return vec![error_reply(session_id, ErrorReply::storage(e.to_string()))],
        };

        let rows = responses
            .into_iter()
            .filter_map(|response| {
                let student = self.directory.student(response.student_id)?;
                Some(drillcast_proto::ResponderRow {
                    response,
                    username: student.username,
                    name: student.name,
                    class: student.class,
                })
            })
            .collect();

        vec![ServerAction::SendToSession { session_id, message: ServerMessage::Responses(rows) }]
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.registry.session_count()
    }

    /// Current members of a room.
    pub fn sessions_in_room(&self, room: &Room) -> impl Iterator<Item = u64> + '_ {
        self.registry.sessions_in_room(room)
    }

    /// Storage backend handle.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<E, S, D> std::fmt::Debug for DrillDriver<E, S, D>
where
    E: Environment,
    S: DrillStore,
    D: Directory,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrillDriver")
            .field("session_count", &self.registry.session_count())
            .finish()
    }
}

fn error_reply(session_id: u64, reply: ErrorReply) -> ServerAction {
    ServerAction::SendToSession { session_id, message: ServerMessage::Error(reply) }
}

#[cfg(test)]
mod tests {
    use drillcast_proto::ALL_CLASSES;

    use super::*;
    use crate::{
        directory::{MemoryDirectory, NewEntry},
        storage::MemoryStorage,
    };

    #[derive(Clone)]
    struct TestEnv;

    impl Environment for TestEnv {
        fn wall_clock_millis(&self) -> u64 {
            1_700_000_000_000
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(7);
        }
    }

    fn driver() -> DrillDriver<TestEnv, MemoryStorage, MemoryDirectory> {
        DrillDriver::new(
            TestEnv,
            MemoryStorage::new(),
            MemoryDirectory::new(),
            DriverConfig::default(),
        )
    }

    fn join(
        d: &mut DrillDriver<TestEnv, MemoryStorage, MemoryDirectory>,
        session_id: u64,
        role: Role,
        class: Option<&str>,
    ) {
        d.process_event(ServerEvent::ConnectionAccepted { session_id }).unwrap();
        d.process_event(ServerEvent::RequestReceived {
            session_id,
            request: ClientRequest::Join {
                role,
                class: class.map(String::from),
                username: format!("user{session_id}"),
                user_id: session_id,
            },
        })
        .unwrap();
    }

    fn seed_student(d: &DrillDriver<TestEnv, MemoryStorage, MemoryDirectory>, username: &str, class: &str, contact: Option<&str>) {
        use crate::directory::Directory as _;
        d.directory.bulk_insert(&[NewEntry {
            role: Role::Student,
            username: username.to_string(),
            secret: "2010-01-01".to_string(),
            name: username.to_uppercase(),
            class: Some(class.to_string()),
            contact: contact.map(String::from),
        }]);
    }

    #[test]
    fn rejects_when_max_connections_exceeded() {
        let mut d = DrillDriver::new(
            TestEnv,
            MemoryStorage::new(),
            MemoryDirectory::new(),
            DriverConfig { max_connections: 1 },
        );

        d.process_event(ServerEvent::ConnectionAccepted { session_id: 1 }).unwrap();
        let actions = d.process_event(ServerEvent::ConnectionAccepted { session_id: 2 }).unwrap();

        assert_eq!(d.session_count(), 1);
        assert!(matches!(actions[0], ServerAction::CloseConnection { session_id: 2, .. }));
    }

    #[test]
    fn request_from_unknown_session_is_an_error() {
        let mut d = driver();
        let result = d.process_event(ServerEvent::RequestReceived {
            session_id: 99,
            request: ClientRequest::ListReports,
        });
        assert!(matches!(result, Err(ServerError::SessionNotFound(99))));
    }

    #[test]
    fn start_drill_broadcasts_to_class_room_and_replies() {
        let mut d = driver();
        join(&mut d, 1, Role::Teacher, None);

        let actions = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 1,
                request: ClientRequest::StartDrill {
                    kind: "fire".to_string(),
                    class: "ClassA".to_string(),
                    message: "Evacuate".to_string(),
                    started_by: "Ms. Reed".to_string(),
                },
            })
            .unwrap();

        assert_eq!(actions.len(), 2);
        match &actions[0] {
            ServerAction::BroadcastToRoom { room, message: ServerMessage::DrillStarted(drill) } => {
                assert_eq!(*room, Room::class("ClassA"));
                assert_eq!(drill.kind, "fire");
                assert_eq!(drill.started_at_ms, 1_700_000_000_000);
            },
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(matches!(
            &actions[1],
            ServerAction::SendToSession { session_id: 1, message: ServerMessage::DrillCreated(_) }
        ));
    }

    #[test]
    fn all_classes_drill_targets_both_role_rooms() {
        let mut d = driver();
        join(&mut d, 1, Role::Teacher, None);

        let actions = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 1,
                request: ClientRequest::StartDrill {
                    kind: "earthquake".to_string(),
                    class: ALL_CLASSES.to_string(),
                    message: String::new(),
                    started_by: String::new(),
                },
            })
            .unwrap();

        let rooms: Vec<&Room> = actions
            .iter()
            .filter_map(|a| match a {
                ServerAction::BroadcastToRoom { room, .. } => Some(room),
                _ => None,
            })
            .collect();
        assert_eq!(rooms, vec![&Room::Role(Role::Student), &Room::Role(Role::Teacher)]);
    }

    #[test]
    fn start_drill_with_empty_kind_is_rejected_without_storing() {
        let mut d = driver();
        join(&mut d, 1, Role::Teacher, None);

        let actions = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 1,
                request: ClientRequest::StartDrill {
                    kind: "  ".to_string(),
                    class: "ClassA".to_string(),
                    message: String::new(),
                    started_by: String::new(),
                },
            })
            .unwrap();

        assert_eq!(actions.len(), 1);
        match &actions[0] {
            ServerAction::SendToSession { message: ServerMessage::Error(reply), .. } => {
                assert_eq!(reply.code, ErrorReply::VALIDATION);
            },
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(d.storage().list_reports().unwrap().is_empty());
    }

    #[test]
    fn send_alert_stores_then_hands_off_delivery() {
        let mut d = driver();
        join(&mut d, 1, Role::Teacher, None);
        seed_student(&d, "s1", "ClassA", Some("+15550001"));
        seed_student(&d, "s2", "ClassA", None);
        seed_student(&d, "s3", "ClassB", Some("+15550002"));

        let actions = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 1,
                request: ClientRequest::SendAlert {
                    kind: "lockdown".to_string(),
                    class: "ClassA".to_string(),
                    message: "Stay inside".to_string(),
                    started_by: "Principal".to_string(),
                },
            })
            .unwrap();

        // Drill row exists before the delivery action runs.
        assert_eq!(d.storage().list_reports().unwrap().len(), 1);

        let delivery = actions
            .iter()
            .find_map(|a| match a {
                ServerAction::DeliverAlert { session_id, drill, targets } => {
                    Some((session_id, drill, targets))
                },
                _ => None,
            })
            .expect("missing DeliverAlert");

        assert_eq!(*delivery.0, 1);
        assert_eq!(delivery.1.kind, "lockdown");
        // ClassB student is not targeted; the missing contact still is.
        let mut usernames: Vec<&str> =
            delivery.2.iter().map(|t| t.username.as_str()).collect();
        usernames.sort_unstable();
        assert_eq!(usernames, vec!["s1", "s2"]);
        assert!(delivery.2.iter().all(|t| t.body.contains("lockdown Alert: Stay inside")));
    }

    #[test]
    fn mark_safe_notifies_teachers_once() {
        let mut d = driver();
        join(&mut d, 1, Role::Teacher, None);
        join(&mut d, 2, Role::Student, Some("ClassA"));

        let created = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 1,
                request: ClientRequest::StartDrill {
                    kind: "fire".to_string(),
                    class: "ClassA".to_string(),
                    message: String::new(),
                    started_by: String::new(),
                },
            })
            .unwrap();
        let drill_id = created
            .iter()
            .find_map(|a| match a {
                ServerAction::SendToSession {
                    message: ServerMessage::DrillCreated(drill), ..
                } => Some(drill.id),
                _ => None,
            })
            .unwrap();

        let first = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 2,
                request: ClientRequest::MarkSafe { drill_id, student_id: 2 },
            })
            .unwrap();
        assert!(matches!(
            &first[0],
            ServerAction::SendToSession { message: ServerMessage::SafeRecorded(_), .. }
        ));
        assert!(matches!(
            &first[1],
            ServerAction::BroadcastToRoom {
                room: Room::Role(Role::Teacher),
                message: ServerMessage::StudentResponded { .. },
            }
        ));

        // Second acknowledgement replies but does not re-broadcast.
        let second = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 2,
                request: ClientRequest::MarkSafe { drill_id, student_id: 2 },
            })
            .unwrap();
        assert_eq!(second.len(), 1);
        assert!(matches!(
            &second[0],
            ServerAction::SendToSession { message: ServerMessage::SafeRecorded(_), .. }
        ));
    }

    #[test]
    fn mark_safe_for_missing_drill_is_rejected() {
        let mut d = driver();
        join(&mut d, 1, Role::Student, Some("ClassA"));

        let actions = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 1,
                request: ClientRequest::MarkSafe { drill_id: 404, student_id: 1 },
            })
            .unwrap();

        match &actions[0] {
            ServerAction::SendToSession { message: ServerMessage::Error(reply), .. } => {
                assert_eq!(reply.code, ErrorReply::UNKNOWN_DRILL);
            },
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn list_responses_joins_and_drops_unknown_students() {
        let mut d = driver();
        join(&mut d, 1, Role::Teacher, None);
        seed_student(&d, "s1", "ClassA", None);

        d.process_event(ServerEvent::RequestReceived {
            session_id: 1,
            request: ClientRequest::StartDrill {
                kind: "fire".to_string(),
                class: "ClassA".to_string(),
                message: String::new(),
                started_by: String::new(),
            },
        })
        .unwrap();

        // Student 1 exists in the directory, student 999 does not.
        d.process_event(ServerEvent::RequestReceived {
            session_id: 1,
            request: ClientRequest::MarkSafe { drill_id: 1, student_id: 1 },
        })
        .unwrap();
        d.process_event(ServerEvent::RequestReceived {
            session_id: 1,
            request: ClientRequest::MarkSafe { drill_id: 1, student_id: 999 },
        })
        .unwrap();

        let actions = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 1,
                request: ClientRequest::ListResponses { drill_id: 1 },
            })
            .unwrap();

        match &actions[0] {
            ServerAction::SendToSession { message: ServerMessage::Responses(rows), .. } => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].username, "s1");
                assert_eq!(rows[0].class.as_deref(), Some("ClassA"));
            },
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn current_drill_respects_class_visibility() {
        let mut d = driver();
        join(&mut d, 1, Role::Teacher, None);

        for class in ["ClassA", ALL_CLASSES] {
            d.process_event(ServerEvent::RequestReceived {
                session_id: 1,
                request: ClientRequest::StartDrill {
                    kind: "fire".to_string(),
                    class: class.to_string(),
                    message: String::new(),
                    started_by: String::new(),
                },
            })
            .unwrap();
        }

        let actions = d
            .process_event(ServerEvent::RequestReceived {
                session_id: 1,
                request: ClientRequest::CurrentDrill { class: "ClassB".to_string() },
            })
            .unwrap();

        // ClassB only sees the school-wide drill.
        match &actions[0] {
            ServerAction::SendToSession {
                message: ServerMessage::CurrentDrillReply(Some(drill)),
                ..
            } => assert_eq!(drill.class, ALL_CLASSES),
            other => panic!("unexpected action: {other:?}"),
        }
    }
}
