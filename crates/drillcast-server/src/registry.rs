//! Session registry for room membership tracking.
//!
//! Maintains bidirectional mappings: room → sessions (for broadcast)
//! and session → rooms (for cleanup on disconnect). Membership is set
//! based, so joining a room twice is a no-op and a broadcast never
//! delivers twice to one session.
//!
//! The registry is the only place that mutates room membership.
//! Broadcast snapshots are taken at call time: a session that joins
//! mid-broadcast may or may not receive that specific broadcast
//! (eventually-consistent membership, by contract).

use std::collections::{HashMap, HashSet};

use drillcast_core::Room;
use drillcast_proto::Role;

/// Metadata for a registered session.
///
/// Populated by the `join` request; a freshly accepted connection has
/// no role or class until it joins.
#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    /// Role the session joined as.
    pub role: Option<Role>,
    /// Class the session joined with, when the user has one.
    pub class: Option<String>,
    /// Username, for logging and dashboards.
    pub username: Option<String>,
    /// Directory id of the user.
    pub user_id: Option<u64>,
}

impl SessionInfo {
    /// A new, not-yet-joined session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Info for a session that completed a `join`.
    pub fn joined(role: Role, class: Option<String>, username: String, user_id: u64) -> Self {
        Self { role: Some(role), class, username: Some(username), user_id: Some(user_id) }
    }
}

/// Registry tracking live sessions and their room memberships.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Session id → session info.
    sessions: HashMap<u64, SessionInfo>,
    /// Room → set of member session ids.
    room_members: HashMap<Room, HashSet<u64>>,
    /// Session id → set of rooms it belongs to.
    session_rooms: HashMap<u64, HashSet<Room>>,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session. Returns `false` if the id is taken.
    pub fn register_session(&mut self, session_id: u64) -> bool {
        if self.sessions.contains_key(&session_id) {
            return false;
        }
        self.sessions.insert(session_id, SessionInfo::new());
        self.session_rooms.insert(session_id, HashSet::new());
        true
    }

    /// Remove a session and every room membership it holds.
    ///
    /// Unknown session is a no-op returning `None`; disconnects racing
    /// each other are not an error.
    pub fn unregister_session(&mut self, session_id: u64) -> Option<(SessionInfo, HashSet<Room>)> {
        let info = self.sessions.remove(&session_id)?;
        let rooms = self.session_rooms.remove(&session_id).unwrap_or_default();

        for room in &rooms {
            if let Some(members) = self.room_members.get_mut(room) {
                members.remove(&session_id);
                if members.is_empty() {
                    self.room_members.remove(room);
                }
            }
        }

        Some((info, rooms))
    }

    /// Session metadata. `None` if the session doesn't exist.
    pub fn info(&self, session_id: u64) -> Option<&SessionInfo> {
        self.sessions.get(&session_id)
    }

    /// Check whether a session is registered.
    pub fn has_session(&self, session_id: u64) -> bool {
        self.sessions.contains_key(&session_id)
    }

    /// Replace a session's metadata. Returns `false` if unknown.
    pub fn set_info(&mut self, session_id: u64, info: SessionInfo) -> bool {
        match self.sessions.get_mut(&session_id) {
            Some(slot) => {
                *slot = info;
                true
            },
            None => false,
        }
    }

    /// Add a session to a room. Idempotent.
    ///
    /// Returns `false` if the session is not registered.
    pub fn subscribe(&mut self, session_id: u64, room: Room) -> bool {
        if !self.sessions.contains_key(&session_id) {
            return false;
        }
        self.room_members.entry(room.clone()).or_default().insert(session_id);
        self.session_rooms.entry(session_id).or_default().insert(room);
        true
    }

    /// Check whether a session is a member of a room.
    pub fn is_member(&self, session_id: u64, room: &Room) -> bool {
        self.room_members.get(room).is_some_and(|m| m.contains(&session_id))
    }

    /// All sessions currently in a room.
    pub fn sessions_in_room(&self, room: &Room) -> impl Iterator<Item = u64> + '_ {
        self.room_members.get(room).into_iter().flat_map(|m| m.iter().copied())
    }

    /// All rooms a session belongs to.
    pub fn rooms_for_session(&self, session_id: u64) -> impl Iterator<Item = &Room> {
        self.session_rooms.get(&session_id).into_iter().flatten()
    }

    /// Total number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of sessions in a room.
    pub fn room_session_count(&self, room: &Room) -> usize {
        self.room_members.get(room).map_or(0, HashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_a() -> Room {
        Room::class("ClassA")
    }

    #[test]
    fn register_and_lookup_session() {
        let mut registry = SessionRegistry::new();

        assert!(registry.register_session(1));
        assert!(registry.has_session(1));
        assert!(!registry.has_session(2));

        let info = registry.info(1).unwrap();
        assert!(info.role.is_none());
        assert!(info.user_id.is_none());
    }

    #[test]
    fn register_duplicate_session_fails() {
        let mut registry = SessionRegistry::new();

        assert!(registry.register_session(1));
        assert!(!registry.register_session(1));
    }

    #[test]
    fn join_is_idempotent() {
        let mut registry = SessionRegistry::new();
        registry.register_session(1);

        assert!(registry.subscribe(1, class_a()));
        assert!(registry.subscribe(1, class_a()));

        // One membership, one delivery.
        assert_eq!(registry.room_session_count(&class_a()), 1);
        let members: Vec<_> = registry.sessions_in_room(&class_a()).collect();
        assert_eq!(members, vec![1]);
    }

    #[test]
    fn subscribe_unregistered_session_fails() {
        let mut registry = SessionRegistry::new();
        assert!(!registry.subscribe(999, class_a()));
    }

    #[test]
    fn role_and_class_rooms_are_distinct() {
        let mut registry = SessionRegistry::new();
        registry.register_session(1);
        registry.register_session(2);

        registry.subscribe(1, class_a());
        registry.subscribe(1, Room::Role(Role::Student));
        registry.subscribe(2, Room::Role(Role::Teacher));

        assert!(registry.is_member(1, &class_a()));
        assert!(registry.is_member(1, &Room::Role(Role::Student)));
        assert!(!registry.is_member(1, &Room::Role(Role::Teacher)));
        assert_eq!(registry.room_session_count(&Room::Role(Role::Teacher)), 1);
    }

    #[test]
    fn unregister_removes_all_memberships() {
        let mut registry = SessionRegistry::new();
        registry.register_session(1);
        registry.register_session(2);

        registry.subscribe(1, class_a());
        registry.subscribe(1, Room::Role(Role::Student));
        registry.subscribe(2, class_a());

        let (_, rooms) = registry.unregister_session(1).unwrap();
        assert_eq!(rooms.len(), 2);

        let members: Vec<_> = registry.sessions_in_room(&class_a()).collect();
        assert_eq!(members, vec![2]);
        assert_eq!(registry.room_session_count(&Room::Role(Role::Student)), 0);
    }

    #[test]
    fn unregister_unknown_session_is_noop() {
        let mut registry = SessionRegistry::new();
        assert!(registry.unregister_session(42).is_none());
    }

    #[test]
    fn set_info_records_join_metadata() {
        let mut registry = SessionRegistry::new();
        registry.register_session(1);

        let ok = registry.set_info(
            1,
            SessionInfo::joined(Role::Student, Some("ClassA".to_string()), "s1".to_string(), 42),
        );
        assert!(ok);

        let info = registry.info(1).unwrap();
        assert_eq!(info.role, Some(Role::Student));
        assert_eq!(info.class.as_deref(), Some("ClassA"));
        assert_eq!(info.user_id, Some(42));
    }
}
