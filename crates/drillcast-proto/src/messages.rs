//! Request, reply, and event messages.
//!
//! One enum per direction: [`ClientRequest`] for everything a client
//! sends, [`ServerMessage`] for replies and server-pushed events. The
//! records that cross the wire ([`Drill`], [`SafeResponse`],
//! [`DrillReport`]) live here too so every crate shares one
//! definition.

use serde::{Deserialize, Serialize};

/// Role a session authenticates as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Teacher: starts drills, watches response dashboards.
    Teacher,
    /// Student: receives drills, acknowledges safety.
    Student,
    /// Administrator: reviews participation reports.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Teacher => write!(f, "teacher"),
            Self::Student => write!(f, "student"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A single drill or alert record.
///
/// Immutable once created: the store appends, never updates or
/// deletes, so the drill log doubles as the audit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drill {
    /// Monotonically increasing id assigned by the store.
    pub id: u64,
    /// Free-form drill label, e.g. "fire" or "earthquake".
    pub kind: String,
    /// Target class name, or [`crate::ALL_CLASSES`].
    pub class: String,
    /// Message shown to recipients.
    pub message: String,
    /// Display name of the initiator.
    pub started_by: String,
    /// Server clock at insertion, milliseconds since the Unix epoch.
    /// Never client-supplied, which guards against clock-skew
    /// spoofing.
    pub started_at_ms: u64,
}

/// A student's "I'm safe" acknowledgement for one drill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeResponse {
    /// Monotonically increasing id assigned by the store.
    pub id: u64,
    /// Drill this response acknowledges.
    pub drill_id: u64,
    /// Directory id of the responding student.
    pub student_id: u64,
    /// Server clock at insertion, milliseconds since the Unix epoch.
    pub time_ms: u64,
}

/// One report row: a drill plus its distinct-responder count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillReport {
    /// The drill the row describes.
    pub drill: Drill,
    /// Number of distinct students that responded.
    pub responses_count: u64,
}

/// A response joined with the responding student's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponderRow {
    /// The recorded response.
    pub response: SafeResponse,
    /// Student's username.
    pub username: String,
    /// Student's display name.
    pub name: String,
    /// Student's class, if on record.
    pub class: Option<String>,
}

/// Aggregate outcome of an SMS fan-out.
///
/// Per-target failures are collected, never thrown: the drill record
/// is durable regardless of how many sends failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDelivery {
    /// Members targeted in total.
    pub total: u64,
    /// Sends that succeeded (or were successfully simulated).
    pub sent: u64,
    /// Sends that failed.
    pub failed: u64,
    /// Reason per failed target.
    pub failures: Vec<DeliveryFailure>,
}

/// One failed SMS target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    /// Username of the member whose notification failed.
    pub username: String,
    /// Why the send failed.
    pub reason: String,
}

/// Everything a client can send to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientRequest {
    /// Establish room membership for this session.
    ///
    /// Idempotent: repeating the same join changes nothing.
    Join {
        /// Role the session acts as.
        role: Role,
        /// Class to join, when the user belongs to one.
        class: Option<String>,
        /// Username, for logging and dashboards.
        username: String,
        /// Directory id of the user.
        user_id: u64,
    },

    /// Record a drill and notify live sessions.
    StartDrill {
        /// Drill label, e.g. "fire". Required.
        kind: String,
        /// Target class or [`crate::ALL_CLASSES`]. Required.
        class: String,
        /// Message shown to recipients.
        message: String,
        /// Initiator display name.
        started_by: String,
    },

    /// Record an alert, notify live sessions, and SMS the class
    /// roster's contact numbers.
    SendAlert {
        /// Alert label. Required.
        kind: String,
        /// Target class or [`crate::ALL_CLASSES`]. Required.
        class: String,
        /// Message shown to recipients and sent over SMS.
        message: String,
        /// Initiator display name.
        started_by: String,
    },

    /// Acknowledge safety for a drill.
    MarkSafe {
        /// Drill being acknowledged.
        drill_id: u64,
        /// Responding student's directory id.
        student_id: u64,
    },

    /// Fetch the most recent drill visible to a class.
    CurrentDrill {
        /// Class to look up.
        class: String,
    },

    /// Fetch the full report history, newest first.
    ListReports,

    /// Fetch the responses recorded for one drill, joined with
    /// student identities.
    ListResponses {
        /// Drill to look up.
        drill_id: u64,
    },
}

/// Everything the server sends: direct replies and room-scoped
/// events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Event: a drill started in a room this session belongs to.
    DrillStarted(Drill),

    /// Event: an alert fired in a room this session belongs to.
    Alert(Drill),

    /// Event (teacher room): a student acknowledged safety.
    StudentResponded {
        /// Drill that was acknowledged.
        drill_id: u64,
        /// Student who responded.
        student_id: u64,
        /// Server clock of the acknowledgement, epoch milliseconds.
        time_ms: u64,
    },

    /// Reply to [`ClientRequest::StartDrill`].
    DrillCreated(Drill),

    /// Reply to [`ClientRequest::SendAlert`].
    AlertDelivered {
        /// The durably recorded alert.
        drill: Drill,
        /// Aggregate SMS outcome.
        delivery: AlertDelivery,
    },

    /// Reply to [`ClientRequest::MarkSafe`].
    SafeRecorded(SafeResponse),

    /// Reply to [`ClientRequest::CurrentDrill`]. `None` when no drill
    /// targets the class.
    CurrentDrillReply(Option<Drill>),

    /// Reply to [`ClientRequest::ListReports`].
    Reports(Vec<DrillReport>),

    /// Reply to [`ClientRequest::ListResponses`].
    Responses(Vec<ResponderRow>),

    /// Reply for any request that failed.
    Error(ErrorReply),
}

/// Failure reply with a stable numeric code.
///
/// The code lets callers distinguish "nothing happened" (validation)
/// from "drill recorded but notification degraded" without parsing
/// the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Error code, one of the constants below.
    pub code: u16,
    /// Human-readable description.
    pub message: String,
}

impl ErrorReply {
    /// A required field was missing or empty; nothing was stored.
    pub const VALIDATION: u16 = 0x0001;
    /// The referenced drill does not exist; nothing was stored.
    pub const UNKNOWN_DRILL: u16 = 0x0002;
    /// The persistence layer failed; the operation was aborted.
    pub const STORAGE: u16 = 0x0003;
    /// The request could not be understood.
    pub const BAD_REQUEST: u16 = 0x0004;

    /// Build a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self { code: Self::VALIDATION, message: message.into() }
    }

    /// Build an unknown-drill failure.
    pub fn unknown_drill(drill_id: u64) -> Self {
        Self { code: Self::UNKNOWN_DRILL, message: format!("unknown drill id {drill_id}") }
    }

    /// Build a storage failure.
    pub fn storage(message: impl Into<String>) -> Self {
        Self { code: Self::STORAGE, message: message.into() }
    }

    /// Build a malformed-request failure.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { code: Self::BAD_REQUEST, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_matches_room_naming() {
        assert_eq!(Role::Teacher.to_string(), "teacher");
        assert_eq!(Role::Student.to_string(), "student");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn error_reply_constructors_set_codes() {
        assert_eq!(ErrorReply::validation("kind required").code, ErrorReply::VALIDATION);
        assert_eq!(ErrorReply::unknown_drill(7).code, ErrorReply::UNKNOWN_DRILL);
        assert_eq!(ErrorReply::unknown_drill(7).message, "unknown drill id 7");
        assert_eq!(ErrorReply::storage("disk full").code, ErrorReply::STORAGE);
    }
}
