//! Broadcast room keys and audience policy.
//!
//! Rooms group live sessions for targeted broadcast: one room per
//! class and one per role. The registry keys membership by [`Room`];
//! the orchestrator picks audiences with [`Room::audiences_for`].

use drillcast_proto::{ALL_CLASSES, Role};
use serde::{Deserialize, Serialize};

/// A named broadcast group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Room {
    /// All sessions of one class, e.g. `class:ClassA`.
    Class(String),
    /// All sessions of one role, e.g. `role:teacher`.
    Role(Role),
}

impl Room {
    /// Room for a class by name.
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    /// Audience for a drill or alert targeting `class`.
    ///
    /// Filtering is authoritative here, on the server: a drill for a
    /// specific class reaches only that class's room, and the `ALL`
    /// sentinel reaches every student and teacher session. Clients
    /// never re-filter what they receive.
    pub fn audiences_for(class: &str) -> Vec<Self> {
        if class == ALL_CLASSES {
            vec![Self::Role(Role::Student), Self::Role(Role::Teacher)]
        } else {
            vec![Self::Class(class.to_string())]
        }
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class(name) => write!(f, "class:{name}"),
            Self::Role(role) => write!(f, "role:{role}"),
        }
    }
}
