//! Runtime-free domain rules for Drillcast.
//!
//! Everything here is synchronous and I/O-free so the orchestrator can
//! be driven deterministically in tests:
//!
//! - [`env::Environment`]: clock and RNG abstraction. Production uses
//!   the system clock; tests use fixed or scripted implementations.
//! - [`room::Room`]: broadcast room keys and the server-side audience
//!   policy for drills.
//! - [`drill`]: request validation and SMS body composition.
//! - [`error::ValidationError`]: rejected-before-any-mutation errors.

pub mod drill;
pub mod env;
pub mod error;
pub mod room;

pub use env::Environment;
pub use error::ValidationError;
pub use room::Room;
