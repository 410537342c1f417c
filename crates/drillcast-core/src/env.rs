//! Environment abstraction for deterministic testing.
//!
//! Decouples orchestrator logic from system resources (wall clock,
//! randomness). Production uses the OS clock and RNG; tests pin the
//! clock to assert timestamp and ordering behavior exactly.

/// Abstract environment providing time and randomness.
///
/// # Invariants
///
/// - `wall_clock_millis()` never decreases within a single execution
///   context. Drill ordering relies on it (ties are broken by id, so
///   equal readings are fine).
/// - `random_bytes()` uses cryptographically secure entropy in
///   production; session ids must not be guessable.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time, milliseconds since the Unix epoch.
    ///
    /// This is the only clock drills and responses are stamped with;
    /// client-supplied timestamps are never trusted.
    fn wall_clock_millis(&self) -> u64;

    /// Fills the buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`, used for session ids.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
