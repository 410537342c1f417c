//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` backs the driver with the real wall clock and the OS
//! cryptographic RNG. Tests substitute deterministic environments so
//! timestamps and session ids are reproducible; production is
//! intentionally not.

use drillcast_core::Environment;

/// Production environment using system time and cryptographic RNG.
///
/// Uses `std::time::SystemTime::now()` for wall-clock timestamps and
/// getrandom for randomness. Session ids minted from this RNG are
/// unguessable, not merely unique.
///
/// # Panics
///
/// Panics if the OS RNG fails or the system clock reads before the
/// Unix epoch. Both indicate OS-level breakage a server cannot
/// operate through.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn wall_clock_millis(&self) -> u64 {
        let elapsed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("invariant: system clock is after Unix epoch (1970-01-01)");
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - server cannot operate securely");
    }
}
