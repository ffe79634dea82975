use chrono::{DateTime, Utc};

/// A port that provides the **current instant**.
///
/// # Purpose
/// Session expiry checks compare against "now"; abstracting it keeps those
/// checks deterministic in tests.
///
/// # Typical Implementations
/// - `SystemClock`: the OS clock
/// - `FixedClock`: a constant instant (tests)
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// A [`Clock`] that always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
