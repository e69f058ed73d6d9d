use std::time::Duration;

/// Bounded schedule for post-install readiness probing.
///
/// One policy applies to every wait in the workspace, so "how long do we give
/// the service to come up" is configured in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Probe attempts before giving up. Must be at least 1.
    pub max_attempts: u32,
    /// Pause between consecutive probes. The first probe fires immediately.
    pub interval: Duration,
}

impl PollPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}
