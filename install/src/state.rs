use std::fmt;

/// Phase of one ensure-installed pass, reported through tracing so a log
/// trail shows where a failed install got stuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationState {
    /// No pass has run yet.
    Unknown,
    /// Checking whether the service already answers.
    Probing,
    /// The probe failed; the service is taken to be absent.
    NotInstalled,
    /// The elevation prompt is up or the elevated install is running.
    Installing,
    /// Install succeeded; polling until the service answers.
    WaitingForReady,
    /// The service answered a probe.
    Ready,
    /// The pass ended in an error.
    Failed,
}

impl fmt::Display for InstallationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallationState::Unknown => "unknown",
            InstallationState::Probing => "probing",
            InstallationState::NotInstalled => "not installed",
            InstallationState::Installing => "installing",
            InstallationState::WaitingForReady => "waiting for ready",
            InstallationState::Ready => "ready",
            InstallationState::Failed => "failed",
        };
        f.write_str(name)
    }
}
