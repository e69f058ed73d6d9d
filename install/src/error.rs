use thiserror::Error;

/// Failures in the elevated-install and readiness-poll flow.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The elevation mechanism itself could not be launched.
    #[error("failed to launch the elevation prompt: {0}")]
    Spawn(#[source] std::io::Error),

    /// The elevated process exited non-zero, which covers both a failing
    /// install and the user dismissing the prompt.
    #[error("elevated install declined or failed (exit status {status}): {stderr}")]
    ElevationFailed { status: i32, stderr: String },

    /// Install succeeded but the service never answered a readiness probe
    /// within the poll schedule.
    #[error("helper service still unavailable after {attempts} readiness probes")]
    ServiceNotReady { attempts: u32 },

    /// The bundled helper binary's version verb failed or printed nothing.
    #[error("failed to query the bundled helper version: {0}")]
    VersionQuery(String),
}
