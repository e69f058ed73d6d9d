use std::path::Path;
use std::path::PathBuf;

/// Rendezvous path of the helper service's stream socket.
///
/// The socket file is created and owned by the service; the client only ever
/// connects to it. Liveness means a listener is currently accepting, not that
/// the path exists: a stale socket file with no listener still reads as
/// unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperEndpoint {
    path: PathBuf,
}

impl HelperEndpoint {
    /// Socket path registered by the stock helper install.
    pub const DEFAULT_PATH: &'static str = "/var/run/com.hostbridge.helper.sock";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for HelperEndpoint {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}
