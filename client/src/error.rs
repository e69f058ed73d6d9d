use hostbridge_install::InstallError;
use hostbridge_protocol::DecodeError;
use hostbridge_protocol::JsonRpcError;
use thiserror::Error;

/// Failures surfaced to the embedding application.
///
/// The kinds stay separate so a UI can tell apart "service absent", "the
/// install was declined or failed", "the service never came up after the
/// install", and "the privileged operation itself failed", without string
/// matching.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No listener answered within the connection-establishment bound.
    #[error("helper connection attempt timed out")]
    ConnectTimeout,

    /// The socket refused the connection, reset it, or failed mid-exchange.
    #[error("helper connection failed: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes on the wire did not decode as a helper response.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The helper completed the exchange and reported a failure of its own.
    #[error("helper reported an error: {message}")]
    Remote {
        /// JSON-RPC error code, when the failure came over the RPC protocol.
        code: Option<i64>,
        message: String,
    },

    /// The elevated install could not be carried out.
    #[error("helper installation failed: {0}")]
    Installation(#[source] InstallError),

    /// The install finished but the service never answered a readiness probe.
    #[error("helper service unavailable after installation ({attempts} probes)")]
    NotReadyAfterInstall { attempts: u32 },

    /// The bundled-vs-installed version comparison could not be completed.
    /// Deliberately not folded into "up to date".
    #[error("helper version check failed: {0}")]
    VersionCheck(String),

    /// The service is absent and this client was built without a bundled
    /// helper it could install.
    #[error("helper service is not reachable and no bundled helper is configured")]
    Unavailable,
}

impl ClientError {
    pub(crate) fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            code: None,
            message: message.into(),
        }
    }
}

impl From<JsonRpcError> for ClientError {
    fn from(err: JsonRpcError) -> Self {
        Self::Remote {
            code: Some(err.code),
            message: err.message,
        }
    }
}

impl From<InstallError> for ClientError {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::ServiceNotReady { attempts } => {
                Self::NotReadyAfterInstall { attempts }
            }
            other => Self::Installation(other),
        }
    }
}
