use tracing::debug;

use crate::channel::Connection;
use crate::endpoint::HelperEndpoint;

/// Reports whether the helper service is accepting connections right now.
///
/// Opens a throwaway connection and immediately shuts it down; nothing is
/// written, so the probe has no side effect on the service and is safe to
/// run concurrently with live exchanges. Every failure mode, including the
/// connect timeout, reads as "unavailable".
pub async fn is_helper_available(endpoint: &HelperEndpoint) -> bool {
    match Connection::open(endpoint).await {
        Ok(conn) => {
            conn.shutdown().await;
            true
        }
        Err(err) => {
            debug!(path = %endpoint.path().display(), "helper probe failed: {err}");
            false
        }
    }
}
