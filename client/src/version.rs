use hostbridge_install::HelperTool;
use hostbridge_protocol::HelperMethod;
use serde_json::Value;
use tracing::debug;

use crate::endpoint::HelperEndpoint;
use crate::error::ClientError;
use crate::rpc;

/// Asks the running service whether the bundled helper supersedes it.
///
/// The local token comes from the bundled binary's version verb; the service
/// owns the comparison and answers with a bare boolean. Every failure on
/// either leg maps to [`ClientError::VersionCheck`] so that "could not find
/// out" never reads as "up to date".
pub(crate) async fn needs_update(
    endpoint: &HelperEndpoint,
    helper: &HelperTool,
) -> Result<bool, ClientError> {
    let local = helper
        .local_version()
        .await
        .map_err(|err| ClientError::VersionCheck(err.to_string()))?;
    let verdict = rpc::call(
        endpoint,
        HelperMethod::CheckNewVersion,
        vec![Value::String(local.clone())],
    )
    .await
    .map_err(|err| ClientError::VersionCheck(err.to_string()))?;
    match verdict {
        Value::Bool(needs_update) => {
            debug!(%local, needs_update, "helper version reconciled");
            Ok(needs_update)
        }
        other => Err(ClientError::VersionCheck(format!(
            "expected a boolean verdict, got {other}"
        ))),
    }
}
