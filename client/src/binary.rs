use hostbridge_protocol::DecodeError;
use hostbridge_protocol::FrameDecoder;
use hostbridge_protocol::Opcode;
use hostbridge_protocol::encode_request;
use tracing::debug;

use crate::channel::Connection;
use crate::endpoint::HelperEndpoint;
use crate::error::ClientError;

/// Prefix the helper puts on failure payloads in the raw (unframed)
/// responses.
const ERROR_PREFIX: &str = "ERROR: ";

fn reject_error_payload(text: &str) -> Result<(), ClientError> {
    if let Some(message) = text.strip_prefix(ERROR_PREFIX) {
        return Err(ClientError::remote(message.trim_end()));
    }
    Ok(())
}

/// Sends the new hosts-file content and waits for the helper's
/// acknowledgement.
///
/// The ack is a single raw message ("SUCCESS" or "ERROR: ..."), so the first
/// data event is taken as the complete answer; the helper may keep the
/// connection open afterwards. A close before any data is a missing ack, not
/// success.
pub(crate) async fn update_hosts(
    endpoint: &HelperEndpoint,
    content: &str,
) -> Result<(), ClientError> {
    let mut conn = Connection::open(endpoint).await?;
    conn.write_all(&encode_request(Opcode::UpdateHosts, content.as_bytes()))
        .await?;
    let Some(ack) = conn.read_chunk().await? else {
        return Err(DecodeError::MissingAck.into());
    };
    conn.shutdown().await;
    let text = String::from_utf8(ack).map_err(|err| ClientError::Decode(err.into()))?;
    reject_error_payload(&text)?;
    debug!(ack = %text.trim_end(), "hosts update acknowledged");
    Ok(())
}

/// Requests the current hosts-file content.
///
/// The helper writes the content and closes, so the answer is everything
/// received up to end of stream. An empty file legitimately yields an empty
/// string.
pub(crate) async fn get_hosts(endpoint: &HelperEndpoint) -> Result<String, ClientError> {
    let mut conn = Connection::open(endpoint).await?;
    conn.write_all(&encode_request(Opcode::GetHosts, &[])).await?;
    let raw = conn.read_to_end().await?;
    let text = String::from_utf8(raw).map_err(|err| ClientError::Decode(err.into()))?;
    reject_error_payload(&text)?;
    Ok(text)
}

/// Runs a command with the helper's privileges and returns the framed
/// response text.
///
/// The response is length-prefixed and may arrive fragmented at arbitrary
/// byte boundaries, so completion is re-checked after every data event. A
/// zero-length frame is a valid empty result; a close before the frame
/// completes is an error.
pub(crate) async fn run_command(
    endpoint: &HelperEndpoint,
    command: &str,
) -> Result<String, ClientError> {
    let mut conn = Connection::open(endpoint).await?;
    conn.write_all(&encode_request(Opcode::RunCommand, command.as_bytes()))
        .await?;
    let mut decoder = FrameDecoder::new();
    let body = loop {
        if let Some(frame) = decoder.take_frame() {
            break frame;
        }
        match conn.read_chunk().await? {
            Some(chunk) => decoder.extend(&chunk),
            None => return Err(decoder.truncation_error().into()),
        }
    };
    conn.shutdown().await;
    String::from_utf8(body).map_err(|err| ClientError::Decode(err.into()))
}
