use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use hostbridge_protocol::DecodeError;
use hostbridge_protocol::HelperMethod;
use hostbridge_protocol::JsonRpcRequest;
use hostbridge_protocol::LineDecoder;
use hostbridge_protocol::parse_response;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::channel::Connection;
use crate::endpoint::HelperEndpoint;
use crate::error::ClientError;

/// Process-wide request id counter. Ids could only collide if two requests
/// shared a connection, which the one-exchange-per-connection policy rules
/// out; distinct ids still keep log trails unambiguous.
static NEXT_REQUEST_ID: AtomicI64 = AtomicI64::new(1);

/// Performs one JSON-RPC exchange: connect, send one newline-terminated
/// request, read one response line, shut down.
///
/// Only the first line the helper sends is honored. A stream that ends
/// without a newline still counts if bytes arrived; a stream that ends with
/// no bytes at all is an empty-response error.
pub(crate) async fn call(
    endpoint: &HelperEndpoint,
    method: HelperMethod,
    params: Vec<Value>,
) -> Result<Value, ClientError> {
    let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::SeqCst);
    let request = JsonRpcRequest::new(method, params, id);
    let line = request
        .to_line()
        .map_err(|err| ClientError::Decode(err.into()))?;

    let mut conn = Connection::open(endpoint).await?;
    conn.write_all(line.as_bytes()).await?;
    debug!(method = method.wire_name(), id, "sent helper RPC request");

    let mut decoder = LineDecoder::new();
    let response_line = loop {
        if let Some(line) = decoder.take_line().map_err(ClientError::Decode)? {
            break line;
        }
        match conn.read_chunk().await? {
            Some(chunk) => decoder.extend(&chunk),
            None => match decoder.take_tail().map_err(ClientError::Decode)? {
                Some(tail) => break tail,
                None => return Err(ClientError::Decode(DecodeError::EmptyResponse)),
            },
        }
    };
    conn.shutdown().await;

    let response = parse_response(&response_line).map_err(ClientError::Decode)?;
    if let Some(response_id) = response.id
        && response_id != id
    {
        // One request per connection, so a mismatch can only mean a confused
        // helper. The response is still the answer to our request.
        warn!(expected = id, received = response_id, "helper RPC response id mismatch");
    }
    Ok(response.into_result()?)
}
