use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::DecodeError;

pub const JSONRPC_VERSION: &str = "2.0";

/// Methods served by the helper's JSON-RPC listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperMethod {
    StartDebug,
    EndDebug,
    CheckNewVersion,
}

impl HelperMethod {
    /// Method name as it appears on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            HelperMethod::StartDebug => "HelperRPC.StartDebug",
            HelperMethod::EndDebug => "HelperRPC.EndDebug",
            HelperMethod::CheckNewVersion => "HelperRPC.CheckNewVersion",
        }
    }
}

/// One JSON-RPC request, serialized onto a single newline-terminated line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    /// Positional parameters. The helper's methods take at most one.
    pub params: Vec<Value>,
    pub id: i64,
}

impl JsonRpcRequest {
    pub fn new(method: HelperMethod, params: Vec<Value>, id: i64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.wire_name().to_string(),
            params,
            id,
        }
    }

    /// Serializes the request plus the `\n` terminator the helper splits on.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Error object carried by a failed JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message} (code {code})")]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// One decoded JSON-RPC response line.
///
/// The helper's codec predates strict JSON-RPC 2.0: the `jsonrpc` field may
/// be absent and the unused one of `result`/`error` often arrives as an
/// explicit `null`. Fields are therefore all optional and `null` reads as
/// absent; use [`JsonRpcResponse::into_result`] rather than inspecting the
/// fields directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Splits the response into its success value or its remote error.
    ///
    /// A present, non-null `error` wins even when a `result` is also present.
    /// A response with neither yields `Value::Null`.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// Parses one response line.
pub fn parse_response(line: &str) -> Result<JsonRpcResponse, DecodeError> {
    Ok(serde_json::from_str(line)?)
}

/// Accumulates received bytes until the first `\n`.
///
/// Only one response is honored per connection, so everything after the first
/// newline is discarded. Helpers that close the stream without terminating
/// the line are accommodated via [`LineDecoder::take_tail`] at end of stream.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one read's worth of bytes.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Returns the first buffered line once its newline has arrived, with the
    /// terminator (and any preceding `\r`) stripped.
    pub fn take_line(&mut self) -> Result<Option<String>, DecodeError> {
        let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') else {
            return Ok(None);
        };
        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(Some(String::from_utf8(line)?))
    }

    /// Drains whatever is buffered once the stream has ended, for responses
    /// that were never newline-terminated. Returns `None` if nothing arrived.
    pub fn take_tail(&mut self) -> Result<Option<String>, DecodeError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let tail = std::mem::take(&mut self.buffer);
        Ok(Some(String::from_utf8(tail)?))
    }
}
