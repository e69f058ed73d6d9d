//! Wire formats spoken by the privileged hosts helper.
//!
//! The helper exposes two protocols over its Unix socket and decides which
//! one a connection speaks by sniffing the first byte:
//!
//! - a binary protocol for hosts-file reads/writes and privileged command
//!   execution ([`Opcode`], [`encode_request`], [`FrameDecoder`]), and
//! - newline-delimited JSON-RPC for debug-session control and version
//!   queries ([`JsonRpcRequest`], [`LineDecoder`]).
//!
//! This crate owns encoding, incremental decoding, and the error taxonomy
//! for malformed responses. It performs no I/O; the transport lives in
//! `hostbridge-client`.

mod binary;
mod error;
mod jsonrpc;

pub use binary::FrameDecoder;
pub use binary::LEN_PREFIX;
pub use binary::Opcode;
pub use binary::encode_request;
pub use error::DecodeError;
pub use jsonrpc::HelperMethod;
pub use jsonrpc::JSONRPC_VERSION;
pub use jsonrpc::JsonRpcError;
pub use jsonrpc::JsonRpcRequest;
pub use jsonrpc::JsonRpcResponse;
pub use jsonrpc::LineDecoder;
pub use jsonrpc::parse_response;
