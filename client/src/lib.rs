//! Client for the privileged hosts helper service.
//!
//! The helper runs as a root-owned background service listening on a
//! well-known Unix socket. This crate is the unprivileged side of that
//! arrangement: it probes whether the service is answering, drives the
//! one-time elevated install when it is not, reconciles the installed
//! service's version against the bundled helper binary, and performs the
//! actual privileged operations over two wire protocols (a binary framed
//! protocol for hosts-file access and command execution, and
//! newline-delimited JSON-RPC for debug-session control).
//!
//! Every operation goes through [`HelperClient`], which opens one fresh
//! connection per exchange and never reuses it.

#[cfg(unix)]
mod binary;
#[cfg(unix)]
mod channel;
#[cfg(unix)]
mod client;
#[cfg(unix)]
mod config;
#[cfg(unix)]
mod endpoint;
#[cfg(unix)]
mod error;
#[cfg(unix)]
mod probe;
#[cfg(unix)]
mod rpc;
#[cfg(unix)]
mod version;

#[cfg(unix)]
pub use channel::CONNECT_TIMEOUT;
#[cfg(unix)]
pub use client::CommandOutput;
#[cfg(unix)]
pub use client::HelperClient;
#[cfg(unix)]
pub use config::ClientConfig;
#[cfg(unix)]
pub use endpoint::HelperEndpoint;
#[cfg(unix)]
pub use error::ClientError;
#[cfg(unix)]
pub use probe::is_helper_available;
