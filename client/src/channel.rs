use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::debug;
use tracing::trace;

use crate::endpoint::HelperEndpoint;
use crate::error::ClientError;

/// Bound on connection establishment. A helper that has not accepted within
/// this window is treated as unavailable.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Read size for one data event.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// One stream connection to the helper, owned by a single exchange.
///
/// Connections are never reused: each request opens a fresh one and either
/// shuts it down explicitly or releases it on drop, so an error path can
/// simply `?` out without leaking the socket.
#[derive(Debug)]
pub struct Connection {
    stream: UnixStream,
}

impl Connection {
    /// Connects to the helper socket, bounded by [`CONNECT_TIMEOUT`].
    pub async fn open(endpoint: &HelperEndpoint) -> Result<Self, ClientError> {
        match timeout(CONNECT_TIMEOUT, UnixStream::connect(endpoint.path())).await {
            Ok(Ok(stream)) => {
                trace!(path = %endpoint.path().display(), "connected to helper socket");
                Ok(Self { stream })
            }
            Ok(Err(err)) => Err(ClientError::Io(err)),
            Err(_) => Err(ClientError::ConnectTimeout),
        }
    }

    /// Writes the whole request as one logical send.
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<(), ClientError> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Awaits the next data event. `Ok(None)` is the remote close.
    pub async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, ClientError> {
        let mut buf = [0u8; READ_CHUNK_SIZE];
        let read = self.stream.read(&mut buf).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(buf[..read].to_vec()))
    }

    /// Reads until the helper closes its end of the stream.
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>, ClientError> {
        let mut buf = Vec::new();
        self.stream.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Signals end-of-exchange to the helper. Shutdown failures are logged
    /// rather than surfaced; the socket is released regardless.
    pub async fn shutdown(mut self) {
        if let Err(err) = self.stream.shutdown().await {
            debug!("helper connection shutdown failed: {err}");
        }
    }
}
