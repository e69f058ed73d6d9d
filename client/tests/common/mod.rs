//! In-process stand-ins for the helper service and the elevation prompt.
//!
//! The fake helper binds a real Unix socket in a tempdir and speaks both wire
//! protocols the way the production service does: first-byte dispatch,
//! unframed acks for hosts updates, framed command results, and Go-flavored
//! JSON-RPC lines (no `jsonrpc` field, explicit `null` for the unused
//! member).

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use hostbridge_client::ClientConfig;
use hostbridge_client::HelperEndpoint;
use hostbridge_install::ElevatedOutput;
use hostbridge_install::ElevationDisplay;
use hostbridge_install::ElevationPrompt;
use hostbridge_install::InstallError;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixListener;
use tokio::net::UnixStream;
use tokio::task::JoinHandle;

/// Observable things the fakes saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Install,
    GetHosts,
    UpdateHosts(String),
    RunCommand(String),
    Rpc(String),
    /// The client released its connection after an unframed-ack exchange.
    ClientClosed,
}

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn record(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// Polls until `pred` holds over the recorded events, bounded.
    pub async fn wait_until<F>(&self, pred: F) -> bool
    where
        F: Fn(&[Event]) -> bool,
    {
        for _ in 0..100 {
            if pred(&self.events()) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }
}

/// Shared state behind the stock fake service.
#[derive(Clone)]
pub struct StockState {
    pub hosts: Arc<Mutex<String>>,
    /// Answer to `HelperRPC.CheckNewVersion`.
    pub needs_update: Arc<AtomicBool>,
    /// When set, `CheckNewVersion` answers with an error object instead.
    pub version_error: Arc<AtomicBool>,
    pub log: EventLog,
}

impl Default for StockState {
    fn default() -> Self {
        Self {
            hosts: Arc::new(Mutex::new("127.0.0.1 localhost\n".to_string())),
            needs_update: Arc::new(AtomicBool::new(false)),
            version_error: Arc::new(AtomicBool::new(false)),
            log: EventLog::default(),
        }
    }
}

/// Accepts connections forever, handing each to `handler` on its own task.
pub fn spawn_accept_loop<F, Fut>(listener: UnixListener, handler: F) -> JoinHandle<()>
where
    F: Fn(UnixStream) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let Ok((stream, _addr)) = listener.accept().await else {
                break;
            };
            tokio::spawn(handler(stream));
        }
    })
}

/// A fake helper service listening on a socket in its own tempdir.
pub struct FakeHelper {
    pub path: PathBuf,
    _dir: tempfile::TempDir,
    handle: JoinHandle<()>,
}

impl FakeHelper {
    /// Binds a fresh socket and serves every connection with `handler`.
    pub async fn spawn<F, Fut>(handler: F) -> anyhow::Result<Self>
    where
        F: Fn(UnixStream) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("helper.sock");
        let listener = UnixListener::bind(&path)?;
        let handle = spawn_accept_loop(listener, handler);
        Ok(Self {
            path,
            _dir: dir,
            handle,
        })
    }

    /// Binds a fresh socket and serves the stock protocol against `state`.
    pub async fn spawn_stock(state: StockState) -> anyhow::Result<Self> {
        Self::spawn(move |stream| {
            let state = state.clone();
            async move { serve_stock(stream, state).await }
        })
        .await
    }

    pub fn endpoint(&self) -> HelperEndpoint {
        HelperEndpoint::new(&self.path)
    }
}

impl Drop for FakeHelper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serves one connection of the stock protocol: sniff the first byte, then
/// speak whichever protocol it selects. A connection that closes without
/// sending anything is an availability probe and is ignored.
pub async fn serve_stock(mut stream: UnixStream, state: StockState) {
    let mut first = [0u8; 1];
    match stream.read(&mut first).await {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    match first[0] {
        b'u' => serve_update(stream, state).await,
        b'g' => serve_get(stream, state).await,
        b'c' => serve_run(stream, state).await,
        other => serve_jsonrpc(stream, other, state).await,
    }
}

async fn read_len(stream: &mut UnixStream) -> std::io::Result<usize> {
    let mut len = [0u8; 4];
    stream.read_exact(&mut len).await?;
    Ok(u32::from_be_bytes(len) as usize)
}

async fn serve_update(mut stream: UnixStream, state: StockState) {
    let Ok(len) = read_len(&mut stream).await else {
        return;
    };
    let mut content = vec![0u8; len];
    if stream.read_exact(&mut content).await.is_err() {
        return;
    }
    let content = String::from_utf8_lossy(&content).into_owned();
    *state.hosts.lock().unwrap() = content.clone();
    state.log.record(Event::UpdateHosts(content));
    let _ = stream.write_all(b"SUCCESS").await;
    // The real service leaves the connection open after acking; hold it
    // until the client closes its end so tests can observe the release.
    let mut sink = Vec::new();
    let _ = stream.read_to_end(&mut sink).await;
    state.log.record(Event::ClientClosed);
}

async fn serve_get(mut stream: UnixStream, state: StockState) {
    // Drain the (empty) request payload; closing with unread bytes in the
    // receive queue would reset the client's connection instead of EOFing it.
    let Ok(len) = read_len(&mut stream).await else {
        return;
    };
    let mut payload = vec![0u8; len];
    if stream.read_exact(&mut payload).await.is_err() {
        return;
    }
    let hosts = state.hosts.lock().unwrap().clone();
    state.log.record(Event::GetHosts);
    let _ = stream.write_all(hosts.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn serve_run(mut stream: UnixStream, state: StockState) {
    let Ok(len) = read_len(&mut stream).await else {
        return;
    };
    let mut command = vec![0u8; len];
    if stream.read_exact(&mut command).await.is_err() {
        return;
    }
    let command = String::from_utf8_lossy(&command).into_owned();
    state.log.record(Event::RunCommand(command.clone()));
    let response = format!("ran: {command}");
    let mut frame = (response.len() as u32).to_be_bytes().to_vec();
    frame.extend_from_slice(response.as_bytes());
    let _ = stream.write_all(&frame).await;
    let _ = stream.shutdown().await;
}

async fn serve_jsonrpc(mut stream: UnixStream, first: u8, state: StockState) {
    let Some(request) = read_request_line(&mut stream, first).await else {
        return;
    };
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let id = request["id"].clone();
    state.log.record(Event::Rpc(method.clone()));
    let response = match method.as_str() {
        "HelperRPC.StartDebug" => {
            json!({"id": id, "result": "debug started", "error": null})
        }
        "HelperRPC.EndDebug" => {
            json!({"id": id, "result": "debug stopped", "error": null})
        }
        "HelperRPC.CheckNewVersion" => {
            if state.version_error.load(Ordering::SeqCst) {
                json!({
                    "id": id,
                    "result": null,
                    "error": {"code": -32000, "message": "version registry unavailable"},
                })
            } else {
                let needs = state.needs_update.load(Ordering::SeqCst);
                json!({"id": id, "result": needs, "error": null})
            }
        }
        _ => json!({
            "id": id,
            "result": null,
            "error": {"code": -32601, "message": format!("unknown method {method}")},
        }),
    };
    let _ = stream.write_all(format!("{response}\n").as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Reads one binary request off the stream, returning the opcode byte and
/// the length-prefixed payload. `None` means the peer was only probing.
pub async fn read_binary_request(stream: &mut UnixStream) -> Option<(u8, Vec<u8>)> {
    let mut first = [0u8; 1];
    match stream.read(&mut first).await {
        Ok(0) | Err(_) => return None,
        Ok(_) => {}
    }
    let len = read_len(stream).await.ok()?;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.ok()?;
    Some((first[0], payload))
}

/// Reads one newline-terminated JSON-RPC request off the stream. `None`
/// means the peer was only probing.
pub async fn read_jsonrpc_request(stream: &mut UnixStream) -> Option<serde_json::Value> {
    let mut first = [0u8; 1];
    match stream.read(&mut first).await {
        Ok(0) | Err(_) => return None,
        Ok(_) => {}
    }
    read_request_line(stream, first[0]).await
}

/// Reads one newline-terminated JSON request, `first` being the already
/// consumed opening byte.
pub async fn read_request_line(
    stream: &mut UnixStream,
    first: u8,
) -> Option<serde_json::Value> {
    let mut line = vec![first];
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                line.push(byte[0]);
            }
        }
    }
    serde_json::from_slice(&line).ok()
}

/// Prompt that must never fire.
pub struct NoopPrompt;

#[async_trait]
impl ElevationPrompt for NoopPrompt {
    async fn run_elevated(
        &self,
        command: &str,
        _display: &ElevationDisplay,
    ) -> Result<ElevatedOutput, InstallError> {
        panic!("elevation prompt fired unexpectedly for: {command}");
    }
}

/// Prompt that "installs" by binding the stock fake service onto `path`.
///
/// If a listener is already serving the path (the reinstall case) it only
/// records the install and refreshes the service state.
pub struct InstallingPrompt {
    pub path: PathBuf,
    pub state: StockState,
    pub calls: AtomicU32,
    /// When set, the prompt fails the way a dismissed dialog does.
    pub decline: bool,
    /// When unset, the prompt succeeds but starts nothing, modeling an
    /// install whose service never comes up.
    pub start_service: bool,
}

impl InstallingPrompt {
    pub fn new(path: PathBuf, state: StockState) -> Self {
        Self {
            path,
            state,
            calls: AtomicU32::new(0),
            decline: false,
            start_service: true,
        }
    }
}

#[async_trait]
impl ElevationPrompt for InstallingPrompt {
    async fn run_elevated(
        &self,
        _command: &str,
        _display: &ElevationDisplay,
    ) -> Result<ElevatedOutput, InstallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.decline {
            return Err(InstallError::ElevationFailed {
                status: 1,
                stderr: "User did not grant permission".to_string(),
            });
        }
        self.state.log.record(Event::Install);
        // A (re)installed service is by definition current.
        self.state.needs_update.store(false, Ordering::SeqCst);
        if self.start_service && !self.path.exists() {
            let listener = UnixListener::bind(&self.path).map_err(InstallError::Spawn)?;
            let state = self.state.clone();
            spawn_accept_loop(listener, move |stream| {
                let state = state.clone();
                async move { serve_stock(stream, state).await }
            });
        }
        Ok(ElevatedOutput::default())
    }
}

/// Client settings pointing at `path` with installation and version
/// reconciliation turned off.
pub fn probe_only_config(path: &Path) -> ClientConfig {
    ClientConfig {
        endpoint: HelperEndpoint::new(path),
        helper: None,
        reconcile_version: false,
        ..Default::default()
    }
}

/// Writes an executable shell script into `dir` and returns its path.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}
