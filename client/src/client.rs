use std::sync::Arc;

use hostbridge_install::ElevationPrompt;
use hostbridge_install::HelperInstaller;
use hostbridge_install::HelperTool;
use hostbridge_install::InstallOutcome;
use hostbridge_protocol::HelperMethod;
use serde_json::Value;
use tracing::debug;
use tracing::info;

use crate::binary;
use crate::config::ClientConfig;
use crate::endpoint::HelperEndpoint;
use crate::error::ClientError;
use crate::probe;
use crate::rpc;
use crate::version;

/// Output of a privileged command execution.
///
/// The wire protocol carries a single combined text stream, so `stderr` is
/// always empty today; it exists so callers already consuming both fields do
/// not need to change when the helper starts separating them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Entry point for every privileged operation.
///
/// Each call runs the same preamble: probe the service, drive the one-time
/// elevated install if nothing answers, reconcile the installed version when
/// configured to, and only then perform exactly one wire exchange on a fresh
/// connection. Calls are otherwise independent; the only state shared between
/// concurrent calls is the installer's single-flight guard.
pub struct HelperClient {
    endpoint: HelperEndpoint,
    helper: Option<HelperTool>,
    reconcile_version: bool,
    installer: Option<HelperInstaller>,
}

impl HelperClient {
    pub fn new(config: ClientConfig, prompt: Arc<dyn ElevationPrompt>) -> Self {
        let ClientConfig {
            endpoint,
            helper,
            poll_policy,
            reconcile_version,
            display,
        } = config;
        let installer = helper
            .clone()
            .map(|tool| HelperInstaller::new(tool, prompt, display, poll_policy));
        Self {
            endpoint,
            helper,
            reconcile_version,
            installer,
        }
    }

    /// Reads the current hosts-file content.
    pub async fn get_hosts(&self) -> Result<String, ClientError> {
        self.ensure_ready().await?;
        binary::get_hosts(&self.endpoint).await
    }

    /// Replaces the hosts file with `content`.
    pub async fn update_hosts(&self, content: &str) -> Result<(), ClientError> {
        self.ensure_ready().await?;
        binary::update_hosts(&self.endpoint, content).await
    }

    /// Executes `command` with the helper's privileges.
    pub async fn run_privileged_command(
        &self,
        command: &str,
    ) -> Result<CommandOutput, ClientError> {
        self.ensure_ready().await?;
        let stdout = binary::run_command(&self.endpoint, command).await?;
        Ok(CommandOutput {
            stdout,
            stderr: String::new(),
        })
    }

    /// Starts a helper-side debug capture running `command`.
    pub async fn start_debug_session(&self, command: &str) -> Result<String, ClientError> {
        self.ensure_ready().await?;
        let result = rpc::call(
            &self.endpoint,
            HelperMethod::StartDebug,
            vec![Value::String(command.to_string())],
        )
        .await?;
        Ok(stringify(result))
    }

    /// Ends the currently running debug capture.
    pub async fn end_debug_session(&self) -> Result<String, ClientError> {
        self.ensure_ready().await?;
        let result = rpc::call(&self.endpoint, HelperMethod::EndDebug, Vec::new()).await?;
        Ok(stringify(result))
    }

    /// True when no service is answering on the endpoint. Probe only: this
    /// never installs and never prompts.
    pub async fn needs_install(&self) -> bool {
        !probe::is_helper_available(&self.endpoint).await
    }

    async fn ensure_ready(&self) -> Result<(), ClientError> {
        if !probe::is_helper_available(&self.endpoint).await {
            let Some(installer) = &self.installer else {
                return Err(ClientError::Unavailable);
            };
            info!("helper service unreachable, installing");
            let outcome = installer
                .ensure_installed(|| {
                    let endpoint = self.endpoint.clone();
                    async move { probe::is_helper_available(&endpoint).await }
                })
                .await?;
            if let InstallOutcome::Installed { probe_attempts } = outcome {
                debug!(probe_attempts, "helper service installed and answering");
            }
        }
        self.maybe_reconcile_version().await
    }

    /// Runs the version reconciliation leg of the dispatch preamble, driving
    /// a reinstall when the installed service is stale.
    async fn maybe_reconcile_version(&self) -> Result<(), ClientError> {
        if !self.reconcile_version {
            return Ok(());
        }
        let (Some(helper), Some(installer)) = (&self.helper, &self.installer) else {
            return Ok(());
        };
        if !version::needs_update(&self.endpoint, helper).await? {
            return Ok(());
        }
        info!("installed helper service is stale, reinstalling");
        installer
            .reinstall(|| {
                let endpoint = self.endpoint.clone();
                async move { probe::is_helper_available(&endpoint).await }
            })
            .await?;
        Ok(())
    }
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
