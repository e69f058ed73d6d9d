use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::elevate::ElevationDisplay;
use crate::elevate::ElevationPrompt;
use crate::error::InstallError;
use crate::helper_tool::HelperTool;
use crate::policy::PollPolicy;
use crate::state::InstallationState;

/// How one ensure-installed pass concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The service answered the availability check; nothing was installed.
    AlreadyRunning,
    /// An elevated install ran and the service answered the
    /// `probe_attempts`-th readiness probe.
    Installed { probe_attempts: u32 },
}

/// Drives the one-time elevated install of the helper service and the
/// bounded wait for it to start accepting connections.
///
/// Readiness is delegated to a caller-supplied probe so the installer itself
/// never touches the socket. The probe is any `FnMut` returning a future that
/// resolves to "is the service answering right now".
pub struct HelperInstaller {
    helper: HelperTool,
    prompt: Arc<dyn ElevationPrompt>,
    display: ElevationDisplay,
    policy: PollPolicy,
    /// Serializes concurrent install requests: late arrivals wait here and
    /// then re-probe instead of raising a second elevation prompt.
    in_flight: Mutex<()>,
}

impl HelperInstaller {
    pub fn new(
        helper: HelperTool,
        prompt: Arc<dyn ElevationPrompt>,
        display: ElevationDisplay,
        policy: PollPolicy,
    ) -> Self {
        Self {
            helper,
            prompt,
            display,
            policy,
            in_flight: Mutex::new(()),
        }
    }

    /// Runs the helper's install verb through the elevation prompt.
    ///
    /// Success means the elevated process exited zero. It says nothing about
    /// whether the background service is accepting connections yet; callers
    /// follow up with [`HelperInstaller::wait_until_ready`].
    pub async fn install(&self) -> Result<(), InstallError> {
        let command = self.helper.install_command();
        info!(state = %InstallationState::Installing, %command, "requesting elevated helper install");
        match self.prompt.run_elevated(&command, &self.display).await {
            Ok(output) => {
                if !output.stderr.is_empty() {
                    debug!(stderr = %output.stderr, "elevated install wrote to stderr");
                }
                Ok(())
            }
            Err(err) => {
                warn!(state = %InstallationState::Failed, "elevated install failed: {err}");
                Err(err)
            }
        }
    }

    /// Probes on the configured schedule until the service answers, returning
    /// the number of probes spent.
    ///
    /// The first probe fires immediately; the interval elapses between
    /// attempts, not before the first one.
    pub async fn wait_until_ready<P, Fut>(&self, mut probe: P) -> Result<u32, InstallError>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        debug!(
            state = %InstallationState::WaitingForReady,
            max_attempts = self.policy.max_attempts,
            "polling helper service readiness"
        );
        for attempt in 1..=self.policy.max_attempts {
            if probe().await {
                info!(state = %InstallationState::Ready, attempt, "helper service answered");
                return Ok(attempt);
            }
            if attempt < self.policy.max_attempts {
                sleep(self.policy.interval).await;
            }
        }
        warn!(
            state = %InstallationState::Failed,
            attempts = self.policy.max_attempts,
            "helper service never answered a readiness probe"
        );
        Err(InstallError::ServiceNotReady {
            attempts: self.policy.max_attempts,
        })
    }

    /// Ensures the helper service is installed and answering, prompting for
    /// elevation at most once across concurrent callers.
    pub async fn ensure_installed<P, Fut>(
        &self,
        mut probe: P,
    ) -> Result<InstallOutcome, InstallError>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let _guard = self.in_flight.lock().await;
        debug!(state = %InstallationState::Probing, "checking helper service availability");
        // A concurrent caller may have finished the install while we waited
        // on the guard; re-check before prompting again.
        if probe().await {
            return Ok(InstallOutcome::AlreadyRunning);
        }
        debug!(state = %InstallationState::NotInstalled, "helper service unreachable");
        self.install().await?;
        let probe_attempts = self.wait_until_ready(&mut probe).await?;
        Ok(InstallOutcome::Installed { probe_attempts })
    }

    /// Reinstalls even when the service is reachable, for replacing a stale
    /// helper, then waits for readiness.
    pub async fn reinstall<P, Fut>(&self, probe: P) -> Result<u32, InstallError>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let _guard = self.in_flight.lock().await;
        self.install().await?;
        self.wait_until_ready(probe).await
    }
}
