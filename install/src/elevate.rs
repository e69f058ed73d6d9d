use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::InstallError;

/// Presentation for the elevation prompt.
#[derive(Debug, Clone)]
pub struct ElevationDisplay {
    /// Product name shown to the user in the prompt text.
    pub name: String,
    /// Icon shown by prompt mechanisms that support one.
    pub icon: Option<PathBuf>,
}

impl Default for ElevationDisplay {
    fn default() -> Self {
        Self {
            name: "Hostbridge".to_string(),
            icon: None,
        }
    }
}

/// Output captured from a finished elevated process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElevatedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Capability for running one shell command with escalated privileges.
///
/// The installer takes this as an injected capability so it stays free of UI
/// concerns: a desktop embedding supplies the platform prompt, tests supply
/// fakes. Implementations must treat a dismissed prompt the same as a failing
/// install and report it as [`InstallError::ElevationFailed`].
#[async_trait]
pub trait ElevationPrompt: Send + Sync {
    /// Runs `command` elevated. Success means the elevated process exited
    /// zero; it carries no claim about any service the command started.
    async fn run_elevated(
        &self,
        command: &str,
        display: &ElevationDisplay,
    ) -> Result<ElevatedOutput, InstallError>;
}

/// Elevation via `osascript`'s `do shell script ... with administrator
/// privileges`, the stock GUI authorization prompt on macOS.
#[cfg(target_os = "macos")]
#[derive(Debug, Default)]
pub struct OsascriptPrompt;

#[cfg(target_os = "macos")]
#[async_trait]
impl ElevationPrompt for OsascriptPrompt {
    async fn run_elevated(
        &self,
        command: &str,
        display: &ElevationDisplay,
    ) -> Result<ElevatedOutput, InstallError> {
        use std::process::Stdio;

        use tokio::process::Command;

        // osascript cannot show a custom icon; only the prompt text carries
        // the product name.
        let script = format!(
            "do shell script {} with prompt {} with administrator privileges",
            applescript_quote(command),
            applescript_quote(&format!("{} wants to make changes.", display.name)),
        );
        let output = Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(InstallError::Spawn)?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(InstallError::ElevationFailed {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }
        Ok(ElevatedOutput { stdout, stderr })
    }
}

#[cfg(target_os = "macos")]
fn applescript_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
