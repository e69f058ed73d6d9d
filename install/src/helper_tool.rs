use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::InstallError;

/// The bundled helper executable and the verbs it understands.
///
/// The same binary serves two roles. Run elevated with the install verb, it
/// registers and starts the background service. Run unprivileged with the
/// version verb, it prints its version token so the client can compare it
/// against the installed service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperTool {
    path: PathBuf,
}

impl HelperTool {
    /// Verb that registers and starts the background service. Elevated.
    pub const INSTALL_VERB: &'static str = "install";
    /// Verb that prints the helper's version token to stdout. Unprivileged.
    pub const VERSION_VERB: &'static str = "version";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shell command line for the elevated install, quoted so the helper
    /// path survives spaces in application bundle locations.
    pub fn install_command(&self) -> String {
        let path = self.path.to_string_lossy();
        let quoted = shlex::try_quote(&path).map(|quoted| quoted.into_owned());
        let quoted = quoted.unwrap_or_else(|_| path.into_owned());
        format!("{quoted} {}", Self::INSTALL_VERB)
    }

    /// Runs the version verb and returns the trimmed token from stdout.
    pub async fn local_version(&self) -> Result<String, InstallError> {
        let output = Command::new(&self.path)
            .arg(Self::VERSION_VERB)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                InstallError::VersionQuery(format!(
                    "failed to run {}: {err}",
                    self.path.display()
                ))
            })?;
        if !output.status.success() {
            return Err(InstallError::VersionQuery(format!(
                "{} exited with {}",
                self.path.display(),
                output.status
            )));
        }
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            return Err(InstallError::VersionQuery(format!(
                "{} printed no version token",
                self.path.display()
            )));
        }
        debug!(%version, "bundled helper version");
        Ok(version)
    }
}
