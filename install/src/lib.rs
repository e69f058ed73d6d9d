//! Installation of the privileged hosts helper.
//!
//! The helper's background service cannot be started by an unprivileged
//! process directly: its one-time registration runs the bundled helper
//! binary's install verb under an elevation prompt, and even a successful
//! install only means the elevated process exited cleanly, not that the
//! service is accepting connections yet. [`HelperInstaller`] owns both steps:
//! it drives the prompt through the injected [`ElevationPrompt`] capability
//! and then polls a caller-supplied readiness probe on a bounded
//! [`PollPolicy`] schedule.

mod elevate;
mod error;
mod helper_tool;
mod orchestrator;
mod policy;
mod state;

pub use elevate::ElevatedOutput;
pub use elevate::ElevationDisplay;
pub use elevate::ElevationPrompt;
#[cfg(target_os = "macos")]
pub use elevate::OsascriptPrompt;
pub use error::InstallError;
pub use helper_tool::HelperTool;
pub use orchestrator::HelperInstaller;
pub use orchestrator::InstallOutcome;
pub use policy::PollPolicy;
pub use state::InstallationState;
