use hostbridge_install::ElevationDisplay;
use hostbridge_install::HelperTool;
use hostbridge_install::PollPolicy;

use crate::endpoint::HelperEndpoint;

/// Settings for a [`crate::HelperClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Socket the helper service listens on.
    pub endpoint: HelperEndpoint,
    /// Bundled helper binary used for installs and version queries. `None`
    /// turns both installation and version reconciliation off; operations
    /// then fail outright when the service is absent.
    pub helper: Option<HelperTool>,
    /// Schedule for post-install readiness probing.
    pub poll_policy: PollPolicy,
    /// Whether dispatched operations verify the installed service's version
    /// before running. Ignored when no bundled helper is configured.
    pub reconcile_version: bool,
    /// Presentation for the elevation prompt.
    pub display: ElevationDisplay,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: HelperEndpoint::default(),
            helper: None,
            poll_policy: PollPolicy::default(),
            reconcile_version: true,
            display: ElevationDisplay::default(),
        }
    }
}
