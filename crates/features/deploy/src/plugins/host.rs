use super::error::PluginError;
use envcfg_domain::config::PluginsConfig;
use envcfg_domain::plugin::PluginActivation;
use fxhash::FxHashSet;
use parking_lot::RwLock;
use std::fmt::Debug;
use tracing::{debug, info};

/// Plugin management of the host platform.
pub trait PluginHost: Send + Sync + Debug {
    /// Identifiers of the currently active plugins.
    fn active_plugins(&self) -> Vec<String>;

    /// Activates `identifier`. `Ok(false)` when it was already active.
    ///
    /// # Errors
    /// Implementation specific; callers treat every error as best effort.
    fn activate_plugin(&self, identifier: &str, network_wide: bool) -> Result<bool, PluginError>;
}

/// Registry kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPluginHost {
    active: RwLock<Vec<PluginActivation>>,
    installed: FxHashSet<String>,
}

impl InMemoryPluginHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the active list and the installed restriction from configuration.
    #[must_use]
    pub fn from_config(config: &PluginsConfig) -> Self {
        let host = Self::new().with_installed(config.installed.iter().cloned());
        {
            let mut active = host.active.write();
            for identifier in &config.active {
                if !identifier.is_empty() && !active.iter().any(|p| &p.identifier == identifier) {
                    active.push(PluginActivation::new(identifier.clone(), false));
                }
            }
        }

        info!(active = host.active.read().len(), installed = host.installed.len(), "Plugin registry seeded");
        host
    }

    /// Restricts activation to `installed`. An empty set allows anything.
    #[must_use]
    pub fn with_installed(mut self, installed: impl IntoIterator<Item = String>) -> Self {
        self.installed = installed.into_iter().filter(|id| !id.is_empty()).collect();
        self
    }

    #[must_use]
    pub fn is_active(&self, identifier: &str) -> bool {
        self.active.read().iter().any(|p| p.identifier == identifier)
    }

    /// Whether `identifier` was activated network wide. `None` when inactive.
    #[must_use]
    pub fn is_network_wide(&self, identifier: &str) -> Option<bool> {
        self.active.read().iter().find(|p| p.identifier == identifier).map(|p| p.network_wide)
    }
}

impl PluginHost for InMemoryPluginHost {
    fn active_plugins(&self) -> Vec<String> {
        self.active.read().iter().map(|p| p.identifier.clone()).collect()
    }

    fn activate_plugin(&self, identifier: &str, network_wide: bool) -> Result<bool, PluginError> {
        if identifier.trim().is_empty() {
            return Err(PluginError::InvalidIdentifier {
                message: "Plugin identifier is empty".into(),
                context: None,
            });
        }

        if !self.installed.is_empty() && !self.installed.contains(identifier) {
            return Err(PluginError::NotInstalled {
                message: identifier.to_owned().into(),
                context: None,
            });
        }

        let mut active = self.active.write();
        if active.iter().any(|p| p.identifier == identifier) {
            return Ok(false);
        }

        active.push(PluginActivation::new(identifier, network_wide));
        debug!(plugin = identifier, network_wide, "Plugin activated");
        Ok(true)
    }
}
