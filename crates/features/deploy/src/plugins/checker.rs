use super::host::PluginHost;
use crate::error::DeployError;
use crate::filters::Filters;
use envcfg_domain::events::PluginActivationCheck;
use envcfg_event_bus::{EventBus, EventReceiverExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// Makes sure the configured plugins are active, but only on hosts that run plugins at all.
#[derive(Debug, Clone)]
pub struct PluginActivationChecker {
    host: Arc<dyn PluginHost>,
    filters: Arc<Filters>,
}

impl PluginActivationChecker {
    #[must_use]
    pub fn new(host: Arc<dyn PluginHost>, filters: Arc<Filters>) -> Self {
        Self { host, filters }
    }

    pub fn check_plugin_activation(&self) {
        let active = self.host.active_plugins();
        if active.is_empty() {
            trace!("No active plugins, skipping activation check");
            return;
        }

        for plugin in self.filters.plugins_to_activate.apply() {
            match self.host.activate_plugin(&plugin.identifier, plugin.network_wide) {
                Ok(activated) => {
                    debug!(plugin = %plugin.identifier, activated, "Plugin activation checked");
                },
                Err(err) => debug!(plugin = %plugin.identifier, error = %err, "Plugin activation failed"),
            }
        }
    }
}

/// Runs the checker once per [`PluginActivationCheck`] event.
#[derive(Debug)]
pub struct PluginActivationWorker {
    checker: PluginActivationChecker,
    rx: broadcast::Receiver<Arc<PluginActivationCheck>>,
}

impl PluginActivationWorker {
    /// Subscribes to the bus right away so events published before [`spawn`](Self::spawn)
    /// are not lost.
    ///
    /// # Errors
    /// Returns [`DeployError::Events`] when the subscription fails.
    pub fn new(checker: PluginActivationChecker, events: &EventBus) -> Result<Self, DeployError> {
        let rx = events.subscribe::<PluginActivationCheck>()?;
        Ok(Self { checker, rx })
    }

    /// Processes events until the bus shuts down.
    #[must_use = "await the handle to wait for the worker to finish"]
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Plugin activation worker started");
            while let Some(event) = self.rx.recv_event().await {
                trace!(scheduled_for = ?event.scheduled_for, "Plugin activation check due");
                self.checker.check_plugin_activation();
            }
            info!("Plugin activation worker stopped");
        })
    }
}
