//! # Deploy feature slice
//!
//! Lets a deployment service (or a developer) hit `/api/deploy` after a
//! release and have the process run the configuration branch of the tier it
//! lives in.
//!
//! ## Flow
//!
//! 1. [`endpoint::sniff_requests`] spots the deploy marker on an incoming request.
//! 2. [`dispatcher::Dispatcher`] checks the caller against the developer
//!    allowlist and the permitted IP ranges ([`filters::Filters`]).
//! 3. The [`environment::EnvironmentProbe`] says which tiers apply and every
//!    matching branch publishes its event (`ConfigLocal`, `ConfigStaging`,
//!    `ConfigLive`) on the bus.
//!
//! Separately, a scheduled `PluginActivationCheck` makes the
//! [`plugins::PluginActivationWorker`] activate the configured plugins.

pub mod cron;
pub mod dispatcher;
#[cfg(feature = "server")]
pub mod endpoint;
pub mod environment;
mod error;
pub mod filters;
pub mod plugins;

pub use crate::error::{DeployError, DeployErrorExt};
use crate::cron::{CronRequestFilter, CronScheduler, TokioScheduler};
use crate::dispatcher::Dispatcher;
use crate::environment::{EnvironmentProbe, StaticEnvironment};
use crate::filters::Filters;
use crate::plugins::{
    InMemoryPluginHost, PluginActivationChecker, PluginActivationWorker, PluginHost,
};
use envcfg_domain::config::AppConfig;
use envcfg_domain::events::ConfigStaging;
use envcfg_event_bus::{EventBus, EventReceiverExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Wired deploy slice.
#[derive(Debug, Clone)]
pub struct Deploy {
    pub filters: Arc<Filters>,
    pub dispatcher: Arc<Dispatcher>,
    pub checker: PluginActivationChecker,
    pub scheduler: Arc<dyn CronScheduler>,
    pub plugins: Arc<dyn PluginHost>,
    #[cfg(feature = "server")]
    pub endpoint: Arc<endpoint::Endpoint>,
    events: EventBus,
}

impl Deploy {
    #[must_use]
    pub fn builder() -> DeployBuilder {
        DeployBuilder::default()
    }

    /// Starts the worker that runs the plugin check on every scheduled tick.
    ///
    /// # Errors
    /// Returns [`DeployError::Events`] when the worker cannot subscribe.
    pub fn spawn_plugin_worker(&self) -> Result<JoinHandle<()>, DeployError> {
        let worker = PluginActivationWorker::new(self.checker.clone(), &self.events)
            .context("Plugin activation worker")?;
        Ok(worker.spawn())
    }

    /// Schedules the plugin check on every staging configuration pass.
    ///
    /// # Errors
    /// Returns [`DeployError::Events`] when the subscriber cannot subscribe.
    pub fn spawn_staging_subscriber(&self) -> Result<JoinHandle<()>, DeployError> {
        let mut rx = self.events.subscribe::<ConfigStaging>().context("Staging subscriber")?;
        let dispatcher = Arc::clone(&self.dispatcher);

        Ok(tokio::spawn(async move {
            while let Some(event) = rx.recv_event().await {
                if let Err(err) = dispatcher.schedule_plugin_activation_check() {
                    warn!(remote_addr = %event.remote_addr, error = %err, "Plugin check not scheduled");
                }
            }
        }))
    }
}

/// Assembles [`Deploy`]; anything not supplied is built from configuration.
#[derive(Debug, Default)]
pub struct DeployBuilder {
    probe: Option<Arc<dyn EnvironmentProbe>>,
    plugins: Option<Arc<dyn PluginHost>>,
    scheduler: Option<Arc<dyn CronScheduler>>,
    filters: Option<Arc<Filters>>,
}

impl DeployBuilder {
    #[must_use]
    pub fn probe(mut self, probe: Arc<dyn EnvironmentProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub fn plugins(mut self, plugins: Arc<dyn PluginHost>) -> Self {
        self.plugins = Some(plugins);
        self
    }

    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn CronScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    #[must_use]
    pub fn filters(mut self, filters: Arc<Filters>) -> Self {
        self.filters = Some(filters);
        self
    }

    /// # Errors
    /// Returns [`DeployError::Rewrite`] if the deploy rewrite rule fails to compile.
    pub fn build(self, config: &AppConfig, events: &EventBus) -> Result<Deploy, DeployError> {
        let filters = self.filters.unwrap_or_else(|| Arc::new(Filters::from_config(config)));
        let probe = self
            .probe
            .unwrap_or_else(|| Arc::new(StaticEnvironment::from_config(&config.environment)));
        let plugins = self
            .plugins
            .unwrap_or_else(|| Arc::new(InMemoryPluginHost::from_config(&config.plugins)));

        let cron = Arc::new(CronRequestFilter::new());
        let scheduler = self.scheduler.unwrap_or_else(|| {
            let base_url = format!("http://{}:{}", config.server.address, config.server.port);
            Arc::new(TokioScheduler::new(events.clone(), Arc::clone(&cron), base_url))
        });

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&filters),
            Arc::clone(&probe),
            events.clone(),
            cron,
            Arc::clone(&scheduler),
        ));
        let checker = PluginActivationChecker::new(Arc::clone(&plugins), Arc::clone(&filters));

        #[cfg(feature = "server")]
        let endpoint = Arc::new(endpoint::Endpoint::new(Arc::clone(&dispatcher))?);

        info!(environment = %probe.classify(), "Deploy slice initialized");

        Ok(Deploy {
            filters,
            dispatcher,
            checker,
            scheduler,
            plugins,
            #[cfg(feature = "server")]
            endpoint,
            events: events.clone(),
        })
    }
}

/// Initialize the deploy feature from configuration.
///
/// # Errors
/// See [`DeployBuilder::build`].
pub fn init(config: &AppConfig, events: &EventBus) -> Result<Deploy, DeployError> {
    Deploy::builder().build(config, events)
}
