use crate::cron::{CronRequestFilter, CronScheduler, Hook, SchedulerError};
use crate::environment::EnvironmentProbe;
use crate::filters::Filters;
use envcfg_domain::constants::CRON_REQUEST_LOCAL_TIMEOUT_MS;
use envcfg_domain::environment::EnvironmentSet;
use envcfg_domain::events::{ConfigLive, ConfigLocal, ConfigStaging, TopicEvent};
use envcfg_event_bus::{Event, EventBus};
use envcfg_kernel::security::ip::IpMatcher;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, trace, warn};

/// What a configuration pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The caller is neither allowlisted nor inside a permitted range.
    Unauthorized,
    /// The branches that ran. Empty when no environment predicate held.
    Applied(EnvironmentSet),
}

/// Gates a configuration pass on the caller address and runs the branch of
/// every environment the probe reports.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    filters: Arc<Filters>,
    probe: Arc<dyn EnvironmentProbe>,
    events: EventBus,
    cron: Arc<CronRequestFilter>,
    scheduler: Arc<dyn CronScheduler>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        filters: Arc<Filters>,
        probe: Arc<dyn EnvironmentProbe>,
        events: EventBus,
        cron: Arc<CronRequestFilter>,
        scheduler: Arc<dyn CronScheduler>,
    ) -> Self {
        Self { filters, probe, events, cron, scheduler }
    }

    /// Runs a pass for `remote_addr`, asking the probe for the environment.
    pub fn run_configuration(&self, remote_addr: &str) -> DispatchOutcome {
        self.run_configuration_with(remote_addr, self.probe.classify())
    }

    /// Runs a pass for `remote_addr` with an explicit classification.
    ///
    /// Branches run in the order local, staging, live.
    pub fn run_configuration_with(
        &self,
        remote_addr: &str,
        environment: EnvironmentSet,
    ) -> DispatchOutcome {
        let matcher =
            IpMatcher::new(self.filters.developer_ips.apply(), &self.filters.ip_ranges.apply());

        if !matcher.is_authorized(remote_addr) {
            debug!(remote_addr, "Configuration pass rejected: address not authorized");
            return DispatchOutcome::Unauthorized;
        }

        if environment.is_empty() {
            debug!(remote_addr, "Configuration pass authorized, but no environment matched");
        } else if environment.is_ambiguous() {
            warn!(remote_addr, %environment, "Several environments reported; running every branch");
        }

        if environment.contains(EnvironmentSet::LOCAL) {
            self.cron.set_timeout(Duration::from_millis(CRON_REQUEST_LOCAL_TIMEOUT_MS));
            self.emit(ConfigLocal { remote_addr: remote_addr.to_owned() });
        }
        if environment.contains(EnvironmentSet::STAGING) {
            self.emit(ConfigStaging { remote_addr: remote_addr.to_owned() });
        }
        if environment.contains(EnvironmentSet::LIVE) {
            self.emit(ConfigLive { remote_addr: remote_addr.to_owned() });
        }

        DispatchOutcome::Applied(environment)
    }

    /// Replaces any pending plugin-activation check with one due now.
    ///
    /// # Errors
    /// Returns [`SchedulerError`] when the scheduler cannot take the event.
    pub fn schedule_plugin_activation_check(&self) -> Result<(), SchedulerError> {
        let hook = Hook::PluginActivationCheck;
        let cleared = self.scheduler.clear_scheduled_hook(hook);
        self.scheduler.schedule_single_event(SystemTime::now(), hook)?;
        debug!(%hook, cleared, "Plugin activation check scheduled");
        Ok(())
    }

    #[must_use]
    pub fn cron(&self) -> &CronRequestFilter {
        &self.cron
    }

    fn emit<E: Event + TopicEvent>(&self, event: E) {
        match self.events.publish(event) {
            Ok(receivers) => trace!(topic = %E::TOPIC, receivers, "Configuration event published"),
            Err(err) => warn!(topic = %E::TOPIC, error = %err, "Failed to publish configuration event"),
        }
    }
}
