use super::error::SchedulerError;
use super::request::{CronRequest, CronRequestFilter};
use envcfg_domain::events::{PluginActivationCheck, Topic};
use envcfg_event_bus::EventBus;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Named one-shot triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    PluginActivationCheck,
}

impl Hook {
    #[must_use]
    pub const fn topic(self) -> Topic {
        match self {
            Self::PluginActivationCheck => Topic::PluginActivationCheck,
        }
    }

    fn fire(self, events: &EventBus, scheduled_for: SystemTime) {
        let published = match self {
            Self::PluginActivationCheck => events.publish(PluginActivationCheck { scheduled_for }),
        };

        match published {
            Ok(receivers) => debug!(hook = %self, receivers, "Scheduled hook fired"),
            Err(err) => warn!(hook = %self, error = %err, "Failed to publish scheduled hook"),
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic().name())
    }
}

/// One-shot scheduling contract.
pub trait CronScheduler: Send + Sync + Debug {
    /// Drops every pending event for `hook`. Returns how many were dropped.
    fn clear_scheduled_hook(&self, hook: Hook) -> usize;

    /// Schedules `hook` to fire at `at` (immediately when `at` is in the past).
    ///
    /// # Errors
    /// [`SchedulerError::AlreadyScheduled`] when `hook` is still pending.
    fn schedule_single_event(&self, at: SystemTime, hook: Hook) -> Result<(), SchedulerError>;

    fn is_scheduled(&self, hook: Hook) -> bool;

    fn pending_count(&self) -> usize;
}

#[derive(Debug)]
struct PendingEvent {
    id: u64,
    at: SystemTime,
    task: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<FxHashMap<Hook, PendingEvent>>>;

/// [`CronScheduler`] backed by one tokio task per pending event.
#[derive(Debug)]
pub struct TokioScheduler {
    events: EventBus,
    cron: Arc<CronRequestFilter>,
    base_url: String,
    pending: PendingMap,
    last_request: Arc<Mutex<Option<CronRequest>>>,
    next_id: AtomicU64,
}

impl TokioScheduler {
    #[must_use]
    pub fn new(events: EventBus, cron: Arc<CronRequestFilter>, base_url: impl Into<String>) -> Self {
        Self {
            events,
            cron,
            base_url: base_url.into(),
            pending: Arc::default(),
            last_request: Arc::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// When `hook` is due, if it is pending.
    #[must_use]
    pub fn next_scheduled(&self, hook: Hook) -> Option<SystemTime> {
        self.pending.lock().get(&hook).map(|event| event.at)
    }

    /// The cron request resolved by the most recent tick.
    #[must_use]
    pub fn last_request(&self) -> Option<CronRequest> {
        self.last_request.lock().clone()
    }
}

impl CronScheduler for TokioScheduler {
    fn clear_scheduled_hook(&self, hook: Hook) -> usize {
        let Some(event) = self.pending.lock().remove(&hook) else {
            return 0;
        };

        event.task.abort();
        trace!(%hook, id = event.id, "Cleared scheduled hook");
        1
    }

    fn schedule_single_event(&self, at: SystemTime, hook: Hook) -> Result<(), SchedulerError> {
        let runtime = Handle::try_current().map_err(|err| SchedulerError::Runtime {
            message: err.to_string().into(),
            context: Some(hook.topic().name().into()),
        })?;

        // Held across spawn so the task cannot remove its entry before it exists.
        let mut pending = self.pending.lock();
        if pending.contains_key(&hook) {
            return Err(SchedulerError::AlreadyScheduled {
                message: hook.topic().name().into(),
                context: None,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let delay = at.duration_since(SystemTime::now()).unwrap_or_default();

        let events = self.events.clone();
        let cron = Arc::clone(&self.cron);
        let base_url = self.base_url.clone();
        let registry = Arc::clone(&self.pending);
        let last_request = Arc::clone(&self.last_request);

        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut registry = registry.lock();
                if registry.get(&hook).is_some_and(|event| event.id == id) {
                    registry.remove(&hook);
                }
            }

            let request = cron.resolve(&base_url);
            debug!(
                %hook,
                url = %request.url,
                timeout_ms = request.timeout.as_millis(),
                blocking = request.blocking,
                "Spawning cron request"
            );
            last_request.lock().replace(request);

            hook.fire(&events, at);
        });

        pending.insert(hook, PendingEvent { id, at, task });
        trace!(%hook, id, delay_ms = delay.as_millis(), "Scheduled single event");
        Ok(())
    }

    fn is_scheduled(&self, hook: Hook) -> bool {
        self.pending.lock().contains_key(&hook)
    }

    fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, event) in self.pending.lock().drain() {
            event.task.abort();
        }
    }
}
