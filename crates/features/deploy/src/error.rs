use crate::cron::SchedulerError;
use envcfg_event_bus::EventBusError;
use std::borrow::Cow;

/// A specialized [`DeployError`] enum of this crate.
#[envcfg_derive::envcfg_error]
pub enum DeployError {
    /// Subscribing to or publishing on the event bus failed.
    #[error("Deploy event error{}: {source}", format_context(.context))]
    Events { source: EventBusError, context: Option<Cow<'static, str>> },
    /// A rewrite rule did not compile.
    #[error("Deploy rewrite error{}: {source}", format_context(.context))]
    Rewrite { source: regex::Error, context: Option<Cow<'static, str>> },
    /// The deferred plugin check could not be scheduled.
    #[error("Deploy scheduler error{}: {source}", format_context(.context))]
    Scheduler { source: SchedulerError, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal deploy error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
