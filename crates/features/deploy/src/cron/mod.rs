//! One-shot hook scheduling.
//!
//! A [`CronScheduler`] keeps at most one pending event per [`Hook`]. When the
//! event comes due, the hook's event is published on the bus and whoever
//! subscribed to it does the work.

mod error;
mod request;
mod scheduler;

pub use error::{SchedulerError, SchedulerErrorExt};
pub use request::{CronRequest, CronRequestFilter};
pub use scheduler::{CronScheduler, Hook, TokioScheduler};
