//! Deferred plugin activation.

mod checker;
mod error;
mod host;

pub use checker::{PluginActivationChecker, PluginActivationWorker};
pub use error::{PluginError, PluginErrorExt};
pub use host::{InMemoryPluginHost, PluginHost};
