//! Extension-point events.
//!
//! Each event is published on the event bus under its own type; [`Topic`] gives
//! the stable, human-readable name used in logs and configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// The four extension points other code can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    LocalConfig,
    StagingConfig,
    LiveConfig,
    PluginActivationCheck,
}

impl Topic {
    pub const ALL: [Self; 4] =
        [Self::LocalConfig, Self::StagingConfig, Self::LiveConfig, Self::PluginActivationCheck];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LocalConfig => "local-config",
            Self::StagingConfig => "staging-config",
            Self::LiveConfig => "live-config",
            Self::PluginActivationCheck => "plugin-activation-check",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Implemented by every extension-point event.
pub trait TopicEvent {
    const TOPIC: Topic;
}

/// Fired by the local configuration branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocal {
    /// Address of the request that triggered the pass.
    pub remote_addr: String,
}

/// Fired by the staging configuration branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStaging {
    pub remote_addr: String,
}

/// Fired by the live configuration branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLive {
    pub remote_addr: String,
}

/// Fired by the scheduler when the deferred plugin check is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginActivationCheck {
    pub scheduled_for: SystemTime,
}

impl TopicEvent for ConfigLocal {
    const TOPIC: Topic = Topic::LocalConfig;
}

impl TopicEvent for ConfigStaging {
    const TOPIC: Topic = Topic::StagingConfig;
}

impl TopicEvent for ConfigLive {
    const TOPIC: Topic = Topic::LiveConfig;
}

impl TopicEvent for PluginActivationCheck {
    const TOPIC: Topic = Topic::PluginActivationCheck;
}
