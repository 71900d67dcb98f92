use serde::{Deserialize, Serialize};

/// A plugin the deferred check must make sure is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginActivation {
    /// Plugin identifier as the host knows it (e.g. `plugin/x.php`).
    pub identifier: String,
    /// Activate for the whole network instead of a single site.
    pub network_wide: bool,
}

impl PluginActivation {
    #[must_use]
    pub fn new(identifier: impl Into<String>, network_wide: bool) -> Self {
        Self { identifier: identifier.into(), network_wide }
    }

    /// Entry used when nothing supplies a real list: an empty identifier the host rejects.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }
}
