use crate::environment::EnvironmentSet;
use crate::network::IpRange;
use crate::plugin::PluginActivation;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
    pub access: AccessConfig,
    pub plugins: PluginsConfig,
    pub deploy: DeployConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Logging output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Extra filter directives, e.g. `envcfg_deploy=debug`.
    pub filter: Option<String>,
    /// Directory for rolling log files; console only when absent.
    pub path: Option<PathBuf>,
    pub json: bool,
}

/// Which deployment tier this process runs in.
///
/// `tier` and the three flags are OR-ed together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub tier: Option<String>,
    pub local: bool,
    pub staging: bool,
    pub live: bool,
}

impl EnvironmentConfig {
    #[must_use]
    pub fn classification(&self) -> EnvironmentSet {
        let tier = self.tier.as_deref().map_or_else(EnvironmentSet::empty, EnvironmentSet::from);
        tier | EnvironmentSet::from_predicates(self.local, self.staging, self.live)
    }
}

/// Who may trigger a configuration pass.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Exact-match developer addresses.
    pub developer_ips: Vec<String>,
    /// Inclusive IPv4 ranges (e.g. a deployment service's outbound block).
    pub ip_ranges: Vec<IpRange>,
}

/// Plugin registry seed and the activation list for the deferred check.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Plugins active at startup.
    pub active: Vec<String>,
    /// Plugins that exist on this host. Empty means anything can be activated.
    pub installed: Vec<String>,
    /// Plugins the deferred check activates. `None` falls back to a placeholder entry.
    pub to_activate: Option<Vec<PluginActivation>>,
}

/// Behavior of the bundled deploy subscribers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Schedule the deferred plugin check whenever the staging branch runs.
    pub staging_plugin_check: bool,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, path: None, json: false }
    }
}
