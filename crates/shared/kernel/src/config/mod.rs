use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix for environment overrides (`ENVCFG__SERVER__PORT=8080`).
pub const ENV_PREFIX: &str = "ENVCFG";
const DEFAULT_CONFIG_FILE: &str = "server";

/// Custom error type for config loading.
#[envcfg_derive::envcfg_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader.
///
/// 1. **Base File**: settings from `path` (any format the `config` crate detects by
///    extension; `server` resolves `server.toml`). Defaults to `"server"`.
/// 2. **Environment Overrides**: variables prefixed with `ENVCFG__`, nested with
///    double underscores (`ENVCFG__ACCESS__DEVELOPER_IPS` maps to `access.developer_ips`).
///    List values are comma separated.
///
/// # Errors
/// * The configuration file cannot be found.
/// * The merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use envcfg_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_config_with_env(path, None)
}

/// Same as [`load_config`], but reads overrides from `env` instead of the process
/// environment when given. Keys keep the `ENVCFG__` form.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with_env<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("access.developer_ips")
                .with_list_parse_key("plugins.active")
                .with_list_parse_key("plugins.installed")
                .try_parsing(true)
                .source(env),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
