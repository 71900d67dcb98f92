pub use crate::config::{ConfigError, load_config, load_config_with_env};
pub use crate::security::ip::IpMatcher;
#[cfg(feature = "server")]
pub use crate::server::{ApiState, ApiStateBuilder, ApiStateError};
