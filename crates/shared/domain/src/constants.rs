/// Public query variable that marks a deploy request.
pub const DEPLOY_QUERY_VAR: &str = "__deploy";

/// Rewrite pattern for the deploy endpoint (matched against the path without the leading `/`).
pub const DEPLOY_REWRITE_PATTERN: &str = "^api/deploy(?:/[a-zA-Z])?/?$";

/// Query the deploy rewrite rule resolves to.
pub const DEPLOY_REWRITE_QUERY: &str = "__deploy=1";

/// Timeout of the scheduler's outbound self-request before any override.
pub const CRON_REQUEST_DEFAULT_TIMEOUT_MS: u64 = 10;

/// Timeout the local configuration branch forces on the scheduler's self-request.
pub const CRON_REQUEST_LOCAL_TIMEOUT_MS: u64 = 500;

/// Endpoint the scheduler's self-request targets.
pub const CRON_REQUEST_PATH: &str = "/cron";

pub const SYSTEM_TAG: &str = "System";
