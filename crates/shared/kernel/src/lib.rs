//! Kernel utilities shared across slices.
//! Keep this crate lightweight: config loading, request authorization and the
//! server plumbing every app reuses.
//!
//! ## Request authorization
//! ```rust
//! use envcfg_kernel::security::ip::IpMatcher;
//! use envcfg_kernel::domain::network::IpRange;
//!
//! let matcher = IpMatcher::new(
//!     vec!["198.51.100.7".to_owned()],
//!     &[IpRange::new("203.0.113.0", "203.0.113.255")],
//! );
//! assert!(matcher.is_authorized("203.0.113.5"));
//! assert!(!matcher.is_authorized("10.0.0.1"));
//! ```
//!
//! ## Config loading
//! ```rust,ignore
//! use envcfg_kernel::config::load_config;
//! use envcfg_kernel::domain::config::AppConfig;
//!
//! let cfg: AppConfig = load_config(Some("server")).unwrap();
//! ```
pub mod config;
pub mod prelude;
pub mod security;
#[cfg(feature = "server")]
pub mod server;

pub use envcfg_domain as domain;
