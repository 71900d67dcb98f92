use envcfg_domain::config::{AppConfig, LoggingConfig, ServerConfig};
use envcfg_domain::environment::EnvironmentSet;
use envcfg_domain::network::IpRange;
use envcfg_domain::plugin::PluginActivation;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4583);
    assert!(server.ssl.is_none());

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.path.is_none());

    let cfg = AppConfig::default();
    assert!(cfg.access.developer_ips.is_empty());
    assert!(cfg.access.ip_ranges.is_empty());
    assert!(cfg.plugins.to_activate.is_none());
    assert!(!cfg.deploy.staging_plugin_check);
    assert!(cfg.environment.classification().is_empty());
}

#[test]
fn app_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "environment": { "tier": "staging" },
        "access": {
            "developer_ips": ["198.51.100.7"],
            "ip_ranges": [{ "low": "203.0.113.0", "high": "203.0.113.255" }]
        },
        "plugins": {
            "active": ["akismet/akismet.php"],
            "to_activate": [{ "identifier": "plugin/x.php", "network_wide": false }]
        }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.environment.classification(), EnvironmentSet::STAGING);
    assert_eq!(cfg.access.developer_ips, vec!["198.51.100.7".to_owned()]);
    assert_eq!(cfg.access.ip_ranges, vec![IpRange::new("203.0.113.0", "203.0.113.255")]);
    assert_eq!(cfg.plugins.to_activate, Some(vec![PluginActivation::new("plugin/x.php", false)]));
}

#[test]
fn environment_tier_and_flags_combine() {
    let raw = json!({ "environment": { "tier": "local", "live": true } });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.environment.classification(), EnvironmentSet::LOCAL | EnvironmentSet::LIVE);
}

#[test]
fn config_clone_on_write() {
    let original = AppConfig::default();
    let mut copy = original.clone();
    copy.server.port = 9000;

    assert_eq!(original.server.port, 4583);
    assert_eq!(copy.server.port, 9000);
}
