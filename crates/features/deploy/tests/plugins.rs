use envcfg_deploy::Deploy;
use envcfg_deploy::filters::Filters;
use envcfg_deploy::plugins::{PluginActivationChecker, PluginError, PluginHost};
use envcfg_domain::config::AppConfig;
use envcfg_domain::events::PluginActivationCheck;
use envcfg_domain::plugin::PluginActivation;
use envcfg_event_bus::EventBus;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

#[derive(Debug, Default)]
struct RecordingHost {
    active: Vec<String>,
    calls: Mutex<Vec<(String, bool)>>,
}

impl RecordingHost {
    fn with_active(active: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            active: active.iter().map(|s| (*s).to_owned()).collect(),
            calls: Mutex::default(),
        })
    }

    fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().clone()
    }
}

impl PluginHost for RecordingHost {
    fn active_plugins(&self) -> Vec<String> {
        self.active.clone()
    }

    fn activate_plugin(&self, identifier: &str, network_wide: bool) -> Result<bool, PluginError> {
        self.calls.lock().push((identifier.to_owned(), network_wide));
        if identifier.is_empty() {
            return Err(PluginError::InvalidIdentifier { message: "empty".into(), context: None });
        }
        Ok(true)
    }
}

fn config_activating(plugins: Vec<PluginActivation>) -> AppConfig {
    let mut config = AppConfig::default();
    config.plugins.to_activate = Some(plugins);
    config
}

async fn wait_for_calls(host: &RecordingHost, expected: usize) {
    for _ in 0..100 {
        if host.calls().len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[test]
fn empty_registry_skips_activation() {
    let host = RecordingHost::with_active(&[]);
    let config = config_activating(vec![PluginActivation::new("plugin/x.php", false)]);
    let checker = PluginActivationChecker::new(host.clone(), Arc::new(Filters::from_config(&config)));

    checker.check_plugin_activation();

    assert!(host.calls().is_empty());
}

#[test]
fn placeholder_entry_is_attempted_and_swallowed() {
    let host = RecordingHost::with_active(&["hello.php"]);
    let checker = PluginActivationChecker::new(host.clone(), Arc::new(Filters::default()));

    checker.check_plugin_activation();

    assert_eq!(host.calls(), vec![(String::new(), false)]);
}

#[test]
fn every_requested_plugin_is_activated() {
    let host = RecordingHost::with_active(&["hello.php"]);
    let config = config_activating(vec![
        PluginActivation::new("plugin/x.php", false),
        PluginActivation::new("plugin/y.php", true),
    ]);
    let checker = PluginActivationChecker::new(host.clone(), Arc::new(Filters::from_config(&config)));

    checker.check_plugin_activation();

    assert_eq!(
        host.calls(),
        vec![("plugin/x.php".to_owned(), false), ("plugin/y.php".to_owned(), true)]
    );
}

#[tokio::test]
async fn scheduled_tick_activates_once() {
    let events = EventBus::new();
    let host = RecordingHost::with_active(&["hello.php"]);
    let config = config_activating(vec![PluginActivation::new("plugin/x.php", false)]);
    let deploy = Deploy::builder().plugins(host.clone()).build(&config, &events).unwrap();
    let _worker = deploy.spawn_plugin_worker().unwrap();

    deploy.dispatcher.schedule_plugin_activation_check().unwrap();
    wait_for_calls(&host, 1).await;

    assert_eq!(host.calls(), vec![("plugin/x.php".to_owned(), false)]);
}

#[tokio::test]
async fn worker_runs_once_per_event() {
    let events = EventBus::new();
    let host = RecordingHost::with_active(&["hello.php"]);
    let config = config_activating(vec![PluginActivation::new("plugin/x.php", false)]);
    let deploy = Deploy::builder().plugins(host.clone()).build(&config, &events).unwrap();
    let _worker = deploy.spawn_plugin_worker().unwrap();

    for _ in 0..2 {
        events.publish(PluginActivationCheck { scheduled_for: SystemTime::now() }).unwrap();
    }
    wait_for_calls(&host, 2).await;

    assert_eq!(host.calls().len(), 2);
}

#[tokio::test]
async fn staging_subscriber_schedules_the_check() {
    let events = EventBus::new();
    let host = RecordingHost::with_active(&["hello.php"]);
    let mut config = config_activating(vec![PluginActivation::new("plugin/x.php", false)]);
    config.access.developer_ips = vec!["198.51.100.7".to_owned()];
    config.environment.staging = true;
    let deploy = Deploy::builder().plugins(host.clone()).build(&config, &events).unwrap();
    let _worker = deploy.spawn_plugin_worker().unwrap();
    let _staging = deploy.spawn_staging_subscriber().unwrap();

    deploy.dispatcher.run_configuration("198.51.100.7");
    assert!(host.calls().is_empty());

    wait_for_calls(&host, 1).await;
    assert_eq!(host.calls(), vec![("plugin/x.php".to_owned(), false)]);
}
