use envcfg_deploy::cron::{CronScheduler, Hook};
use envcfg_deploy::dispatcher::DispatchOutcome;
use envcfg_deploy::{Deploy, init};
use envcfg_domain::config::AppConfig;
use envcfg_domain::environment::EnvironmentSet;
use envcfg_domain::events::{ConfigLive, ConfigLocal, ConfigStaging};
use envcfg_domain::network::IpRange;
use envcfg_event_bus::{EventBus, EventReceiverExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;

const DEVELOPER: &str = "198.51.100.7";
const DEPLOYER: &str = "203.0.113.5";
const STRANGER: &str = "10.0.0.1";

struct Listeners {
    local: Receiver<Arc<ConfigLocal>>,
    staging: Receiver<Arc<ConfigStaging>>,
    live: Receiver<Arc<ConfigLive>>,
}

impl Listeners {
    fn new(events: &EventBus) -> Self {
        Self {
            local: events.subscribe().unwrap(),
            staging: events.subscribe().unwrap(),
            live: events.subscribe().unwrap(),
        }
    }

    fn drain(&mut self) -> (usize, usize, usize) {
        (count(&mut self.local), count(&mut self.staging), count(&mut self.live))
    }
}

fn count<T: Send + Sync + 'static>(rx: &mut Receiver<Arc<T>>) -> usize {
    let mut n = 0;
    while rx.try_recv_event().is_some() {
        n += 1;
    }
    n
}

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.access.developer_ips = vec![DEVELOPER.to_owned()];
    config.access.ip_ranges = vec![IpRange::new("203.0.113.0", "203.0.113.255")];
    config
}

fn deploy(events: &EventBus) -> Deploy {
    init(&config(), events).unwrap()
}

#[tokio::test]
async fn single_predicate_fires_exactly_one_event() {
    let cases = [
        (EnvironmentSet::LOCAL, (1, 0, 0)),
        (EnvironmentSet::STAGING, (0, 1, 0)),
        (EnvironmentSet::LIVE, (0, 0, 1)),
    ];

    for (environment, expected) in cases {
        let events = EventBus::new();
        let mut listeners = Listeners::new(&events);
        let deploy = deploy(&events);

        let outcome = deploy.dispatcher.run_configuration_with(DEPLOYER, environment);

        assert_eq!(outcome, DispatchOutcome::Applied(environment));
        assert_eq!(listeners.drain(), expected, "{environment}");
        assert_eq!(deploy.scheduler.pending_count(), 0);
    }
}

#[tokio::test]
async fn unauthorized_request_is_a_no_op() {
    let events = EventBus::new();
    let mut listeners = Listeners::new(&events);
    let deploy = deploy(&events);

    let outcome = deploy.dispatcher.run_configuration_with(STRANGER, EnvironmentSet::all());

    assert_eq!(outcome, DispatchOutcome::Unauthorized);
    assert_eq!(listeners.drain(), (0, 0, 0));
    assert_eq!(deploy.dispatcher.cron().timeout_override(), None);
}

#[tokio::test]
async fn local_pass_registers_timeout_override() {
    let events = EventBus::new();
    let mut listeners = Listeners::new(&events);
    let deploy = deploy(&events);

    deploy.dispatcher.run_configuration_with(DEVELOPER, EnvironmentSet::LOCAL);

    assert_eq!(deploy.dispatcher.cron().timeout_override(), Some(Duration::from_millis(500)));
    assert_eq!(listeners.drain(), (1, 0, 0));

    deploy.dispatcher.run_configuration_with(DEVELOPER, EnvironmentSet::LOCAL);
    assert_eq!(deploy.dispatcher.cron().timeout_override(), Some(Duration::from_millis(500)));
}

#[tokio::test]
async fn every_reported_environment_runs() {
    let events = EventBus::new();
    let mut listeners = Listeners::new(&events);
    let deploy = deploy(&events);

    let outcome = deploy.dispatcher.run_configuration_with(DEPLOYER, EnvironmentSet::all());

    assert_eq!(outcome, DispatchOutcome::Applied(EnvironmentSet::all()));
    assert_eq!(listeners.drain(), (1, 1, 1));
}

#[tokio::test]
async fn no_environment_fires_nothing() {
    let events = EventBus::new();
    let mut listeners = Listeners::new(&events);
    let deploy = deploy(&events);

    let outcome = deploy.dispatcher.run_configuration(DEPLOYER);

    assert_eq!(outcome, DispatchOutcome::Applied(EnvironmentSet::empty()));
    assert_eq!(listeners.drain(), (0, 0, 0));
}

#[tokio::test]
async fn probe_comes_from_configuration() {
    let events = EventBus::new();
    let mut listeners = Listeners::new(&events);
    let mut config = config();
    config.environment.tier = Some("staging".to_owned());
    let deploy = init(&config, &events).unwrap();

    deploy.dispatcher.run_configuration(DEPLOYER);

    assert_eq!(listeners.drain(), (0, 1, 0));
}

#[tokio::test]
async fn runtime_filters_extend_the_allowlist() {
    let events = EventBus::new();
    let deploy = deploy(&events);

    assert_eq!(deploy.dispatcher.run_configuration(STRANGER), DispatchOutcome::Unauthorized);

    deploy.filters.developer_ips.add(20, |mut ips| {
        ips.push(STRANGER.to_owned());
        ips
    });

    assert!(matches!(deploy.dispatcher.run_configuration(STRANGER), DispatchOutcome::Applied(_)));
}

#[tokio::test]
async fn rescheduling_keeps_one_pending_check() {
    let deploy = deploy(&EventBus::new());

    deploy.dispatcher.schedule_plugin_activation_check().unwrap();
    deploy.dispatcher.schedule_plugin_activation_check().unwrap();

    assert_eq!(deploy.scheduler.pending_count(), 1);
    assert!(deploy.scheduler.is_scheduled(Hook::PluginActivationCheck));
}
