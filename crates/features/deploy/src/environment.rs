use envcfg_domain::config::EnvironmentConfig;
use envcfg_domain::environment::EnvironmentSet;
use std::fmt::Debug;

/// Answers which deployment tier the process runs in.
///
/// Asked once per configuration pass, so implementations may change their
/// answer between requests.
pub trait EnvironmentProbe: Send + Sync + Debug {
    fn is_local(&self) -> bool;
    fn is_staging(&self) -> bool;
    fn is_live(&self) -> bool;

    fn classify(&self) -> EnvironmentSet {
        EnvironmentSet::from_predicates(self.is_local(), self.is_staging(), self.is_live())
    }
}

/// Probe with a fixed answer, usually taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticEnvironment {
    set: EnvironmentSet,
}

impl StaticEnvironment {
    #[must_use]
    pub const fn new(set: EnvironmentSet) -> Self {
        Self { set }
    }

    #[must_use]
    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(config.classification())
    }
}

impl EnvironmentProbe for StaticEnvironment {
    fn is_local(&self) -> bool {
        self.set.contains(EnvironmentSet::LOCAL)
    }

    fn is_staging(&self) -> bool {
        self.set.contains(EnvironmentSet::STAGING)
    }

    fn is_live(&self) -> bool {
        self.set.contains(EnvironmentSet::LIVE)
    }

    fn classify(&self) -> EnvironmentSet {
        self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_probe_reports_configured_tiers() {
        let config = EnvironmentConfig { tier: Some("live".to_owned()), local: true, ..Default::default() };
        let probe = StaticEnvironment::from_config(&config);

        assert!(probe.is_local());
        assert!(!probe.is_staging());
        assert!(probe.is_live());
        assert_eq!(probe.classify(), EnvironmentSet::LOCAL | EnvironmentSet::LIVE);
    }

    #[test]
    fn unknown_tier_reports_nothing() {
        let config = EnvironmentConfig { tier: Some("qa".to_owned()), ..Default::default() };
        assert!(StaticEnvironment::from_config(&config).classify().is_empty());
    }
}
