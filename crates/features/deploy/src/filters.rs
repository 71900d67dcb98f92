//! Runtime-extensible value chains.
//!
//! A [`Filter`] starts from a default value and passes it through every
//! registered callback in priority order. Lower priorities run first; equal
//! priorities keep registration order.

use envcfg_domain::config::AppConfig;
use envcfg_domain::network::IpRange;
use envcfg_domain::plugin::PluginActivation;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Priority the configuration values are registered with.
pub const CONFIG_PRIORITY: i32 = 10;

type Callback<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

pub struct Filter<T> {
    default: T,
    callbacks: RwLock<Vec<(i32, Callback<T>)>>,
}

impl<T: Clone> Filter<T> {
    #[must_use]
    pub fn new(default: T) -> Self {
        Self { default, callbacks: RwLock::new(Vec::new()) }
    }

    /// Registers `callback` at `priority`.
    pub fn add<F>(&self, priority: i32, callback: F)
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        let mut callbacks = self.callbacks.write();
        let at = callbacks.partition_point(|(p, _)| *p <= priority);
        callbacks.insert(at, (priority, Arc::new(callback)));
    }

    /// Runs the chain against a fresh copy of the default value.
    #[must_use]
    pub fn apply(&self) -> T {
        // Snapshot so callbacks may register further filters without deadlocking.
        let callbacks: Vec<Callback<T>> =
            self.callbacks.read().iter().map(|(_, cb)| Arc::clone(cb)).collect();

        callbacks.iter().fold(self.default.clone(), |value, cb| cb(value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("default", &self.default)
            .field("callbacks", &self.callbacks.read().len())
            .finish()
    }
}

/// The data extension points read by the dispatcher and the plugin checker.
#[derive(Debug)]
pub struct Filters {
    /// Exact-match addresses allowed to trigger a configuration pass.
    pub developer_ips: Filter<Vec<String>>,
    /// Inclusive IPv4 ranges allowed to trigger a configuration pass.
    pub ip_ranges: Filter<Vec<IpRange>>,
    /// Plugins the deferred check activates.
    pub plugins_to_activate: Filter<Vec<PluginActivation>>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            developer_ips: Filter::new(Vec::new()),
            ip_ranges: Filter::new(Vec::new()),
            plugins_to_activate: Filter::new(vec![PluginActivation::placeholder()]),
        }
    }
}

impl Filters {
    /// Default chains with the configured values registered at [`CONFIG_PRIORITY`].
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let filters = Self::default();

        let developer_ips = config.access.developer_ips.clone();
        if !developer_ips.is_empty() {
            filters.developer_ips.add(CONFIG_PRIORITY, move |mut ips| {
                ips.extend(developer_ips.iter().cloned());
                ips
            });
        }

        let ranges = config.access.ip_ranges.clone();
        if !ranges.is_empty() {
            filters.ip_ranges.add(CONFIG_PRIORITY, move |mut current| {
                current.extend(ranges.iter().cloned());
                current
            });
        }

        if let Some(plugins) = config.plugins.to_activate.clone() {
            filters.plugins_to_activate.add(CONFIG_PRIORITY, move |_| plugins.clone());
        }

        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_yields_default() {
        let filter = Filter::new(vec![1]);
        assert_eq!(filter.apply(), vec![1]);
        assert_eq!(filter.len(), 0);
        assert!(filter.is_empty());

        filter.add(CONFIG_PRIORITY, |v| v);
        assert!(!filter.is_empty());
    }

    #[test]
    fn callbacks_run_in_priority_order() {
        let filter = Filter::new(String::new());
        filter.add(20, |s| s + "c");
        filter.add(10, |s| s + "a");
        filter.add(10, |s| s + "b");

        assert_eq!(filter.apply(), "abc");
    }

    #[test]
    fn default_is_not_mutated_by_apply() {
        let filter = Filter::new(vec![1]);
        filter.add(10, |mut v| {
            v.push(2);
            v
        });

        assert_eq!(filter.apply(), vec![1, 2]);
        assert_eq!(filter.apply(), vec![1, 2]);
    }

    #[test]
    fn default_plugin_list_is_a_placeholder() {
        let filters = Filters::default();
        assert_eq!(filters.plugins_to_activate.apply(), vec![PluginActivation::placeholder()]);
        assert!(filters.developer_ips.apply().is_empty());
        assert!(filters.ip_ranges.apply().is_empty());
    }

    #[test]
    fn config_values_are_registered() {
        let mut config = AppConfig::default();
        config.access.developer_ips = vec!["198.51.100.7".to_owned()];
        config.access.ip_ranges = vec![IpRange::new("203.0.113.0", "203.0.113.255")];
        config.plugins.to_activate = Some(vec![PluginActivation::new("plugin/x.php", true)]);

        let filters = Filters::from_config(&config);

        assert_eq!(filters.developer_ips.apply(), vec!["198.51.100.7".to_owned()]);
        assert_eq!(filters.ip_ranges.apply().len(), 1);
        assert_eq!(
            filters.plugins_to_activate.apply(),
            vec![PluginActivation::new("plugin/x.php", true)]
        );
    }
}
