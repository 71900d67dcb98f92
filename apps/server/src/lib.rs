//! # Environment Configs Server
//!
//! Hosts the deploy endpoint behind `Axum`: a deployment service calls
//! `/api/deploy` after a release and the process runs the configuration
//! branch of its tier.
//!
//! ## Example
//! ```no_run
//! use envcfg_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder().port(4583).build()?.run().await
//! }
//! ```

mod router;
mod serve;

use anyhow::{Context, Result};
use axum::Router;
use envcfg_deploy::{Deploy, DeployBuilder};
use envcfg_domain::config::AppConfig;
use envcfg_event_bus::EventBus;
use envcfg_kernel::server::ApiState;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Collects configuration and collaborator overrides for a [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: AppConfig,
    deploy: DeployBuilder,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Replaces parts of the deploy slice, e.g. the environment probe or the plugin host.
    pub fn deploy(mut self, deploy: DeployBuilder) -> Self {
        self.deploy = deploy;
        self
    }

    /// Wires the event bus, the deploy slice and the router state.
    ///
    /// # Errors
    /// Fails on unusable TLS settings or when the deploy slice cannot be built.
    pub fn build(self) -> Result<Server> {
        serve::check_tls(self.cfg.server.ssl.as_ref())?;

        let events = EventBus::new();
        let deploy = self.deploy.build(&self.cfg, &events).context("Deploy slice")?;
        let state = ApiState::builder()
            .config(self.cfg)
            .events(events)
            .build()
            .context("API state")?;

        info!(
            address = %SocketAddr::new(state.config.server.address, state.config.server.port),
            environment = %state.config.environment.classification(),
            developer_ips = state.config.access.developer_ips.len(),
            ip_ranges = state.config.access.ip_ranges.len(),
            "Server wired"
        );

        Ok(Server { state, deploy })
    }
}

/// A wired server. Nothing listens until [`Server::run`].
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    deploy: Deploy,
}

impl Server {
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete HTTP surface: system routes, API docs and the deploy sniffer.
    #[must_use]
    pub fn router(&self) -> Router {
        router::init(self.state.clone(), self.deploy.endpoint.clone())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    #[must_use]
    pub const fn deploy(&self) -> &Deploy {
        &self.deploy
    }

    /// Starts the deploy subscribers and serves until a shutdown signal.
    ///
    /// # Errors
    /// Fails when a subscriber cannot attach to the bus, the address cannot be
    /// bound or the certificates cannot be loaded.
    pub async fn run(self) -> Result<()> {
        let workers = self.spawn_workers()?;
        let cfg = &self.state.config;
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        let served = serve::serve(address, cfg.server.ssl.as_ref(), app).await;

        let channels = self.state.events.shutdown();
        for worker in workers {
            if let Err(e) = worker.await {
                warn!("Deploy subscriber ended abnormally: {e}");
            }
        }

        info!(channels, "Server stopped");
        served
    }

    fn spawn_workers(&self) -> Result<Vec<JoinHandle<()>>> {
        let mut workers =
            vec![self.deploy.spawn_plugin_worker().context("Plugin activation worker")?];

        if self.state.config.deploy.staging_plugin_check {
            workers.push(self.deploy.spawn_staging_subscriber().context("Staging subscriber")?);
        }

        Ok(workers)
    }
}
