use anyhow::{Context, Result};
use axum::Router;
use axum::extract::connect_info::IntoMakeServiceWithConnectInfo;
use axum_server::Handle;
use envcfg_domain::config::SslConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

type App = IntoMakeServiceWithConnectInfo<Router, SocketAddr>;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Fails when `ssl` points at missing files or TLS support is compiled out.
pub(crate) fn check_tls(ssl: Option<&SslConfig>) -> Result<()> {
    let Some(ssl) = ssl else { return Ok(()) };

    anyhow::ensure!(cfg!(feature = "tls"), "server.ssl is set, but TLS support is not compiled in");
    for (what, path) in [("certificate", &ssl.cert), ("private key", &ssl.key)] {
        anyhow::ensure!(path.exists(), "SSL {what} not found at {}", path.display());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = ssl.key.metadata()?.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(key = %ssl.key.display(), mode = %format_args!("{mode:o}"), "SSL private key is readable by others");
        }
    }

    Ok(())
}

/// Serves `app` until Ctrl+C or SIGTERM, then drains connections.
pub(crate) async fn serve(address: SocketAddr, ssl: Option<&SslConfig>, app: App) -> Result<()> {
    let handle = Handle::<SocketAddr>::new();
    drain_on_signal(handle.clone());

    #[cfg(feature = "tls")]
    if let Some(ssl) = ssl {
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
            .await
            .context("Failed to load SSL/TLS certificates")?;

        info!("Listening on https://{address}");
        return axum_server::bind_rustls(address, tls)
            .handle(handle)
            .serve(app)
            .await
            .context("HTTPS server failed");
    }

    #[cfg(not(feature = "tls"))]
    let _ = ssl;

    info!("Listening on http://{address}");
    axum_server::bind(address).handle(handle).serve(app).await.context("HTTP server failed")
}

fn drain_on_signal(handle: Handle<SocketAddr>) {
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(name) => {
                info!(signal = name, grace_secs = SHUTDOWN_GRACE.as_secs(), "Draining connections");
                handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
            },
            Err(e) => error!("Cannot listen for shutdown signals: {e:#}"),
        }
    });
}

async fn shutdown_signal() -> Result<&'static str> {
    let ctrl_c = async {
        signal::ctrl_c().await.context("Ctrl+C handler")?;
        Ok::<_, anyhow::Error>("SIGINT")
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>("SIGTERM")
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<&'static str>>();

    tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    }
}
