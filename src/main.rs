use std::sync::Arc;

use squadron_watch::clock::SystemClock;
use squadron_watch::config::Config;
use squadron_watch::monitor::Monitor;
use squadron_watch::notify::{AnyNotifier, LogNotifier, WebhookNotifier};
use squadron_watch::server::{AppState, build_router};
use squadron_watch::source::{HttpSource, RetryingSource};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "squadron_watch=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let team = config.monitor.team.clone();

    let http = HttpSource::new(config.source_url.clone(), team.clone(), config.request_timeout)?;
    let source = Arc::new(RetryingSource::new(http, config.retry));

    let notifier = match &config.notify_url {
        Some(url) => {
            info!(endpoint = %url, "Publishing notifications to webhook");
            AnyNotifier::Webhook(WebhookNotifier::new(url.clone(), config.request_timeout)?)
        }
        None => {
            info!("No notification endpoint configured; logging notifications");
            AnyNotifier::Log(LogNotifier)
        }
    };

    let monitor = Monitor::new(config.monitor.clone(), source.clone(), notifier, SystemClock);
    let app_state = AppState::new(
        team.clone(),
        source,
        config.leaderboard,
        monitor.subscribe(),
        config.low_rating_threshold,
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(%team, "listening on {}", config.listen_addr);

    let shutdown = CancellationToken::new();
    let monitor_task = tokio::spawn(monitor.run(shutdown.clone()));

    let signal = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        signal.cancel();
    });

    let server_shutdown = shutdown.clone();
    let served = axum::serve(listener, build_router(app_state))
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .await;
    if let Err(e) = &served {
        error!(error = %e, "Server failed, stopping monitor");
        shutdown.cancel();
    }

    // The monitor publishes the summary of any running session before exiting.
    monitor_task.await?;
    served?;
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where supported.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl-C received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}
