use common::tracing::init_with_format;
use std::net::SocketAddr;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use weather_now::config::Config;
use weather_now::sweeper::spawn_sweeper;
use weather_now::{Caches, build_state, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    init_with_format(&config.log_format);

    let cancellation_token = CancellationToken::new();
    let caches = Caches::new();
    let state = build_state(&config, &caches)?;

    let sweeper = config.sweep_interval.map(|interval| {
        info!(interval_secs = interval.as_secs(), "Starting cache sweeper");
        spawn_sweeper(
            vec![("city", caches.city.clone()), ("weather", caches.weather.clone())],
            interval,
            cancellation_token.clone(),
        )
    });

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server started on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cancellation_token))
    .await?;

    if let Some(sweeper) = sweeper {
        sweeper.await?;
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(cancellation_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }

    // Stop the background sweeper
    cancellation_token.cancel();
    warn!("Shutting down gracefully...");
}
