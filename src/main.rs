//! Palette Studio Back binary entrypoint wiring REST, WebSocket, and pipeline layers.

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod color;
mod config;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use config::AppConfig;
use services::{pipeline::PipelineClient, progress};
use state::{AppState, LinkEvent, LinkState, PipelineLink, SharedState};

/// How often an established pipeline link is pinged.
const HEALTHY_PING_INTERVAL: Duration = Duration::from_secs(5);
/// Pause before a failed link is given a fresh retry budget.
const FAILED_RETRY_PAUSE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    tokio::spawn(run_pipeline_supervisor(app_state.clone()));
    progress::spawn_availability_forwarder(app_state.clone());

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Supervises the pipeline link by driving the connection state machine with
/// real timers and toggling degraded mode when connectivity changes.
async fn run_pipeline_supervisor(state: SharedState) {
    let url = state.config().pipeline_url().to_string();
    let mut link = PipelineLink::default();
    let _ = link.apply(LinkEvent::ConnectRequested);

    loop {
        match link.state() {
            LinkState::Connected => {
                let Some(client) = state.pipeline().await else {
                    // The client was cleared out from under us; reconnect.
                    let _ = link.apply(LinkEvent::Lost);
                    continue;
                };
                match client.ping().await {
                    Ok(()) => sleep(HEALTHY_PING_INTERVAL).await,
                    Err(err) => {
                        warn!(error = %err, "pipeline ping failed; entering degraded mode");
                        state.clear_pipeline().await;
                        let _ = link.apply(LinkEvent::Lost);
                    }
                }
            }
            LinkState::Connecting { attempt } | LinkState::Reconnecting { attempt } => {
                match connect(&url).await {
                    Ok(client) => {
                        info!("connected to pipeline; leaving degraded mode");
                        state.install_pipeline(client).await;
                        let _ = link.apply(LinkEvent::Opened);
                    }
                    Err(err) => {
                        warn!(error = %err, attempt, "pipeline connection attempt failed");
                        // Delay for the attempt that just failed, before the
                        // machine moves on to the next one.
                        let delay = link.next_delay();
                        let _ = link.apply(LinkEvent::AttemptFailed);
                        if link.state() != LinkState::Failed
                            && let Some(delay) = delay
                        {
                            sleep(delay).await;
                        }
                    }
                }
            }
            LinkState::Failed => {
                warn!(
                    pause_secs = FAILED_RETRY_PAUSE.as_secs(),
                    "pipeline retry budget exhausted; pausing before a fresh round"
                );
                sleep(FAILED_RETRY_PAUSE).await;
                let _ = link.apply(LinkEvent::ConnectRequested);
            }
            LinkState::Idle => {
                let _ = link.apply(LinkEvent::ConnectRequested);
            }
        }
    }
}

/// Build a pipeline client and verify the pipeline answers.
async fn connect(url: &str) -> Result<Arc<PipelineClient>, services::pipeline::PipelineError> {
    let client = PipelineClient::new(url)?;
    client.ping().await?;
    Ok(Arc::new(client))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
