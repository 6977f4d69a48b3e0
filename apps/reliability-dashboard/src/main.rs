use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use reliability_dashboard::{cli, config, openapi, routes, services, state};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

async fn bind_listener(addr: &str) -> Result<TcpListener> {
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Failed to bind reliability-dashboard listener on {addr}: port already in use. Stop the other service using this port or re-run with --port to choose another port.",
            );
        }
        Err(err) => Err(err)
            .with_context(|| format!("failed to bind reliability-dashboard listener on {addr}")),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parse_origins(origins))
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT, shutting down"),
        _ = cancel.cancelled() => {}
    }
    cancel.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    if args.print_openapi {
        println!(
            "{}",
            serde_json::to_string_pretty(&openapi::openapi_json()?)?
        );
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::DashboardConfig::from_env(args.upstream.clone())?;
    let http = services::upstream::build_http_client(Duration::from_secs(
        config.upstream_timeout_seconds,
    ))?;
    let state = state::AppState {
        upstream: services::upstream::UpstreamClient::new(config.upstream_base_url.clone(), http),
        status: Arc::new(state::StatusStore::new()),
        config: config.clone(),
    };
    tracing::info!(
        upstream = %config.upstream_base_url,
        poll_interval_seconds = config.status_poll_interval_seconds,
        "starting reliability dashboard"
    );

    let cancel = CancellationToken::new();
    services::status_poller::StatusPollerService::new(
        state.clone(),
        Duration::from_secs(config.status_poll_interval_seconds),
    )
    .start(cancel.clone());

    let app = routes::router(state).layer(cors_layer(&config.cors_origins));
    let addr = format!("{}:{}", args.host, args.port);
    let listener = bind_listener(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;
    cancel.cancel();
    Ok(())
}
