//! Web layer module
//!
//! Serves the rewritten playlist and relays stream requests back to the
//! origin. All state is built before the server starts and is read-only
//! while it runs, so handlers never take locks.

use anyhow::Result;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{
    config::Config, models::RewrittenPlaylist, proxy::ProxyIdentity, utils::UrlUtils,
};

pub mod handlers;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &Config, state: AppState) -> Result<Self> {
        let app = create_router(state);
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        Ok(Self { app, addr })
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!("Listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = sigint.recv() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
                }
            }
            _ => {
                warn!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down gracefully");
        }
    }
}

/// Build the router with all routes and middleware
///
/// Routes are nested under the custom endpoint when one is configured, so the
/// served paths match the relay URLs written into the playlist.
pub fn create_router(state: AppState) -> Router {
    let prefix = UrlUtils::endpoint_prefix(state.identity.custom_path_prefix.as_deref());

    let routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/iptv.m3u", get(handlers::playlist::serve_playlist))
        .route(
            "/{token}/{user}/{password}/{index}",
            get(handlers::stream::relay_stream),
        )
        .route(
            "/{token}/{user}/{password}/{index}/{*basename}",
            get(handlers::stream::relay_stream),
        );

    let router = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&prefix, routes)
    };

    router.layer(CorsLayer::permissive()).with_state(state)
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub playlist: Arc<RewrittenPlaylist>,
    pub identity: Arc<ProxyIdentity>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(playlist: RewrittenPlaylist, identity: ProxyIdentity) -> Self {
        Self {
            playlist: Arc::new(playlist),
            identity: Arc::new(identity),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}
