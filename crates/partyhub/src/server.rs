//! `PartyHubServer` builder and serve loop.
//!
//! This is the entry point for running a partyhub server. It wires the
//! layers together: store → registry → hub → game controller → axum
//! router.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use partyhub_game::{GameConfig, GameController};
use partyhub_protocol::JsonCodec;
use partyhub_room::{RegistryConfig, spawn_hub, spawn_registry};
use partyhub_store::Gateway;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handler::{create_room, join_room, ping, websocket_handler};
use crate::{AppState, PartyHubError, ServerConfig};

/// Builder for configuring and starting a partyhub server.
///
/// # Example
///
/// ```rust,ignore
/// use partyhub::prelude::*;
///
/// let server = PartyHubServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .static_dir("public")
///     .build(MemoryStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct PartyHubServerBuilder {
    config: ServerConfig,
}

impl PartyHubServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the game session configuration.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.config.game = config;
        self
    }

    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.config.registry = config;
        self
    }

    /// Serves files from `dir` for any path no route matches.
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.static_dir = Some(dir.into());
        self
    }

    /// Binds the listener and starts the registry and hub actors.
    ///
    /// # Errors
    /// `PartyHubError::Io` if the address cannot be bound.
    pub async fn build<G: Gateway>(self, gateway: G) -> Result<PartyHubServer<G>, PartyHubError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;

        let gateway = Arc::new(gateway);
        let registry = spawn_registry(self.config.registry.clone());
        let hub = spawn_hub(registry.clone(), JsonCodec);
        let games = GameController::new(
            Arc::clone(&gateway),
            registry.clone(),
            hub.clone(),
            self.config.game.clone(),
        );

        let state = Arc::new(AppState {
            gateway,
            registry,
            hub,
            games,
            codec: JsonCodec,
        });
        let router = router(Arc::clone(&state), self.config.static_dir.as_deref());

        Ok(PartyHubServer {
            listener,
            state,
            router,
        })
    }
}

impl Default for PartyHubServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn router<G: Gateway>(state: Arc<AppState<G>>, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/ping", get(ping))
        .route("/room", post(create_room::<G>))
        .route("/room/join", post(join_room::<G>))
        .route("/room/{room_id}/ws", get(websocket_handler::<G>))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };
    router.layer(TraceLayer::new_for_http())
}

/// A bound partyhub server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct PartyHubServer<G: Gateway> {
    listener: TcpListener,
    state: Arc<AppState<G>>,
    router: Router,
}

impl<G: Gateway> PartyHubServer<G> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The shared state, for inspecting the store or the registry.
    pub fn state(&self) -> &Arc<AppState<G>> {
        &self.state
    }

    /// Serves until Ctrl-C.
    pub async fn run(self) -> Result<(), PartyHubError> {
        self.run_until(shutdown_signal()).await
    }

    /// Serves until `signal` resolves, then drains the hub and stops the
    /// registry.
    pub async fn run_until<F>(self, signal: F) -> Result<(), PartyHubError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = %self.listener.local_addr()?, "partyhub server listening");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("listener closed, draining broadcast hub");
        if let Err(e) = self.state.hub.shutdown().await {
            tracing::warn!(error = %e, "hub shutdown failed");
        }
        if let Err(e) = self.state.registry.shutdown().await {
            tracing::warn!(error = %e, "registry shutdown failed");
        }

        tracing::info!("server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl-C received, shutting down"),
        Err(e) => {
            // Without a signal handler the server can only be killed.
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await
        }
    }
}
