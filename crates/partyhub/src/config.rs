//! Server configuration.

use std::path::PathBuf;

use partyhub_game::GameConfig;
use partyhub_room::RegistryConfig;

/// Everything [`PartyHubServerBuilder`](crate::PartyHubServerBuilder)
/// collects before binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` to listen on. Port 0 picks a free port.
    pub bind_addr: String,

    /// Settings for every game session.
    pub game: GameConfig,

    /// Registry actor settings.
    pub registry: RegistryConfig,

    /// Directory served at `/` for paths no route matches.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            game: GameConfig::default(),
            registry: RegistryConfig::default(),
            static_dir: None,
        }
    }
}
