//! Shared state handed to every request handler.

use std::sync::Arc;

use partyhub_game::GameController;
use partyhub_protocol::JsonCodec;
use partyhub_room::{HubHandle, RegistryHandle};
use partyhub_store::Gateway;

/// Built once at startup and shared behind an `Arc`.
///
/// Every field is a handle to an actor or a shared service, so handlers
/// never lock anything here.
pub struct AppState<G: Gateway> {
    pub gateway: Arc<G>,
    pub registry: RegistryHandle,
    pub hub: HubHandle,
    pub games: GameController<G>,
    pub codec: JsonCodec,
}
