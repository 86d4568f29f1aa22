//! HTTP and WebSocket request handlers.

mod http;
mod ws;

pub use http::{CreateRoomResponse, JoinRoomRequest, JoinRoomResponse, create_room, join_room, ping};
pub use ws::{ConnectQuery, websocket_handler};
