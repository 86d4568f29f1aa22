//! WebSocket endpoint: admission checks, then one reader and one writer
//! task per connection.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use futures_util::stream::{SplitSink, StreamExt};
use futures_util::sink::SinkExt;
use partyhub_protocol::{Event, RoomId, UserId, decode_event};
use partyhub_room::{Client, Frame};
use partyhub_store::Gateway;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{ApiError, AppState};

/// Query parameters of `GET /room/{room_id}/ws`.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub user_id: String,
}

/// Upgrades to a WebSocket only for a known user of an existing room.
///
/// # Errors
/// - 404 if the room does not exist
/// - 400 if the user was not issued for this room
/// - 500 if the store could not answer
pub async fn websocket_handler<G: Gateway>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<G>>>,
    Path(room_id): Path<String>,
    Query(query): Query<ConnectQuery>,
) -> Result<Response, ApiError> {
    let room_id = RoomId::new(room_id);
    let user_id = UserId::new(query.user_id);

    if !state.gateway.room_exists(&room_id).await? {
        return Err(ApiError::RoomNotFound(room_id));
    }
    if !state.gateway.user_in_room(&room_id, &user_id).await? {
        return Err(ApiError::UserNotInRoom { room_id, user_id });
    }

    tracing::debug!(%room_id, %user_id, "upgrading connection");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, user_id)))
}

/// Forwards frames queued by the hub to the socket until either side
/// goes away.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Frame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender
                .send(Message::Text(String::from(&*frame).into()))
                .await
                .is_err()
            {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

async fn handle_socket<G: Gateway>(
    socket: WebSocket,
    state: Arc<AppState<G>>,
    room_id: RoomId,
    user_id: UserId,
) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let client = Client::new(user_id.clone(), tx);
    let conn_id = client.conn_id();

    let player_count = match state.registry.register(room_id.clone(), client).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(%room_id, %user_id, %conn_id, error = %e, "registration failed");
            let _ = sender
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::AWAY,
                    reason: e.to_string().into(),
                })))
                .await;
            return;
        }
    };
    tracing::info!(%room_id, %user_id, %conn_id, player_count, "client connected");
    state
        .hub
        .publish(Event::room_join(room_id.clone(), user_id.clone(), player_count));

    let mut send_task = pusher_loop(rx, sender);

    let reader_state = Arc::clone(&state);
    let reader_room = room_id.clone();
    let reader_user = user_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!(room_id = %reader_room, user_id = %reader_user, error = %e, "read failed");
                    break;
                }
            };
            match msg {
                Message::Text(text) => {
                    handle_frame(&reader_state, &reader_room, &reader_user, text.as_str().as_bytes()).await
                }
                Message::Binary(bytes) => {
                    handle_frame(&reader_state, &reader_room, &reader_user, &bytes).await
                }
                Message::Close(_) => break,
                // Ping/pong is answered by the protocol layer.
                _ => {}
            }
        }
    });

    // When either half finishes, stop the other.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    match state
        .registry
        .unregister(room_id.clone(), user_id.clone(), conn_id)
        .await
    {
        Ok(_) => tracing::info!(%room_id, %user_id, %conn_id, "client disconnected"),
        Err(e) => tracing::warn!(%room_id, %user_id, %conn_id, error = %e, "unregister failed"),
    }
}

/// Decodes one client frame and hands it to the game layer.
///
/// Bad frames are logged and skipped; they never close the connection.
async fn handle_frame<G: Gateway>(
    state: &AppState<G>,
    room_id: &RoomId,
    user_id: &UserId,
    data: &[u8],
) {
    if data.is_empty() {
        return;
    }
    let event = match decode_event(&state.codec, data) {
        Ok(event) => event.reattributed(room_id.clone(), user_id.clone()),
        Err(e) => {
            tracing::warn!(%room_id, %user_id, error = %e, "invalid client message");
            return;
        }
    };
    tracing::debug!(%room_id, %user_id, kind = %event.kind(), "client event");
    state.games.dispatch(event).await;
}
