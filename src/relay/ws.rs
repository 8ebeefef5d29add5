use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::event::ClientEvent;
use super::hub::Hub;

#[debug_handler(state = crate::AppState)]
pub async fn relay_ws(State(hub): State<Arc<Hub>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| client_session(hub, socket))
}

async fn client_session(hub: Arc<Hub>, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let conn = hub.attach(tx);
    info!(%conn, "connected");

    let write_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if sender.send(Message::from(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = receiver.next().await {
        let Ok(event) = serde_json::from_slice::<ClientEvent>(&frame.into_data()) else {
            debug!(%conn, "ignoring malformed frame");
            continue;
        };
        hub.handle(conn, event);
    }

    // read loop ended: the socket is gone, tear everything down
    hub.detach(conn);
    write_task.abort();
    info!(%conn, "disconnected");
}
