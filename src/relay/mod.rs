mod event;
mod hub;
mod registry;
mod ws;

use axum::{Router, routing::get};

use crate::AppState;

pub use event::{
    ClientEvent, MessagePayload, PingPayload, ReadPayload, ServerEvent, TypingPayload,
};
pub use hub::{Hub, PeerSender};
pub use registry::{ConnectionId, Registry};

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws::relay_ws))
}
