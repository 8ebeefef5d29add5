//! Wire vocabulary. Frames are JSON of the form `{"event": .., "data": ..}`;
//! event names and payload fields match what the front-end already emits.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything a client may send us. Frames that decode to none of these are
/// dropped at the socket boundary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "joinRoom")]
    JoinRoom(String),
    #[serde(rename = "leaveRoom")]
    LeaveRoom(String),
    #[serde(rename = "send_msg")]
    SendMsg(MessagePayload),
    #[serde(rename = "typing")]
    Typing(TypingPayload),
    #[serde(rename = "stopTyping")]
    StopTyping(TypingPayload),
    #[serde(rename = "markAsRead")]
    MarkAsRead(ReadPayload),
    #[serde(rename = "ping")]
    Ping(PingPayload),
}

/// Everything we may send a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "receive_msg")]
    ReceiveMsg(MessagePayload),
    #[serde(rename = "typing")]
    Typing {
        #[serde(rename = "userId")]
        user_id: String,
    },
    #[serde(rename = "stopTyping")]
    StopTyping {
        #[serde(rename = "userId")]
        user_id: String,
    },
    #[serde(rename = "conversationRead")]
    ConversationRead {
        #[serde(rename = "conversationId")]
        conversation_id: String,
        #[serde(rename = "userId")]
        user_id: String,
    },
    #[serde(rename = "pong")]
    Pong { message: String },
}

/// A chat message in flight. The relay never interprets anything here beyond
/// `roomId`; unrecognized fields ride along in `extra` and are re-emitted
/// verbatim, the way the original gateway forwarded the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(rename = "roomId")]
    pub room_id: String,
    pub id: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub content: String,
    pub sender_email: String,
    pub sent_by: String,
    pub sent_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypingPayload {
    #[serde(rename = "roomId")]
    pub room_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadPayload {
    #[serde(rename = "conversationId")]
    pub conversation_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PingPayload {
    #[serde(default)]
    pub message: Option<String>,
}
