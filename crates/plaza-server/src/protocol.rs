//! Client-to-server wire protocol. Server-to-client events live in
//! `plaza_session::ServerEvent`.

use plaza_session::ClientMeta;
use serde::Deserialize;

/// Messages a client sends over its WebSocket as JSON text frames.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Join {
        #[serde(default)]
        name: String,
        #[serde(default, rename = "clientMeta")]
        client_meta: Option<ClientMeta>,
    },

    Move { dx: f64, dy: f64 },
}
