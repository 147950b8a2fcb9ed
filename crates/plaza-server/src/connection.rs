//! Accept loop and per-connection handler: register, route frames, then
//! retain the participant offline on close.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use plaza_common::ParticipantId;
use plaza_session::dispatcher::OUTBOX_CAPACITY;
use plaza_session::World;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use crate::protocol::ClientMessage;

/// Accept connections forever, one task per connection.
pub async fn serve(listener: TcpListener, world: World) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let world = world.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, addr, world).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

/// Handle a single WebSocket connection.
pub async fn handle_connection(ws: WebSocketStream<TcpStream>, addr: SocketAddr, world: World) {
    let (mut sink, mut stream) = ws.split();

    // 1. Give the connection its identity and an outbox.
    let id = ParticipantId::new();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOX_CAPACITY);
    world.connect(id.clone(), tx).await;
    tracing::debug!(peer = %addr, participant = %id, "Client connected");

    // 2. Pump outbound events and inbound frames until either side closes.
    loop {
        tokio::select! {
            Some(frame) = rx.recv() => {
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(&world, &id, addr, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // 3. Keep the participant in the world as offline.
    world.disconnect(&id).await;
    tracing::debug!(peer = %addr, participant = %id, "Client disconnected");
}

async fn handle_text(world: &World, id: &ParticipantId, addr: SocketAddr, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Join { name, client_meta }) => {
            // Rejections are reported to the client by the world.
            let _ = world.join(id, &name, client_meta).await;
        }
        Ok(ClientMessage::Move { dx, dy }) => {
            world.move_by(id, dx, dy).await;
        }
        Err(e) => {
            tracing::warn!(peer = %addr, participant = %id, error = %e, "Invalid client message");
        }
    }
}
