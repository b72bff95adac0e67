// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Each text frame is one request; each request gets exactly one reply
//! carrying the same `request_id`. Frames that cannot be parsed get an
//! `error` reply.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use fit_core::protocol::{ClientMessage, ServerMessage};
use fit_core::Identity;

use crate::state::ServerState;
use crate::store::StoreError;

/// Run the WebSocket server on the given address.
pub async fn run(
    addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);
    serve(listener, state).await?;
    Ok(())
}

/// Accept connections from `listener` until it fails.
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                debug!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = handle_client_message(&text, &state).await;
                let json = response.to_json()?;
                ws_sink.send(Message::Text(json.into())).await?;
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", peer_addr);
                break;
            }
            Ok(Message::Ping(data)) => {
                ws_sink.send(Message::Pong(data)).await?;
            }
            Ok(_) => {
                // Ignore other message types (Binary, Pong, Frame)
            }
            Err(e) => {
                warn!("WebSocket error from {}: {}", peer_addr, e);
                break;
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Process one request frame and build its reply.
pub(crate) async fn handle_client_message(text: &str, state: &ServerState) -> ServerMessage {
    let msg = match ClientMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Unparseable frame: {}", e);
            return ServerMessage::error(format!("invalid message: {e}"));
        }
    };
    debug!("Received message: {}", msg.name());

    match msg {
        ClientMessage::Ping { id } => ServerMessage::pong(id),

        ClientMessage::CreateWorkout {
            request_id,
            token,
            fields,
        } => {
            let owner = match owner_of(&token) {
                Ok(owner) => owner,
                Err(reply) => return reply.with(request_id),
            };
            if let Err(e) = fields.validate() {
                return ServerMessage::rejected(request_id, 422, e.to_string());
            }
            match state.create(&owner, &fields).await {
                Ok(created) => {
                    debug!(
                        owner = %owner,
                        workout = %fields.client_workout_id,
                        inserted = created.inserted,
                        "create_workout"
                    );
                    ServerMessage::created(request_id, created.record)
                }
                Err(e) => store_failure(request_id, e),
            }
        }

        ClientMessage::DeleteWorkout {
            request_id,
            token,
            workout_id,
        } => {
            let owner = match owner_of(&token) {
                Ok(owner) => owner,
                Err(reply) => return reply.with(request_id),
            };
            if workout_id.trim().is_empty() {
                return ServerMessage::rejected(request_id, 422, "workout id is required");
            }
            match state.delete(&owner, &workout_id).await {
                Ok(existed) => {
                    debug!(owner = %owner, workout = %workout_id, existed, "delete_workout");
                    ServerMessage::deleted(request_id)
                }
                Err(e) => store_failure(request_id, e),
            }
        }

        ClientMessage::ListWorkouts { request_id, token } => {
            let owner = match owner_of(&token) {
                Ok(owner) => owner,
                Err(reply) => return reply.with(request_id),
            };
            match state.list(&owner).await {
                Ok(records) => ServerMessage::workouts(request_id, records),
                Err(e) => store_failure(request_id, e),
            }
        }
    }
}

/// A rejection waiting for the request id it answers.
struct Unauthorized;

impl Unauthorized {
    fn with(self, request_id: u64) -> ServerMessage {
        ServerMessage::rejected(request_id, 401, "missing or empty token")
    }
}

/// Workouts are owned by the token's fingerprint so raw tokens never hit disk.
fn owner_of(token: &str) -> Result<String, Unauthorized> {
    Identity::new(token)
        .map(|identity| identity.fingerprint())
        .map_err(|_| Unauthorized)
}

fn store_failure(request_id: u64, e: StoreError) -> ServerMessage {
    error!("Store error: {}", e);
    ServerMessage::rejected(request_id, 500, "storage failure")
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
