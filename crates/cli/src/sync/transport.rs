// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Frame transport for the remote workout API.
//!
//! [`Transport`] moves protocol frames over one connection. The production
//! implementation speaks WebSocket via tokio-tungstenite; tests substitute a
//! scripted mock.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use fit_core::protocol::{ClientMessage, ServerMessage};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection attempt exceeded the configured timeout.
    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// A frame could not be encoded or decoded.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// One bidirectional frame connection.
pub trait Transport: Send {
    /// Open a connection to `url`, replacing any existing one.
    fn connect(&mut self, url: &str, timeout: Duration) -> TransportFuture<'_, ()>;

    /// Send one frame.
    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()>;

    /// Receive the next frame. `None` means the peer closed the connection.
    fn recv(&mut self) -> TransportFuture<'_, Option<ServerMessage>>;

    /// Drop the connection without a close handshake.
    fn reset(&mut self);

    /// Whether a connection is open.
    fn is_connected(&self) -> bool;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct WebSocketConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

/// WebSocket transport using tokio-tungstenite.
#[derive(Default)]
pub struct WebSocketTransport {
    ws: Option<WebSocketConnection>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str, timeout: Duration) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            self.ws = None;
            let (ws_stream, _) =
                tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url.as_str()))
                    .await
                    .map_err(|_| TransportError::ConnectTimeout(timeout))?
                    .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WebSocketConnection { sink, stream });
            Ok(())
        })
    }

    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;
            let json = msg
                .to_json()
                .map_err(|e| TransportError::Malformed(e.to_string()))?;

            let sent = match ws.sink.send(Message::Text(json.into())).await {
                Ok(()) => ws.sink.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = sent {
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<ServerMessage>> {
        Box::pin(async move {
            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;
            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return ServerMessage::from_json(&text)
                            .map(Some)
                            .map_err(|e| TransportError::Malformed(e.to_string()));
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        self.ws = None;
                        return Ok(None);
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                }
            }
        })
    }

    fn reset(&mut self) {
        self.ws = None;
    }

    fn is_connected(&self) -> bool {
        self.ws.is_some()
    }
}
