//! The text-frame transport underneath a `RosBridge`.

use crate::error::BridgeError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, protocol::Message as WsMessage},
};
use tracing::{debug, info, warn};

/// A bidirectional channel of JSON text frames.
#[async_trait]
pub trait Transport: Send {
    /// Sends one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), BridgeError>;

    /// Waits for the next text frame. Returns `Ok(None)` once the peer has
    /// closed the connection.
    async fn recv_text(&mut self) -> Result<Option<String>, BridgeError>;

    /// Closes the underlying connection.
    async fn close(&mut self) -> Result<(), BridgeError>;
}

/// A `Transport` over a tokio-tungstenite WebSocket (`ws://` or `wss://`).
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    /// Opens a WebSocket to `url`, failing if the handshake does not finish
    /// within `connect_timeout`.
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self, BridgeError> {
        match tokio::time::timeout(connect_timeout, connect_async(url)).await {
            Ok(Ok((stream, response))) => {
                info!(%url, status = %response.status(), "Connected to rosbridge WebSocket.");
                Ok(Self { stream })
            }
            Ok(Err(e)) => Err(BridgeError::Connection {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(BridgeError::Connection {
                url: url.to_string(),
                reason: format!("handshake did not complete within {:?}", connect_timeout),
            }),
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), BridgeError> {
        self.stream
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))
    }

    async fn recv_text(&mut self) -> Result<Option<String>, BridgeError> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(Some(text)),
                Some(Ok(WsMessage::Binary(data))) => match String::from_utf8(data) {
                    Ok(text) => return Ok(Some(text)),
                    Err(_) => warn!("Ignoring non UTF-8 binary frame from rosbridge."),
                },
                Some(Ok(WsMessage::Close(close_frame))) => {
                    debug!(?close_frame, "rosbridge closed the connection.");
                    return Ok(None);
                }
                // Pings are answered by tungstenite while reading.
                Some(Ok(_)) => {}
                Some(Err(tungstenite::Error::ConnectionClosed))
                | Some(Err(tungstenite::Error::AlreadyClosed))
                | None => return Ok(None),
                Some(Err(e)) => return Err(BridgeError::Transport(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), BridgeError> {
        match self.stream.close(None).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed)
            | Err(tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(BridgeError::Transport(e.to_string())),
        }
    }
}
