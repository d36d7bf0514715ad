//! The publish/subscribe surface over a rosbridge connection.
//!
//! A `RosBridge` is a short-lived, per-call resource: open it, publish and/or
//! wait for one message, then close it. There is no session reuse, no
//! reconnection and no topic multiplexing.

use crate::{
    error::BridgeError,
    protocol::{IncomingFrame, OutgoingFrame},
    transport::{Transport, WsTransport},
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Connect timeout used when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The operations domain code performs on an open bridge.
#[async_trait]
pub trait PubSub: Send {
    /// Publishes `msg` on `topic` with the given rosbridge message type.
    async fn publish(
        &mut self,
        topic: &str,
        message_type: &str,
        msg: Value,
    ) -> Result<(), BridgeError>;

    /// Subscribes to `topic` and waits up to `timeout` for the first message
    /// published on it, returning that message's `msg` payload.
    async fn subscribe_and_receive(
        &mut self,
        topic: &str,
        timeout: Duration,
    ) -> Result<Value, BridgeError>;

    /// Releases the connection. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), BridgeError>;
}

/// Opens a fresh bridge connection for each call.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn PubSub>, BridgeError>;
}

/// A rosbridge client over any text-frame `Transport`.
pub struct RosBridge<T: Transport> {
    transport: Option<T>,
}

impl<T: Transport> RosBridge<T> {
    /// Wraps an already open transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    fn transport(&mut self) -> Result<&mut T, BridgeError> {
        self.transport.as_mut().ok_or(BridgeError::Closed)
    }
}

impl RosBridge<WsTransport> {
    /// Connects to `url` with the default 10 second connect timeout.
    pub async fn connect(url: &str) -> Result<Self, BridgeError> {
        Self::connect_with_timeout(url, DEFAULT_CONNECT_TIMEOUT).await
    }

    pub async fn connect_with_timeout(
        url: &str,
        connect_timeout: Duration,
    ) -> Result<Self, BridgeError> {
        let transport = WsTransport::connect(url, connect_timeout).await?;
        Ok(Self::new(transport))
    }
}

#[async_trait]
impl<T: Transport> PubSub for RosBridge<T> {
    async fn publish(
        &mut self,
        topic: &str,
        message_type: &str,
        msg: Value,
    ) -> Result<(), BridgeError> {
        let text = OutgoingFrame::publish(topic, message_type, msg)
            .to_text()
            .map_err(|e| BridgeError::Malformed(e.to_string()))?;
        debug!(%topic, %message_type, "Publishing to rosbridge.");
        self.transport()?.send_text(text).await
    }

    async fn subscribe_and_receive(
        &mut self,
        topic: &str,
        timeout: Duration,
    ) -> Result<Value, BridgeError> {
        let timed_out = || BridgeError::Timeout {
            topic: topic.to_string(),
            timeout,
        };

        let subscribe = OutgoingFrame::subscribe(topic)
            .to_text()
            .map_err(|e| BridgeError::Malformed(e.to_string()))?;
        let transport = self.transport()?;
        transport.send_text(subscribe).await?;
        debug!(%topic, ?timeout, "Subscribed. Waiting for a message.");

        // `None` when the window is too large to represent; the wait is then unbounded.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let received = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(timed_out());
                    }
                    tokio::time::timeout(remaining, transport.recv_text())
                        .await
                        .map_err(|_| timed_out())?
                }
                None => transport.recv_text().await,
            };

            let text = match received {
                Ok(Some(text)) => text,
                Ok(None) => return Err(BridgeError::Closed),
                Err(e) => return Err(e),
            };

            let frame = match IncomingFrame::parse(&text) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "Discarding unparseable rosbridge frame.");
                    continue;
                }
            };

            if !frame.is_publish_on(topic) {
                debug!(op = %frame.op, frame_topic = ?frame.topic, "Discarding frame for another topic.");
                continue;
            }

            return frame.msg.ok_or_else(|| {
                BridgeError::Malformed(format!("publish frame on '{}' has no 'msg' field", topic))
            });
        }
    }

    async fn close(&mut self) -> Result<(), BridgeError> {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await?;
            info!("rosbridge connection closed.");
        }
        Ok(())
    }
}

/// A `Connector` that dials a rosbridge WebSocket endpoint.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn PubSub>, BridgeError> {
        let bridge = RosBridge::connect_with_timeout(&self.url, self.connect_timeout).await?;
        Ok(Box::new(bridge))
    }
}
