//! rosbridge Client
//!
//! A small client for the rosbridge JSON protocol: publish/subscribe over a
//! WebSocket. It is structured into submodules:
//!
//! - `protocol`: The JSON envelopes sent to and received from the bridge.
//! - `transport`: The text-frame transport seam and its WebSocket implementation.
//! - `bridge`: `RosBridge`, the connect/publish/subscribe/close surface, plus
//!   the `PubSub` and `Connector` traits callers program against.
//! - `error`: The `BridgeError` taxonomy.

pub mod bridge;
pub mod error;
pub mod protocol;
pub mod transport;

pub use bridge::{Connector, DEFAULT_CONNECT_TIMEOUT, PubSub, RosBridge, WsConnector};
pub use error::BridgeError;
pub use transport::{Transport, WsTransport};
