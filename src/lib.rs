//! Delivery agent toolkit.
//!
//! Re-exports the two library crates of the workspace: `rosbridge_client` for
//! the WebSocket pub/sub bridge and `delivery_core` for the delivery and text
//! generation tools built on it. The HTTP service lives in `services/api`.

pub use delivery_core;
pub use rosbridge_client;
