//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the service clients
//! every handler needs.

use delivery_core::{Assistant, DeliveryService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub delivery: Arc<DeliveryService>,
    pub assistant: Assistant,
}
