use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Priority used when the caller does not pick one.
pub const DEFAULT_PRIORITY: u8 = 1;

/// Prefix of every generated order identifier.
pub const ORDER_ID_PREFIX: &str = "AI-";

/// A delivery destination as latitude/longitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DeliveryLocation {
    pub lat: f64,
    pub lng: f64,
}

/// A delivery order as published to the bridge.
///
/// Built client-side; persisting it is the remote service's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub restaurant_id: String,
    pub customer_name: String,
    pub delivery_location: DeliveryLocation,
    pub items: Vec<String>,
    pub priority: u8,
    #[serde(default)]
    pub special_instructions: String,
}

/// Caller input for placing an order, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub restaurant_id: String,
    pub customer_name: String,
    pub delivery_location: DeliveryLocation,
    pub items: Vec<String>,
    pub priority: u8,
    pub special_instructions: Option<String>,
}

impl OrderRequest {
    pub fn new(
        restaurant_id: impl Into<String>,
        customer_name: impl Into<String>,
        delivery_location: DeliveryLocation,
        items: Vec<String>,
    ) -> Self {
        Self {
            restaurant_id: restaurant_id.into(),
            customer_name: customer_name.into(),
            delivery_location,
            items,
            priority: DEFAULT_PRIORITY,
            special_instructions: None,
        }
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn special_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.special_instructions = Some(instructions.into());
        self
    }

    /// Assigns `order_id` and produces the wire order.
    pub fn into_order(self, order_id: String) -> Order {
        Order {
            order_id,
            restaurant_id: self.restaurant_id,
            customer_name: self.customer_name,
            delivery_location: self.delivery_location,
            items: self.items,
            priority: self.priority,
            special_instructions: self.special_instructions.unwrap_or_default(),
        }
    }
}

/// Issues `AI-<millis>` identifiers.
///
/// The suffix is the Unix time in milliseconds, bumped past the last issued
/// value so that ids from one generator are strictly increasing even within
/// the same millisecond.
#[derive(Debug, Default)]
pub struct OrderIdGenerator {
    last: AtomicU64,
}

impl OrderIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_default();
        format!("{}{}", ORDER_ID_PREFIX, now.max(previous + 1))
    }
}
