//! Delivery Operations
//!
//! Restaurant lookup, order placement and order-status polling over the
//! rosbridge. Each operation opens its own bridge connection, performs at most
//! one publish and one receive, closes the connection on every path and
//! reports a `ToolResult` instead of an error.

use crate::{
    order::{Order, OrderIdGenerator, OrderRequest},
    outcome::ToolResult,
};
use rosbridge_client::{BridgeError, Connector, PubSub};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};

pub const RESTAURANT_REQUEST_TOPIC: &str = "/delivery/restaurant_request";
pub const RESTAURANT_DATA_TOPIC: &str = "/delivery/restaurant_data";
pub const ORDER_REQUEST_TOPIC: &str = "/delivery/order_request";
pub const STATUS_TOPIC: &str = "/delivery/status";

/// rosbridge type of every message this service publishes. Payloads travel
/// as a JSON document in the message's `data` string.
pub const STRING_MESSAGE_TYPE: &str = "std_msgs/String";

/// How long a restaurant lookup waits for the listing.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound on a single wait for a status snapshot.
pub const STATUS_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);
/// Status polling budget used when the caller does not give one.
pub const DEFAULT_STATUS_DURATION: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("Malformed response on {topic}: {reason}")]
    MalformedResponse { topic: &'static str, reason: String },
    #[error(
        "Order tracking timeout: no status for order {order_id} within {waited:?} (last status was for {last_seen})"
    )]
    StatusTimeout {
        order_id: String,
        waited: Duration,
        last_seen: String,
    },
    #[error("Order tracking timeout: bridge not reachable for order {order_id} within {waited:?}")]
    ConnectTimeout { order_id: String, waited: Duration },
    #[error("Failed to encode order: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RestaurantListing {
    pub restaurant_data: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderPlaced {
    pub order_id: String,
    pub order_details: Order,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderStatusReport {
    pub order_id: String,
    pub order_status: Value,
}

/// Runs delivery operations against whatever bridge the connector opens.
pub struct DeliveryService {
    connector: Arc<dyn Connector>,
    order_ids: OrderIdGenerator,
    receive_timeout: Duration,
}

impl DeliveryService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            order_ids: OrderIdGenerator::new(),
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
        }
    }

    /// Overrides how long a restaurant lookup waits for its reply.
    pub fn with_receive_timeout(mut self, receive_timeout: Duration) -> Self {
        self.receive_timeout = receive_timeout;
        self
    }

    /// Requests the restaurant listing and waits for the reply.
    #[instrument(name = "get_restaurant_options", skip_all)]
    pub async fn get_restaurant_options(&self) -> ToolResult<RestaurantListing> {
        let result = match self.connector.connect().await {
            Ok(mut bridge) => {
                let result = fetch_restaurants(bridge.as_mut(), self.receive_timeout).await;
                release(bridge).await;
                result
            }
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(listing) => {
                info!("Received restaurant listing.");
                ToolResult::Success(listing)
            }
            Err(e) => {
                error!(error = %e, "Restaurant lookup failed.");
                ToolResult::error(e.to_string())
            }
        }
    }

    /// Publishes a new order. Success means the publish went out; the remote
    /// service does not acknowledge it.
    #[instrument(
        name = "create_delivery_order",
        skip_all,
        fields(restaurant_id = %request.restaurant_id, items = request.items.len())
    )]
    pub async fn create_delivery_order(&self, request: OrderRequest) -> ToolResult<OrderPlaced> {
        let order = request.into_order(self.order_ids.next_id());

        let result = match self.connector.connect().await {
            Ok(mut bridge) => {
                let result = publish_order(bridge.as_mut(), &order).await;
                release(bridge).await;
                result
            }
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                info!(order_id = %order.order_id, "Order published.");
                ToolResult::Success(OrderPlaced {
                    order_id: order.order_id.clone(),
                    order_details: order,
                })
            }
            Err(e) => {
                error!(order_id = %order.order_id, error = %e, "Order placement failed.");
                ToolResult::error(e.to_string())
            }
        }
    }

    /// Waits once for a status snapshot and checks that it belongs to
    /// `order_id`. Connecting counts against `duration`; the wait gets what is
    /// left of it, capped at 5s.
    #[instrument(name = "track_order_status", skip(self))]
    pub async fn track_order_status(
        &self,
        order_id: &str,
        duration: Duration,
    ) -> ToolResult<OrderStatusReport> {
        let started = Instant::now();

        let result = match tokio::time::timeout(duration, self.connector.connect()).await {
            Ok(Ok(mut bridge)) => {
                let attempt_timeout = duration
                    .saturating_sub(started.elapsed())
                    .min(STATUS_ATTEMPT_TIMEOUT);
                let result = await_status(bridge.as_mut(), order_id, attempt_timeout).await;
                release(bridge).await;
                result
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(DeliveryError::ConnectTimeout {
                order_id: order_id.to_string(),
                waited: duration,
            }),
        };

        match result {
            Ok(report) => {
                info!(status = ?report.order_status.get("status"), "Order status received.");
                ToolResult::Success(report)
            }
            Err(e) => {
                warn!(error = %e, "Order status unavailable.");
                ToolResult::error(e.to_string())
            }
        }
    }
}

async fn fetch_restaurants(
    bridge: &mut dyn PubSub,
    timeout: Duration,
) -> Result<RestaurantListing, DeliveryError> {
    bridge
        .publish(RESTAURANT_REQUEST_TOPIC, STRING_MESSAGE_TYPE, json!({"data": ""}))
        .await?;
    let msg = bridge
        .subscribe_and_receive(RESTAURANT_DATA_TOPIC, timeout)
        .await?;
    let restaurant_data = decode_data(RESTAURANT_DATA_TOPIC, &msg)?;
    Ok(RestaurantListing { restaurant_data })
}

async fn publish_order(bridge: &mut dyn PubSub, order: &Order) -> Result<(), DeliveryError> {
    let data = serde_json::to_string(order)?;
    bridge
        .publish(ORDER_REQUEST_TOPIC, STRING_MESSAGE_TYPE, json!({ "data": data }))
        .await?;
    Ok(())
}

async fn await_status(
    bridge: &mut dyn PubSub,
    order_id: &str,
    timeout: Duration,
) -> Result<OrderStatusReport, DeliveryError> {
    let msg = bridge.subscribe_and_receive(STATUS_TOPIC, timeout).await?;
    let order_status = decode_data(STATUS_TOPIC, &msg)?;

    let current = order_status
        .get("current_order_id")
        .and_then(Value::as_str);
    if current == Some(order_id) {
        return Ok(OrderStatusReport {
            order_id: order_id.to_string(),
            order_status,
        });
    }

    Err(DeliveryError::StatusTimeout {
        order_id: order_id.to_string(),
        waited: timeout,
        last_seen: current.unwrap_or("no order").to_string(),
    })
}

/// Parses the JSON document carried in a `std_msgs/String` message.
fn decode_data(topic: &'static str, msg: &Value) -> Result<Value, DeliveryError> {
    let data = msg
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| DeliveryError::MalformedResponse {
            topic,
            reason: "message has no string 'data' field".to_string(),
        })?;
    serde_json::from_str(data).map_err(|e| DeliveryError::MalformedResponse {
        topic,
        reason: e.to_string(),
    })
}

async fn release(mut bridge: Box<dyn PubSub>) {
    if let Err(e) = bridge.close().await {
        warn!(error = %e, "Failed to close bridge connection.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::DeliveryLocation;
    use async_trait::async_trait;
    use mockall::{mock, predicate::eq};
    use std::sync::Mutex;

    mock! {
        pub Bridge {}

        #[async_trait]
        impl PubSub for Bridge {
            async fn publish(&mut self, topic: &str, message_type: &str, msg: Value) -> Result<(), BridgeError>;
            async fn subscribe_and_receive(&mut self, topic: &str, timeout: Duration) -> Result<Value, BridgeError>;
            async fn close(&mut self) -> Result<(), BridgeError>;
        }
    }

    mock! {
        pub BridgeConnector {}

        #[async_trait]
        impl Connector for BridgeConnector {
            async fn connect(&self) -> Result<Box<dyn PubSub>, BridgeError>;
        }
    }

    fn service_with(bridge: MockBridge) -> DeliveryService {
        let mut connector = MockBridgeConnector::new();
        connector
            .expect_connect()
            .times(1)
            .return_once(move || Ok(Box::new(bridge) as Box<dyn PubSub>));
        DeliveryService::new(Arc::new(connector))
    }

    fn closing_bridge() -> MockBridge {
        let mut bridge = MockBridge::new();
        bridge.expect_close().times(1).returning(|| Ok(()));
        bridge
    }

    fn sample_request() -> OrderRequest {
        OrderRequest::new(
            "rest_123",
            "John Doe",
            DeliveryLocation {
                lat: 37.7749,
                lng: -122.4194,
            },
            vec!["pizza".to_string(), "soda".to_string()],
        )
    }

    #[tokio::test]
    async fn test_get_restaurant_options_success() {
        let mut bridge = closing_bridge();
        bridge
            .expect_publish()
            .with(
                eq(RESTAURANT_REQUEST_TOPIC),
                eq(STRING_MESSAGE_TYPE),
                eq(json!({"data": ""})),
            )
            .times(1)
            .returning(|_, _, _| Ok(()));
        bridge
            .expect_subscribe_and_receive()
            .with(eq(RESTAURANT_DATA_TOPIC), eq(DEFAULT_RECEIVE_TIMEOUT))
            .times(1)
            .returning(|_, _| {
                Ok(json!({
                    "data": "{\"restaurants\":[{\"id\":\"1\",\"name\":\"Pizza Place\"}]}"
                }))
            });

        let result = service_with(bridge).get_restaurant_options().await;

        let listing = result.payload().expect("lookup should succeed");
        assert_eq!(
            listing.restaurant_data["restaurants"][0],
            json!({"id": "1", "name": "Pizza Place"})
        );
    }

    #[tokio::test]
    async fn test_get_restaurant_options_connection_failure() {
        let mut connector = MockBridgeConnector::new();
        connector.expect_connect().times(1).returning(|| {
            Err(BridgeError::Connection {
                url: "ws://test-url".to_string(),
                reason: "Connection failed".to_string(),
            })
        });
        let service = DeliveryService::new(Arc::new(connector));

        let result = service.get_restaurant_options().await;

        assert!(!result.is_success());
        assert!(result.error_message().unwrap().contains("Connection failed"));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "error");
        assert!(value.get("error_message").is_some());
    }

    #[tokio::test]
    async fn test_get_restaurant_options_timeout_still_closes() {
        let mut bridge = closing_bridge();
        bridge.expect_publish().returning(|_, _, _| Ok(()));
        bridge.expect_subscribe_and_receive().returning(|topic, timeout| {
            Err(BridgeError::Timeout {
                topic: topic.to_string(),
                timeout,
            })
        });

        let result = service_with(bridge).get_restaurant_options().await;

        assert!(result.error_message().unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn test_get_restaurant_options_malformed_data() {
        let mut bridge = closing_bridge();
        bridge.expect_publish().returning(|_, _, _| Ok(()));
        bridge
            .expect_subscribe_and_receive()
            .returning(|_, _| Ok(json!({"data": "{not json"})));

        let result = service_with(bridge).get_restaurant_options().await;

        assert!(result.error_message().unwrap().contains("Malformed response"));
    }

    #[tokio::test]
    async fn test_custom_receive_timeout_is_used() {
        let mut bridge = closing_bridge();
        bridge.expect_publish().returning(|_, _, _| Ok(()));
        bridge
            .expect_subscribe_and_receive()
            .with(eq(RESTAURANT_DATA_TOPIC), eq(Duration::from_secs(2)))
            .returning(|_, _| Ok(json!({"data": "{\"restaurants\":[]}"})));

        let service = service_with(bridge).with_receive_timeout(Duration::from_secs(2));
        assert!(service.get_restaurant_options().await.is_success());
    }

    #[tokio::test]
    async fn test_create_delivery_order_success() {
        let published = Arc::new(Mutex::new(None));
        let captured = published.clone();
        let mut bridge = closing_bridge();
        bridge
            .expect_publish()
            .with(
                eq(ORDER_REQUEST_TOPIC),
                eq(STRING_MESSAGE_TYPE),
                mockall::predicate::always(),
            )
            .times(1)
            .returning(move |_, _, msg| {
                *captured.lock().unwrap() = Some(msg);
                Ok(())
            });

        let request = sample_request()
            .priority(2)
            .special_instructions("Extra cheese please");
        let result = service_with(bridge).create_delivery_order(request).await;

        let placed = result.payload().expect("order should be placed");
        assert!(placed.order_id.starts_with("AI-"));
        assert_eq!(placed.order_details.restaurant_id, "rest_123");
        assert_eq!(placed.order_details.customer_name, "John Doe");
        assert_eq!(placed.order_details.items, vec!["pizza", "soda"]);

        let msg = published.lock().unwrap().take().unwrap();
        let data = msg["data"].as_str().unwrap();
        let order: Value = serde_json::from_str(data).unwrap();
        assert_eq!(order["order_id"], placed.order_id.as_str());
        assert_eq!(order["restaurant_id"], "rest_123");
        assert_eq!(order["customer_name"], "John Doe");
        assert_eq!(order["delivery_location"], json!({"lat": 37.7749, "lng": -122.4194}));
        assert_eq!(order["items"], json!(["pizza", "soda"]));
        assert_eq!(order["priority"], 2);
        assert_eq!(order["special_instructions"], "Extra cheese please");
    }

    #[tokio::test]
    async fn test_create_delivery_order_ids_differ() {
        let mut connector = MockBridgeConnector::new();
        connector.expect_connect().times(2).returning(|| {
            let mut bridge = closing_bridge();
            bridge.expect_publish().returning(|_, _, _| Ok(()));
            Ok(Box::new(bridge) as Box<dyn PubSub>)
        });
        let service = DeliveryService::new(Arc::new(connector));

        let first = service.create_delivery_order(sample_request()).await;
        let second = service.create_delivery_order(sample_request()).await;

        let first_id = &first.payload().unwrap().order_id;
        let second_id = &second.payload().unwrap().order_id;
        assert_ne!(first_id, second_id);
        assert_eq!(first.payload().unwrap().order_details.priority, 1);
    }

    #[tokio::test]
    async fn test_create_delivery_order_publish_failure() {
        let mut bridge = closing_bridge();
        bridge
            .expect_publish()
            .returning(|_, _, _| Err(BridgeError::Transport("broken pipe".to_string())));

        let result = service_with(bridge).create_delivery_order(sample_request()).await;

        assert!(result.error_message().unwrap().contains("broken pipe"));
    }

    #[tokio::test]
    async fn test_close_failure_does_not_mask_success() {
        let mut bridge = MockBridge::new();
        bridge.expect_publish().returning(|_, _, _| Ok(()));
        bridge
            .expect_close()
            .times(1)
            .returning(|| Err(BridgeError::Transport("reset".to_string())));

        let result = service_with(bridge).create_delivery_order(sample_request()).await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_track_order_status_success() {
        let mut bridge = closing_bridge();
        bridge
            .expect_subscribe_and_receive()
            .with(eq(STATUS_TOPIC), eq(STATUS_ATTEMPT_TIMEOUT))
            .times(1)
            .returning(|_, _| {
                Ok(json!({
                    "data": json!({
                        "current_order_id": "AI-1234567890",
                        "status": "in_progress",
                        "estimated_delivery": "2024-01-15T14:30:00Z"
                    })
                    .to_string()
                }))
            });

        let result = service_with(bridge)
            .track_order_status("AI-1234567890", Duration::from_secs(10))
            .await;

        let report = result.payload().expect("status should match");
        assert_eq!(report.order_id, "AI-1234567890");
        assert_eq!(report.order_status["status"], "in_progress");
    }

    #[tokio::test]
    async fn test_track_order_status_mismatch_is_timeout() {
        let mut bridge = closing_bridge();
        bridge
            .expect_subscribe_and_receive()
            .withf(|_, timeout| *timeout <= Duration::from_secs(1))
            .times(1)
            .returning(|_, _| {
                Ok(json!({
                    "data": "{\"current_order_id\":\"different_order_id\",\"status\":\"in_progress\"}"
                }))
            });

        let result = service_with(bridge)
            .track_order_status("AI-1234567890", Duration::from_secs(1))
            .await;

        assert!(!result.is_success());
        let message = result.error_message().unwrap();
        assert!(message.contains("timeout"));
        assert!(message.contains("different_order_id"));
    }

    #[tokio::test]
    async fn test_track_order_status_bridge_timeout() {
        let mut bridge = closing_bridge();
        bridge.expect_subscribe_and_receive().returning(|topic, timeout| {
            Err(BridgeError::Timeout {
                topic: topic.to_string(),
                timeout,
            })
        });

        let result = service_with(bridge)
            .track_order_status("AI-1", Duration::from_secs(3))
            .await;

        assert!(result.error_message().unwrap().contains("timeout"));
    }

    /// Never finishes connecting.
    struct StalledConnector;

    #[async_trait]
    impl Connector for StalledConnector {
        async fn connect(&self) -> Result<Box<dyn PubSub>, BridgeError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_track_order_status_stalled_connect_respects_duration() {
        let service = DeliveryService::new(Arc::new(StalledConnector));
        let duration = Duration::from_millis(300);

        let started = std::time::Instant::now();
        let result = service.track_order_status("AI-1", duration).await;
        let elapsed = started.elapsed();

        assert!(elapsed >= duration);
        assert!(elapsed < duration + Duration::from_secs(1));
        let message = result.error_message().unwrap();
        assert!(message.contains("timeout"));
        assert!(message.contains("AI-1"));
    }

    #[tokio::test]
    async fn test_track_order_status_wait_shrinks_after_slow_connect() {
        let mut connector = MockBridgeConnector::new();
        connector.expect_connect().times(1).returning(|| {
            std::thread::sleep(Duration::from_millis(200));
            let mut bridge = closing_bridge();
            bridge
                .expect_subscribe_and_receive()
                .withf(|_, timeout| *timeout <= Duration::from_millis(800))
                .times(1)
                .returning(|topic, timeout| {
                    Err(BridgeError::Timeout {
                        topic: topic.to_string(),
                        timeout,
                    })
                });
            Ok(Box::new(bridge) as Box<dyn PubSub>)
        });
        let service = DeliveryService::new(Arc::new(connector));

        let result = service
            .track_order_status("AI-1", Duration::from_secs(1))
            .await;
        assert!(result.error_message().unwrap().contains("timeout"));
    }
}
