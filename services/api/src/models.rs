//! API Models
//!
//! Request payloads and auxiliary responses for the HTTP tool surface. The
//! tool responses themselves are the `ToolResult` records from
//! `delivery-core`, serialised as-is.

use delivery_core::{DeliveryLocation, OrderRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

fn default_language() -> String {
    "Python".to_string()
}

fn default_idea_count() -> u32 {
    5
}

fn default_level() -> String {
    "beginner".to_string()
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct AskPayload {
    #[schema(example = "What is AI?")]
    pub question: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct CodePayload {
    #[schema(example = "Create a hello function")]
    pub description: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct IdeasPayload {
    #[schema(example = "AI applications")]
    pub topic: String,
    #[serde(default = "default_idea_count")]
    pub count: u32,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct ExplainPayload {
    #[schema(example = "Machine Learning")]
    pub concept: String,
    #[serde(default = "default_level")]
    pub level: String,
}

#[derive(Deserialize, ToSchema, Debug, Clone, Copy)]
pub struct LocationPayload {
    #[schema(example = 37.7749)]
    pub lat: f64,
    #[schema(example = -122.4194)]
    pub lng: f64,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct CreateOrderPayload {
    #[schema(example = "rest_123")]
    pub restaurant_id: String,
    #[schema(example = "John Doe")]
    pub customer_name: String,
    pub delivery_location: LocationPayload,
    pub items: Vec<String>,
    pub priority: Option<u8>,
    pub special_instructions: Option<String>,
}

impl CreateOrderPayload {
    pub fn into_request(self) -> OrderRequest {
        let location = DeliveryLocation {
            lat: self.delivery_location.lat,
            lng: self.delivery_location.lng,
        };
        let mut request =
            OrderRequest::new(self.restaurant_id, self.customer_name, location, self.items);
        if let Some(priority) = self.priority {
            request = request.priority(priority);
        }
        if let Some(instructions) = self.special_instructions {
            request = request.special_instructions(instructions);
        }
        request
    }
}

#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// Polling budget in seconds.
    pub duration: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
