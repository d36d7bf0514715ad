//! Axum Handlers for the HTTP tool surface
//!
//! Every tool endpoint answers `200` with a result record, whether the
//! underlying operation succeeded or not. Only requests that cannot be turned
//! into an operation are rejected, with `400`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use delivery_core::{
    ToolResult,
    assistant::{Answer, Explanation, GeneratedCode, Ideas},
    delivery::{DEFAULT_STATUS_DURATION, OrderPlaced, OrderStatusReport, RestaurantListing},
};
use std::{sync::Arc, time::Duration};
use tracing::warn;

use crate::{
    models::{
        AskPayload, CodePayload, CreateOrderPayload, ErrorResponse, ExplainPayload,
        HealthResponse, IdeasPayload, StatusQuery,
    },
    state::AppState,
};

/// Largest idea count accepted by `/ideas`.
pub const MAX_IDEAS: u32 = 20;

pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                warn!(%message, "Rejected request.");
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Fetch the restaurant listing from the delivery backend.
#[utoipa::path(
    get,
    path = "/restaurants",
    responses(
        (status = 200, description = "Result record carrying `restaurant_data` or `error_message`")
    )
)]
pub async fn get_restaurants(
    State(state): State<Arc<AppState>>,
) -> Json<ToolResult<RestaurantListing>> {
    Json(state.delivery.get_restaurant_options().await)
}

/// Place a delivery order.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 200, description = "Result record carrying `order_id` and `order_details`"),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<Json<ToolResult<OrderPlaced>>, ApiError> {
    require("restaurant_id", &payload.restaurant_id)?;
    require("customer_name", &payload.customer_name)?;
    if payload.items.is_empty() {
        return Err(ApiError::BadRequest("items must not be empty".to_string()));
    }

    let result = state
        .delivery
        .create_delivery_order(payload.into_request())
        .await;
    Ok(Json(result))
}

/// Wait for a status update for an order.
#[utoipa::path(
    get,
    path = "/orders/{id}/status",
    params(
        ("id" = String, Path, description = "Order ID"),
        StatusQuery
    ),
    responses(
        (status = 200, description = "Result record carrying `order_status` or a timeout `error_message`")
    )
)]
pub async fn get_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Json<ToolResult<OrderStatusReport>> {
    let duration = query
        .duration
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_STATUS_DURATION);
    Json(state.delivery.track_order_status(&id, duration).await)
}

/// Ask the text generation service a question.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskPayload,
    responses(
        (status = 200, description = "Result record carrying `answer`"),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskPayload>,
) -> Result<Json<ToolResult<Answer>>, ApiError> {
    require("question", &payload.question)?;
    Ok(Json(
        state.assistant.ask(&payload.question, &payload.context).await,
    ))
}

/// Generate code for a description.
#[utoipa::path(
    post,
    path = "/code",
    request_body = CodePayload,
    responses(
        (status = 200, description = "Result record carrying `code`"),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
pub async fn generate_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CodePayload>,
) -> Result<Json<ToolResult<GeneratedCode>>, ApiError> {
    require("description", &payload.description)?;
    Ok(Json(
        state
            .assistant
            .generate_code(&payload.description, &payload.language)
            .await,
    ))
}

/// Brainstorm ideas on a topic.
#[utoipa::path(
    post,
    path = "/ideas",
    request_body = IdeasPayload,
    responses(
        (status = 200, description = "Result record carrying `ideas`"),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
pub async fn brainstorm_ideas(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IdeasPayload>,
) -> Result<Json<ToolResult<Ideas>>, ApiError> {
    require("topic", &payload.topic)?;
    if payload.count == 0 || payload.count > MAX_IDEAS {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {}",
            MAX_IDEAS
        )));
    }
    Ok(Json(
        state
            .assistant
            .brainstorm_ideas(&payload.topic, payload.count)
            .await,
    ))
}

/// Explain a concept at a given level.
#[utoipa::path(
    post,
    path = "/explain",
    request_body = ExplainPayload,
    responses(
        (status = 200, description = "Result record carrying `explanation`"),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
pub async fn explain_concept(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExplainPayload>,
) -> Result<Json<ToolResult<Explanation>>, ApiError> {
    require("concept", &payload.concept)?;
    Ok(Json(
        state
            .assistant
            .explain_concept(&payload.concept, &payload.level)
            .await,
    ))
}
