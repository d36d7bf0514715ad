//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the tool endpoints and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        AskPayload, CodePayload, CreateOrderPayload, ErrorResponse, ExplainPayload,
        HealthResponse, IdeasPayload, LocationPayload,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_restaurants,
        handlers::create_order,
        handlers::get_order_status,
        handlers::ask,
        handlers::generate_code,
        handlers::brainstorm_ideas,
        handlers::explain_concept,
    ),
    components(
        schemas(AskPayload, CodePayload, IdeasPayload, ExplainPayload, CreateOrderPayload, LocationPayload, HealthResponse, ErrorResponse)
    ),
    tags(
        (name = "Delivery Agent API", description = "Delivery bridge and text generation tools")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/health", get(handlers::health))
        .route("/restaurants", get(handlers::get_restaurants))
        .route("/orders", post(handlers::create_order))
        .route("/orders/{id}/status", get(handlers::get_order_status))
        .route("/ask", post(handlers::ask))
        .route("/code", post(handlers::generate_code))
        .route("/ideas", post(handlers::brainstorm_ideas))
        .route("/explain", post(handlers::explain_concept))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
