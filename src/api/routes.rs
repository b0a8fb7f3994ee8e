use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::content::{parse_content, serialize_content, validate_variable};
use super::elemental::{extract_variables, preview_elements, update_document, update_title};
use super::health::health;
use super::metrics::prometheus_metrics;

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Content endpoints
        .nest(
            "/api/v1",
            Router::new()
                // Variable names
                .route("/variables/validate", post(validate_variable))
                // Plain-text codec
                .route("/content/parse", post(parse_content))
                .route("/content/serialize", post(serialize_content))
                // Channel documents
                .route("/elemental/variables", post(extract_variables))
                .route("/elemental/update", post(update_document))
                .route("/elemental/title", post(update_title))
                .route("/elemental/preview", post(preview_elements))
                .route_layer(middleware::from_fn_with_state(state, api_key_auth)),
        )
}
