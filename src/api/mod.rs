//! API layer - HTTP endpoint handlers organized by domain.

mod content;
mod elemental;
mod health;
mod metrics;
mod routes;

// Re-export all handlers for use in server/app.rs
pub use content::{
    parse_content, serialize_content, validate_variable, ParseRequest, ParseResponse,
    SerializeRequest, SerializeResponse, ValidateRequest, ValidateResponse,
};
pub use elemental::{
    extract_variables, preview_elements, update_document, update_title, PreviewRequest,
    PreviewResponse, TitleRequest, TitleResponse, UpdateRequest, VariablesRequest,
    VariablesResponse,
};
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
