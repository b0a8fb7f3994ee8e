//! Variable name and plain-text codec endpoints.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::elemental::{
    content_to_string, find_invalid_placeholders, is_valid_variable_name, parse_string_to_content,
    PlainTextDocument, PlainTextNode,
};
use crate::error::{AppError, Result};
use crate::metrics::{ContentMetrics, OperationTimer};

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub name: String,
    pub valid: bool,
}

/// POST /api/v1/variables/validate - Check a variable path
#[tracing::instrument(name = "http.validate_variable", skip(request))]
pub async fn validate_variable(Json(request): Json<ValidateRequest>) -> Result<Json<ValidateResponse>> {
    let timer = OperationTimer::start("validate");
    let valid = is_valid_variable_name(&request.name);

    let result: Result<Json<ValidateResponse>> = Ok(Json(ValidateResponse {
        name: request.name,
        valid,
    }));
    timer.finish(&result);
    result
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub document: PlainTextDocument,
    /// Placeholder tokens kept as literal text
    pub invalid_placeholders: Vec<String>,
}

/// POST /api/v1/content/parse - Split text into text and variable nodes
#[tracing::instrument(name = "http.parse_content", skip(request), fields(len = request.text.len()))]
pub async fn parse_content(Json(request): Json<ParseRequest>) -> Result<Json<ParseResponse>> {
    let timer = OperationTimer::start("parse");

    let document = parse_string_to_content(&request.text);
    let invalid_placeholders = find_invalid_placeholders(&request.text);
    ContentMetrics::record_invalid_placeholders("parse", invalid_placeholders.len());

    let result: Result<Json<ParseResponse>> = Ok(Json(ParseResponse {
        document,
        invalid_placeholders,
    }));
    timer.finish(&result);
    result
}

#[derive(Debug, Deserialize)]
pub struct SerializeRequest {
    pub document: PlainTextDocument,
}

#[derive(Debug, Serialize)]
pub struct SerializeResponse {
    pub text: String,
}

/// POST /api/v1/content/serialize - Flatten a document back into text
#[tracing::instrument(name = "http.serialize_content", skip(request))]
pub async fn serialize_content(Json(request): Json<SerializeRequest>) -> Result<Json<SerializeResponse>> {
    let timer = OperationTimer::start("serialize");

    let result: Result<Json<SerializeResponse>> = match &request.document {
        PlainTextNode::Doc { .. } => Ok(Json(SerializeResponse {
            text: content_to_string(&request.document),
        })),
        _ => Err(AppError::Validation(
            "document root must have type \"doc\"".to_string(),
        )),
    };
    timer.finish(&result);
    result
}
