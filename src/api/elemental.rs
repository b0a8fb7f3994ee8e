//! Channel document endpoints.

use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::elemental::{
    create_title_update, extract_variables_from_content, get_subject_storage_format,
    render_preview, update_channel_title, update_elemental, ChannelTarget, ElementalDocument,
    ElementalNode, ElementalUpdate, MetaPatch, SubjectStorageFormat, TitleUpdate,
};
use crate::error::Result;
use crate::metrics::{ContentMetrics, OperationTimer};

#[derive(Debug, Deserialize)]
pub struct VariablesRequest {
    #[serde(default, deserialize_with = "crate::elemental::lenient_or_default")]
    pub elements: Vec<ElementalNode>,
}

#[derive(Debug, Serialize)]
pub struct VariablesResponse {
    pub variables: Vec<String>,
    pub total: usize,
}

/// POST /api/v1/elemental/variables - List the variables a tree references
#[tracing::instrument(name = "http.extract_variables", skip(request), fields(elements = request.elements.len()))]
pub async fn extract_variables(Json(request): Json<VariablesRequest>) -> Result<Json<VariablesResponse>> {
    let timer = OperationTimer::start("variables");

    let variables = extract_variables_from_content(&request.elements);
    ContentMetrics::record_variables(variables.len());
    tracing::debug!(total = variables.len(), "Variables extracted");

    let result: Result<Json<VariablesResponse>> = Ok(Json(VariablesResponse {
        total: variables.len(),
        variables,
    }));
    timer.finish(&result);
    result
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default, deserialize_with = "crate::elemental::lenient")]
    pub document: Option<ElementalDocument>,
    #[serde(default, deserialize_with = "crate::elemental::lenient_or_default")]
    pub elements: Vec<ElementalNode>,
    #[serde(default, deserialize_with = "crate::elemental::lenient")]
    pub channel: Option<ChannelTarget>,
    #[serde(default, deserialize_with = "crate::elemental::lenient")]
    pub meta: Option<MetaPatch>,
}

/// POST /api/v1/elemental/update - Replace one channel's content
#[tracing::instrument(
    name = "http.update_document",
    skip(request),
    fields(channel = request.channel.as_ref().and_then(|c| c.name()).unwrap_or("-"))
)]
pub async fn update_document(Json(request): Json<UpdateRequest>) -> Result<Json<ElementalDocument>> {
    let timer = OperationTimer::start("update");

    let update = ElementalUpdate {
        elements: request.elements,
        channel: request.channel,
        meta: request.meta,
    };
    let result: Result<Json<ElementalDocument>> = Ok(Json(update_elemental(request.document.as_ref(), &update)));
    timer.finish(&result);
    result
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    #[serde(default, deserialize_with = "crate::elemental::lenient")]
    pub document: Option<ElementalDocument>,
    #[serde(default, deserialize_with = "crate::elemental::lenient_or_default")]
    pub channel: String,
    #[serde(default, deserialize_with = "crate::elemental::lenient_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "crate::elemental::lenient_or_default")]
    pub elements: Vec<ElementalNode>,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    /// Storage format detected on the document before the change
    pub storage_format: SubjectStorageFormat,
    pub update: TitleUpdate,
    pub document: ElementalDocument,
}

/// POST /api/v1/elemental/title - Set a channel's title in its storage format
#[tracing::instrument(name = "http.update_title", skip(request), fields(channel = %request.channel))]
pub async fn update_title(Json(request): Json<TitleRequest>) -> Result<Json<TitleResponse>> {
    let timer = OperationTimer::start("title");
    let doc = request.document.as_ref();

    let result: Result<Json<TitleResponse>> = update_channel_title(doc, &request.channel, &request.title, &request.elements)
        .map(|document| {
            Json(TitleResponse {
                storage_format: get_subject_storage_format(doc, &request.channel),
                update: create_title_update(doc, &request.channel, &request.title, &request.elements),
                document,
            })
        })
        .map_err(Into::into);
    timer.finish(&result);
    result
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default, deserialize_with = "crate::elemental::lenient_or_default")]
    pub elements: Vec<ElementalNode>,
    #[serde(default = "empty_object")]
    pub variables: Value,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub elements: Vec<ElementalNode>,
}

/// POST /api/v1/elemental/preview - Substitute sample values into placeholders
#[tracing::instrument(name = "http.preview_elements", skip(request))]
pub async fn preview_elements(Json(request): Json<PreviewRequest>) -> Result<Json<PreviewResponse>> {
    let timer = OperationTimer::start("preview");

    let result: Result<Json<PreviewResponse>> = render_preview(&request.elements, &request.variables)
        .map(|elements| Json(PreviewResponse { elements }))
        .map_err(Into::into);
    timer.finish(&result);
    result
}
