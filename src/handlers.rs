//! Demo routes served behind the exchange logger.

use axum::{
    Extension, Form, Json, Router,
    body::Bytes,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::collections::HashMap;
use tracing::info;

use crate::colors::colored_id;
use crate::pipeline::{ExchangeId, ExchangeLogger};

/// Greets, using the `name` query parameter when present.
pub async fn hello(Query(params): Query<HashMap<String, String>>) -> String {
    let name = params.get("name").map(String::as_str).unwrap_or("world");
    format!("Hello, {name}!")
}

/// Sends the request body back with the same content type.
///
/// The exchange id only shows up in its own trace line, never in the response.
pub async fn echo(
    exchange: Option<Extension<ExchangeId>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(Extension(ExchangeId(id))) = &exchange {
        info!("{} echoing {} bytes", colored_id(id), body.len());
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| header::HeaderValue::from_static("application/octet-stream"));
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// Returns the submitted form fields as JSON.
pub async fn form(Form(fields): Form<HashMap<String, String>>) -> Json<HashMap<String, String>> {
    Json(fields)
}

pub async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// All demo routes with `logger` layered over them.
pub fn router(logger: &ExchangeLogger) -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/echo", post(echo))
        .route("/form", post(form))
        .route("/health", get(health))
        .layer(logger.layer())
}
