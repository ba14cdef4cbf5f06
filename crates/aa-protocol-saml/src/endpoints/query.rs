//! SOAP attribute service endpoint.
//!
//! The response is encoded into a buffer before the HTTP status is chosen,
//! so a failed write never reaches the client as a truncated `200`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::query::QueryOutcome;

use super::state::SamlState;

/// Content type of SOAP 1.1 responses.
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// POST handler for SOAP-bound attribute queries.
pub async fn attribute_query(State(state): State<SamlState>, body: Bytes) -> Response {
    let mut buf = Vec::new();

    match state.handler.respond(&body, &mut buf).await {
        QueryOutcome::Done => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, SOAP_CONTENT_TYPE)],
            buf,
        )
            .into_response(),
        QueryOutcome::Failed(e) => (
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            e.public_message(),
        )
            .into_response(),
        QueryOutcome::PartiallyWritten(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
