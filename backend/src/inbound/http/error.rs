//! Rendering of domain errors as HTTP responses.
//!
//! This is the one place an [`Error`] becomes a status code and JSON body.
//! Internal failures are logged in full and redacted before they reach the
//! client.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

const REDACTED_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing copy of `error`; internal details never leave the process.
fn client_payload(error: &Error) -> Error {
    let redacted = match error.code() {
        ErrorCode::InternalError => Error::internal(REDACTED_MESSAGE),
        ErrorCode::ServiceUnavailable => Error::service_unavailable(UNAVAILABLE_MESSAGE),
        _ => return error.clone(),
    };
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(
            self.code(),
            ErrorCode::InternalError | ErrorCode::ServiceUnavailable
        ) {
            error!(
                code = ?self.code(),
                message = self.message(),
                trace_id = self.trace_id(),
                details = ?self.details(),
                "request failed"
            );
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_payload(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal(REDACTED_MESSAGE)
    }
}

/// Turn JSON extractor failures into `400 invalid_request` with a reason.
///
/// Installed through `web::JsonConfig::error_handler` so malformed bodies
/// render like every other validation failure.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let reason = match &err {
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        JsonPayloadError::Deserialize(inner) => inner.to_string(),
        other => other.to_string(),
    };
    Error::invalid_request("request body is not valid")
        .with_details(json!({ "reason": reason }))
        .into()
}
