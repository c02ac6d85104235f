//! Domain errors rendered as HTTP responses.
//!
//! The status line follows [`ErrorCode`]. The finer failure class
//! (`role_required`, `illegal_transition`, `duplicate_bid` and friends)
//! stays in `details.code` for clients that branch on it. Internal failures
//! are logged in full and answered with a generic body; retryable failures
//! carry a `Retry-After` hint.

use std::borrow::Cow;

use actix_web::http::header::RETRY_AFTER;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Seconds a client should wait before retrying a timed-out mutation.
const RETRY_AFTER_SECS: u32 = 1;

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The body a client is allowed to see.
fn client_view(failure: &Error) -> Cow<'_, Error> {
    if failure.code() != ErrorCode::InternalError {
        return Cow::Borrowed(failure);
    }
    error!(
        trace_id = failure.trace_id().unwrap_or("-"),
        message = failure.message(),
        "internal failure answered with a redacted body"
    );
    let redacted = Error::internal("Internal server error");
    Cow::Owned(match failure.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    })
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.is_retryable() {
            warn!(
                trace_id = self.trace_id().unwrap_or("-"),
                message = self.message(),
                "dependency unavailable or too slow"
            );
            builder.insert_header((RETRY_AFTER, RETRY_AFTER_SECS.to_string()));
        }
        builder.json(client_view(self).as_ref())
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error promoted to an internal failure");
        Self::internal("Internal server error")
    }
}
