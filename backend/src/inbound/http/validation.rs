//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details name the
//! offending wire field and a stable `code`.

use std::str::FromStr;

use actix_web::error::JsonPayloadError;
use actix_web::web;
use chrono::NaiveDate;
use pagination::PageRequest;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{CommissionStatus, Error, Role, UserId};

/// Validation codes for request-shape failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidStatus,
    InvalidRole,
    InvalidLimit,
}

impl FieldCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidDate => "invalid_date",
            Self::InvalidStatus => "invalid_status",
            Self::InvalidRole => "invalid_role",
            Self::InvalidLimit => "invalid_limit",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: FieldCode, message: String, value: Option<&str>) -> Error {
    let details = match value {
        Some(value) => json!({ "field": field.as_str(), "value": value, "code": code.as_str() }),
        None => json!({ "field": field.as_str(), "code": code.as_str() }),
    };
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        FieldCode::MissingField,
        format!("missing required field: {}", field.as_str()),
        None,
    )
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        field_error(
            field,
            FieldCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            Some(value),
        )
    })
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    parse_uuid(value, field).map(UserId::from_uuid)
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`).
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        field_error(
            field,
            FieldCode::InvalidDate,
            format!("{} must be a YYYY-MM-DD date", field.as_str()),
            Some(value),
        )
    })
}

pub(crate) fn parse_status(value: &str, field: FieldName) -> Result<CommissionStatus, Error> {
    CommissionStatus::from_str(value).map_err(|_| {
        field_error(
            field,
            FieldCode::InvalidStatus,
            format!(
                "{} must be one of open, assigned, in_progress, completed, cancelled",
                field.as_str()
            ),
            Some(value),
        )
    })
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    Role::from_str(value).map_err(|_| {
        field_error(
            field,
            FieldCode::InvalidRole,
            format!("{} must be customer or artist", field.as_str()),
            Some(value),
        )
    })
}

pub(crate) fn page_request(limit: Option<usize>) -> Result<PageRequest, Error> {
    PageRequest::new(limit).map_err(|err| {
        field_error(
            FieldName::new("limit"),
            FieldCode::InvalidLimit,
            err.to_string(),
            None,
        )
    })
}

/// JSON extractor settings for every API scope.
///
/// Bodies that fail to decode (wrong types, fractional minor units,
/// truncated documents) are answered with the `validation_failed` error
/// envelope instead of the framework's plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| body_error(&err).into())
}

fn body_error(err: &JsonPayloadError) -> Error {
    debug!(error = %err, "request body rejected");
    match err {
        JsonPayloadError::Deserialize(inner) => {
            Error::validation(format!("request body could not be decoded: {inner}"))
        }
        other => Error::validation(other.to_string()),
    }
}

/// Deserialize a nullable field so that absent stays `None` and an explicit
/// `null` becomes `Some(None)`. Pair with `#[serde(default)]`.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
