use chrono::{DateTime, Utc};
use rusqlite::ErrorCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use wb_core::WodboardError;
use wb_core::types::ids::IdError;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("json encode failed: {message}")]
    JsonEncode { message: String },
    #[error("json decode failed: {message}")]
    JsonDecode { message: String },
    #[error("invalid enum value: {value}")]
    InvalidEnum { value: String },
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },
    #[error("invalid stored id: {0}")]
    InvalidId(#[from] IdError),
    #[error("stored value out of range: {message}")]
    OutOfRange { message: String },
}

impl From<DbError> for WodboardError {
    fn from(value: DbError) -> Self {
        WodboardError::Internal {
            message: value.to_string(),
        }
    }
}

/// Busy and locked databases surface as timeouts; everything else is internal.
pub fn storage(err: rusqlite::Error) -> WodboardError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
            tracing::warn!(error = %err, "database busy");
            WodboardError::StorageTimeout {
                message: err.to_string(),
            }
        }
        _ => {
            tracing::error!(error = %err, "database error");
            WodboardError::Internal {
                message: err.to_string(),
            }
        }
    }
}

pub fn to_rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub fn from_rfc3339(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DbError::InvalidTimestamp {
            value: value.to_string(),
        })
}

pub fn opt_from_rfc3339(value: Option<String>) -> Result<Option<DateTime<Utc>>, DbError> {
    value.as_deref().map(from_rfc3339).transpose()
}

pub fn encode_json<T: Serialize>(value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|err| DbError::JsonEncode {
        message: err.to_string(),
    })
}

pub fn decode_json<T: DeserializeOwned>(value: &str) -> Result<T, DbError> {
    serde_json::from_str(value).map_err(|err| DbError::JsonDecode {
        message: err.to_string(),
    })
}

pub fn encode_enum<T: Serialize>(value: &T) -> Result<String, DbError> {
    let json = serde_json::to_value(value).map_err(|err| DbError::JsonEncode {
        message: err.to_string(),
    })?;
    match json {
        Value::String(value) => Ok(value),
        other => Err(DbError::InvalidEnum {
            value: other.to_string(),
        }),
    }
}

pub fn decode_enum<T: DeserializeOwned>(value: &str) -> Result<T, DbError> {
    let json = Value::String(value.to_string());
    serde_json::from_value(json).map_err(|_| DbError::InvalidEnum {
        value: value.to_string(),
    })
}

/// Converts a stored integer column into a narrower Rust type.
pub fn narrow<T: TryFrom<i64>>(value: i64, column: &str) -> Result<T, DbError> {
    T::try_from(value).map_err(|_| DbError::OutOfRange {
        message: format!("{column} = {value}"),
    })
}

pub fn widen(value: usize) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|_| DbError::OutOfRange {
        message: value.to_string(),
    })
}
