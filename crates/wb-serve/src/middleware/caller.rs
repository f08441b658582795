//! Identity forwarded by the upstream auth layer.
//!
//! The gateway verifies the session and passes `x-user-id` and
//! `x-user-role`; nothing here checks credentials.

use crate::middleware::correlation::CorrelationId;
use crate::routes::error::ErrorEnvelope;
use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use wb_core::types::caller::Caller;
use wb_core::types::enums::Role;
use wb_core::types::ids::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";

#[derive(Debug)]
pub struct AuthRejection {
    status: StatusCode,
    code: &'static str,
    message: String,
    correlation_id: Option<String>,
}

impl AuthRejection {
    fn unauthorized(parts: &Parts, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: message.into(),
            correlation_id: correlation(parts),
        }
    }

    fn forbidden(parts: &Parts, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "FORBIDDEN",
            message: message.into(),
            correlation_id: correlation(parts),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            error: self.code,
            message: self.message,
            correlation_id: self.correlation_id,
        };
        (self.status, Json(envelope)).into_response()
    }
}

/// Any authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AnyCaller(pub Caller);

/// A caller with the `member` role.
#[derive(Debug, Clone, Copy)]
pub struct MemberCaller(pub UserId);

/// A coach or an admin.
#[derive(Debug, Clone, Copy)]
pub struct StaffCaller(pub Caller);

impl<S: Send + Sync> FromRequestParts<S> for AnyCaller {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_parts(parts).map(Self)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MemberCaller {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match caller_from_parts(parts)? {
            Caller::Member { user_id } => Ok(Self(user_id)),
            other => Err(AuthRejection::forbidden(
                parts,
                format!("{:?} callers cannot use member endpoints", other.role()),
            )),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for StaffCaller {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = caller_from_parts(parts)?;
        if caller.is_staff() {
            Ok(Self(caller))
        } else {
            Err(AuthRejection::forbidden(parts, "coach or admin role required"))
        }
    }
}

fn caller_from_parts(parts: &Parts) -> Result<Caller, AuthRejection> {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    let Some(raw_id) = header(USER_ID_HEADER) else {
        return Err(AuthRejection::unauthorized(parts, "missing x-user-id"));
    };
    let user_id = UserId::parse(raw_id)
        .map_err(|err| AuthRejection::unauthorized(parts, err.to_string()))?;
    let Some(raw_role) = header(ROLE_HEADER) else {
        return Err(AuthRejection::unauthorized(parts, "missing x-user-role"));
    };
    let role = Role::parse(raw_role)
        .ok_or_else(|| AuthRejection::unauthorized(parts, format!("unknown role {raw_role:?}")))?;
    Ok(Caller::new(role, user_id))
}

fn correlation(parts: &Parts) -> Option<String> {
    parts
        .extensions
        .get::<CorrelationId>()
        .map(|value| value.0.clone())
}
