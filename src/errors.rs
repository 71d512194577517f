use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{
    responses::{AppJson, ErrorMessage},
    validation::FieldKind,
};

/// Wraps any displayable error into [`AppError::CustomInternal`] after logging it.
#[macro_export]
macro_rules! log_and_wrap_custom_internal {
    ($e:expr) => {{
        let error = $e;
        tracing::error!(error = %error, "internal error");
        $crate::errors::AppError::CustomInternal(error.to_string())
    }};
}

/// Rejections raised while checking a proposed attribute mapping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("wrong keys were sent")]
    UnknownField {
        valid_keys: Vec<String>,
        received_keys: Vec<String>,
    },
    #[error("key {missing_key} is missing")]
    MissingField {
        required_keys: Vec<String>,
        missing_key: String,
    },
    #[error("key: {key} must be {expected}!")]
    TypeMismatch { key: String, expected: FieldKind },
    #[error("{0} must not be an empty string!")]
    EmptyValue(String),
    #[error("this username already exists!")]
    UsernameAlreadyExists,
    #[error("this email already exists!")]
    EmailAlreadyExists,
    #[error("{0} is not a valid email!")]
    InvalidEmail(String),
    #[error("Password and Password Confirmation must be equal.")]
    PasswordMismatch,
    #[error("your password must have at least 8 characters!")]
    WeakPassword,
}

impl ValidationError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UsernameAlreadyExists | Self::EmailAlreadyExists => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn details(&self) -> Option<Map<String, Value>> {
        let details = match self {
            Self::UnknownField {
                valid_keys,
                received_keys,
            } => json!({ "valid_keys": valid_keys, "received_keys": received_keys }),
            Self::MissingField {
                required_keys,
                missing_key,
            } => json!({ "required_keys": required_keys, "missing_key": missing_key }),
            _ => return None,
        };
        match details {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    OwnershipViolation(&'static str),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid token")]
    JWTError(#[source] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    JWTModified(#[source] std::num::ParseIntError),
    #[error("error hashing password: {0}")]
    ErrorHashingPassword(argon2::password_hash::Error),
    #[error("Invalid credentials")]
    WrongPassword(argon2::password_hash::Error),
    #[error(transparent)]
    InvalidInput(#[from] validator::ValidationErrors),
    #[error(transparent)]
    JsonRejection(#[from] JsonRejection),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    CustomInternal(String),
}

impl AppError {
    pub fn custom_internal(message: &str) -> Self {
        Self::CustomInternal(message.to_owned())
    }

    /// Replaces the message of a [`AppError::NotFound`], leaving other kinds untouched.
    pub fn or_not_found(self, message: &'static str) -> Self {
        match self {
            Self::NotFound(_) => Self::NotFound(message),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(e) => e.status_code(),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::OwnershipViolation(_) => StatusCode::FORBIDDEN,
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::JWTError(_)
            | Self::JWTModified(_)
            | Self::WrongPassword(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::JsonRejection(rejection) => rejection.status(),
            Self::ErrorHashingPassword(_) | Self::Database(_) | Self::CustomInternal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            Self::Validation(e) => ErrorMessage::with_details(e.to_string(), e.details()),
            Self::JsonRejection(rejection) => ErrorMessage::new(rejection.body_text()),
            Self::ErrorHashingPassword(_) | Self::Database(_) | Self::CustomInternal(_) => {
                tracing::error!(error = %self, "request failed");
                ErrorMessage::new("Sorry no sorry, something wrong happened".to_owned())
            }
            Self::JWTError(e) => {
                tracing::debug!(error = %e, "rejected token");
                ErrorMessage::new(self.to_string())
            }
            _ => ErrorMessage::new(self.to_string()),
        };

        (status, AppJson(message)).into_response()
    }
}
