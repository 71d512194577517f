use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AppError;

pub type AppResult<T> = std::result::Result<AppJson<T>, AppError>;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// A `201 Created` JSON response.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, AppJson(self.0)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    msg: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    details: Option<Map<String, Value>>,
}

impl ErrorMessage {
    pub fn new(msg: String) -> Self {
        Self { msg, details: None }
    }

    pub fn with_details(msg: String, details: Option<Map<String, Value>>) -> Self {
        Self { msg, details }
    }
}
