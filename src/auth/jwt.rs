use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, get_current_timestamp, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::AppError, state::AppState};

#[derive(Clone)]
pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JWTClaims {
    // Registered claims
    iss: String, // Issuer
    sub: String, // Subject
    aud: String, // Audience
    exp: i64,    // Expiration time
    iat: u64,    // Issued at
    jti: String, // JWT ID

    // Private claims
    username: String,
}

impl JWTClaims {
    pub fn new(user_id: i64, username: &str, site: &str, expires_in: Duration) -> Self {
        JWTClaims {
            iss: site.to_owned(),
            sub: user_id.to_string(),
            aud: site.to_owned(),
            exp: (Utc::now() + expires_in).timestamp(),
            iat: get_current_timestamp(),
            jti: Uuid::now_v7().to_string(),
            username: username.to_owned(),
        }
    }
}

/// Identity of the caller, inserted into the request extensions by [`jwt_middleware`].
#[derive(Clone, Debug)]
pub struct JWTUserRequest {
    pub id: i64,
    pub username: String,
}

impl JWTUserRequest {
    pub fn new(claims: JWTClaims) -> Result<Self, AppError> {
        Ok(Self {
            id: claims.sub.parse::<i64>().map_err(AppError::JWTModified)?,
            username: claims.username,
        })
    }
}

pub fn create_token(
    user_id: i64,
    username: &str,
    domain: &str,
    encoding: &EncodingKey,
    expires_in: Duration,
) -> Result<String, AppError> {
    encode(
        &Header::default(),
        &JWTClaims::new(user_id, username, domain, expires_in),
        encoding,
    )
    .map_err(AppError::JWTError)
}

pub fn create_validator(domain: &str) -> Validation {
    let mut validation = Validation::default();
    validation.set_audience(&[domain]);
    validation.set_issuer(&[domain]);
    validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
    validation
}

pub fn get_user_from_valid_token(
    token: &str,
    decoding: &DecodingKey,
    validation: &Validation,
) -> Result<JWTUserRequest, AppError> {
    let token_data =
        decode::<JWTClaims>(token, decoding, validation).map_err(AppError::JWTError)?;
    JWTUserRequest::new(token_data.claims)
}

pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::MissingToken)?;

    let user = get_user_from_valid_token(bearer.token(), state.decoding(), state.validator())?;
    tracing::debug!(user_id = user.id, "authenticated request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
