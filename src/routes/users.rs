use axum::{
    extract::Path as UrlPath,
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    auth::{create_token, verify_password, JWTUserRequest},
    errors::AppError,
    guards::validate_owner,
    models::{Path, User, UserDetail},
    responses::{AppJson, AppResult, Created},
    state::AppState,
    validation::{decode, Payload},
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/users", get(list_users))
        .route("/user/{id}", get(get_user))
        .route("/user/{id}/paths", get(list_user_paths))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/user/{id}", patch(update_user).delete(delete_user))
}

#[derive(Debug, Validate, Deserialize)]
pub struct LoginForm {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

async fn signup(
    state: AppState,
    AppJson(payload): AppJson<Payload>,
) -> Result<Created<User>, AppError> {
    let mut tx = state.database().start_transaction().await?;

    let payload = User::validate(&mut tx, payload).await?;
    let user = User::create(&mut tx, decode(payload)?).await?;

    tx.commit().await?;
    tracing::info!(user_id = user.id, "user signed up");
    Ok(Created(user))
}

async fn login(state: AppState, AppJson(form): AppJson<LoginForm>) -> AppResult<AccessToken> {
    form.validate()?;

    let mut conn = state.database().acquire().await?;
    let user = User::find_by_email(&mut conn, &form.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    drop(conn);

    verify_password(&form.password, &user.password_hash).map_err(|e| match e {
        AppError::WrongPassword(_) => AppError::InvalidCredentials,
        other => other,
    })?;

    let access_token = create_token(
        user.id,
        &user.username,
        state.domain(),
        state.encoding(),
        state.token_ttl(),
    )?;
    Ok(AppJson(AccessToken { access_token }))
}

async fn list_users(state: AppState) -> AppResult<Vec<User>> {
    let mut conn = state.database().acquire().await?;
    Ok(AppJson(User::all(&mut conn).await?))
}

async fn get_user(state: AppState, UrlPath(id): UrlPath<i64>) -> AppResult<UserDetail> {
    let mut tx = state.database().start_transaction().await?;
    let user = User::find(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    let detail = user.with_paths(&mut tx).await?;
    tx.commit().await?;
    Ok(AppJson(detail))
}

async fn list_user_paths(state: AppState, UrlPath(id): UrlPath<i64>) -> AppResult<Vec<Path>> {
    let mut conn = state.database().acquire().await?;
    Ok(AppJson(Path::by_owner(&mut conn, id).await?))
}

async fn update_user(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(id): UrlPath<i64>,
    AppJson(payload): AppJson<Payload>,
) -> AppResult<User> {
    let mut tx = state.database().start_transaction().await?;

    validate_owner::<User>(&mut tx, caller.id, id).await?;
    let payload = User::validate_update(&mut tx, id, payload).await?;
    let user = User::update(&mut tx, id, decode(payload)?)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;

    tx.commit().await?;
    Ok(AppJson(user))
}

async fn delete_user(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(id): UrlPath<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.database().start_transaction().await?;

    validate_owner::<User>(&mut tx, caller.id, id)
        .await
        .map_err(|e| e.or_not_found("ID Not Found"))?;
    User::delete(&mut tx, id).await?;

    tx.commit().await?;
    tracing::info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
