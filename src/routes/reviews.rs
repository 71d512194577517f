use axum::{
    extract::Path as UrlPath,
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Router,
};
use serde_json::Value;

use crate::{
    auth::JWTUserRequest,
    errors::AppError,
    guards::validate_owner,
    models::{Activity, Review, User},
    responses::{AppJson, AppResult, Created},
    state::AppState,
    validation::{decode, Payload},
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/points/activities/{id}/reviews", get(list_reviews))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/points/activities/{id}/reviews", post(create_review))
        .route(
            "/points/activities/reviews/{id}",
            patch(update_review).delete(delete_review),
        )
}

async fn create_review(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(activity_id): UrlPath<i64>,
    AppJson(mut payload): AppJson<Payload>,
) -> Result<Created<Review>, AppError> {
    payload.insert("activity_id".into(), Value::from(activity_id));
    payload.insert("user_id".into(), Value::from(caller.id));
    let payload = Review::validate(payload)?;

    let mut tx = state.database().start_transaction().await?;
    User::require(&mut tx, caller.id).await?;
    Activity::find(&mut tx, activity_id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    let review = Review::create(&mut tx, decode(payload)?).await?;
    tx.commit().await?;

    Ok(Created(review))
}

async fn list_reviews(
    state: AppState,
    UrlPath(activity_id): UrlPath<i64>,
) -> AppResult<Vec<Review>> {
    let mut tx = state.database().start_transaction().await?;
    Activity::find(&mut tx, activity_id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    let reviews = Review::by_activity(&mut tx, activity_id).await?;
    tx.commit().await?;

    Ok(AppJson(reviews))
}

async fn update_review(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(id): UrlPath<i64>,
    AppJson(payload): AppJson<Payload>,
) -> AppResult<Review> {
    let mut tx = state.database().start_transaction().await?;
    validate_owner::<Review>(&mut tx, caller.id, id).await?;

    let payload = Review::validate_update(payload)?;
    let review = Review::update(&mut tx, id, decode(payload)?)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    tx.commit().await?;

    Ok(AppJson(review))
}

async fn delete_review(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(id): UrlPath<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.database().start_transaction().await?;
    validate_owner::<Review>(&mut tx, caller.id, id)
        .await
        .map_err(|e| e.or_not_found("ID Not Found"))?;
    Review::delete(&mut tx, id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
