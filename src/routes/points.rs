use axum::{
    extract::Path as UrlPath,
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Router,
};

use crate::{
    auth::JWTUserRequest,
    errors::AppError,
    models::{Activity, Point},
    responses::{AppJson, AppResult, Created},
    state::AppState,
    validation::{decode, Payload},
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/points", get(list_points))
        .route("/points/{id}", get(get_point))
        .route("/points/{id}/activities", get(list_activities))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/points", post(create_point))
        .route("/points/{id}", patch(update_point).delete(delete_point))
        .route("/points/activities", post(create_activity))
        .route(
            "/points/activities/{id}",
            patch(update_activity).delete(delete_activity),
        )
}

async fn create_point(
    state: AppState,
    AppJson(payload): AppJson<Payload>,
) -> Result<Created<Point>, AppError> {
    let payload = Point::validate(payload)?;

    let mut tx = state.database().start_transaction().await?;
    let point = Point::create(&mut tx, decode(payload)?).await?;
    tx.commit().await?;

    Ok(Created(point))
}

async fn list_points(state: AppState) -> AppResult<Vec<Point>> {
    let mut conn = state.database().acquire().await?;
    Ok(AppJson(Point::all(&mut conn).await?))
}

async fn get_point(state: AppState, UrlPath(id): UrlPath<i64>) -> AppResult<Point> {
    let mut conn = state.database().acquire().await?;
    let point = Point::find(&mut conn, id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    Ok(AppJson(point))
}

async fn update_point(
    state: AppState,
    UrlPath(id): UrlPath<i64>,
    AppJson(payload): AppJson<Payload>,
) -> AppResult<Point> {
    let payload = Point::validate_update(payload)?;

    let mut tx = state.database().start_transaction().await?;
    let point = Point::update(&mut tx, id, decode(payload)?)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    tx.commit().await?;

    Ok(AppJson(point))
}

async fn delete_point(state: AppState, UrlPath(id): UrlPath<i64>) -> Result<StatusCode, AppError> {
    let mut tx = state.database().start_transaction().await?;
    if !Point::delete(&mut tx, id).await? {
        return Err(AppError::NotFound("ID Not Found"));
    }
    tx.commit().await?;

    tracing::info!(point_id = id, "point deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn create_activity(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    AppJson(payload): AppJson<Payload>,
) -> Result<Created<Activity>, AppError> {
    let payload = Activity::validate(payload)?;
    let point_id = payload
        .get("point_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| AppError::custom_internal("validated activity without point_id"))?;

    let mut tx = state.database().start_transaction().await?;
    Point::find(&mut tx, point_id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    let activity = Activity::create(&mut tx, decode(payload)?).await?;
    tx.commit().await?;

    tracing::debug!(activity_id = activity.id, user_id = caller.id, "activity created");
    Ok(Created(activity))
}

async fn list_activities(state: AppState, UrlPath(id): UrlPath<i64>) -> AppResult<Vec<Activity>> {
    let mut tx = state.database().start_transaction().await?;
    Point::find(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    let activities = Activity::by_point(&mut tx, id).await?;
    tx.commit().await?;

    Ok(AppJson(activities))
}

async fn update_activity(
    state: AppState,
    UrlPath(id): UrlPath<i64>,
    AppJson(payload): AppJson<Payload>,
) -> AppResult<Activity> {
    let payload = Activity::validate_update(payload)?;

    let mut tx = state.database().start_transaction().await?;
    let activity = Activity::update(&mut tx, id, decode(payload)?)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    tx.commit().await?;

    Ok(AppJson(activity))
}

async fn delete_activity(
    state: AppState,
    UrlPath(id): UrlPath<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.database().start_transaction().await?;
    if !Activity::delete(&mut tx, id).await? {
        return Err(AppError::NotFound("ID Not Found"));
    }
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
