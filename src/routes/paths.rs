use axum::{
    extract::Path as UrlPath,
    http::StatusCode,
    routing::{delete, get, patch, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    auth::JWTUserRequest,
    errors::AppError,
    guards::validate_owner,
    models::{CreatedPath, Path, PathDetail, PathOwner, Point, Subscriber, User},
    responses::{AppJson, AppResult, Created},
    state::AppState,
    validation::{decode, Payload},
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/paths", get(list_paths))
        .route("/paths/{id}", get(get_path))
        .route("/paths/{id}/subscribers", get(list_subscribers))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/paths", post(create_path))
        .route("/paths/{id}", patch(update_path).delete(delete_path))
        .route(
            "/paths/{id}/subscribers",
            post(subscribe).delete(unsubscribe),
        )
        .route("/paths/{id}/points", post(attach_point))
        .route("/paths/{id}/points/{point_id}", delete(detach_point))
}

#[derive(Debug, Deserialize)]
pub struct PointLink {
    point_id: i64,
}

async fn create_path(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    AppJson(mut payload): AppJson<Payload>,
) -> Result<Created<CreatedPath>, AppError> {
    payload.insert("admin_id".into(), Value::from(caller.id));

    let mut tx = state.database().start_transaction().await?;

    let payload = Path::validate(payload)?;
    let owner = User::require(&mut tx, caller.id).await?;
    let path = Path::create(&mut tx, decode(payload)?).await?;

    tx.commit().await?;
    tracing::info!(path_id = path.id, admin_id = caller.id, "path created");
    Ok(Created(CreatedPath {
        path,
        user: PathOwner {
            name: owner.name,
            email: owner.email,
        },
    }))
}

async fn list_paths(state: AppState) -> AppResult<Vec<Path>> {
    let mut conn = state.database().acquire().await?;
    Ok(AppJson(Path::all(&mut conn).await?))
}

async fn get_path(state: AppState, UrlPath(id): UrlPath<i64>) -> AppResult<PathDetail> {
    let mut tx = state.database().start_transaction().await?;
    let path = Path::find(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    let detail = path.detail(&mut tx).await?;
    tx.commit().await?;
    Ok(AppJson(detail))
}

async fn update_path(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(id): UrlPath<i64>,
    AppJson(payload): AppJson<Payload>,
) -> AppResult<Path> {
    let mut tx = state.database().start_transaction().await?;
    validate_owner::<Path>(&mut tx, caller.id, id).await?;

    let payload = Path::validate_update(payload)?;
    let path = Path::update(&mut tx, id, decode(payload)?)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;

    tx.commit().await?;
    Ok(AppJson(path))
}

async fn delete_path(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(id): UrlPath<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.database().start_transaction().await?;

    validate_owner::<Path>(&mut tx, caller.id, id)
        .await
        .map_err(|e| e.or_not_found("ID Not Found"))?;
    Path::delete(&mut tx, id).await?;

    tx.commit().await?;
    tracing::info!(path_id = id, "path deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn subscribe(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(id): UrlPath<i64>,
) -> Result<Created<Subscriber>, AppError> {
    let mut tx = state.database().start_transaction().await?;
    User::require(&mut tx, caller.id).await?;
    Path::find(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;

    let subscriber = Subscriber::subscribe(&mut tx, id, caller.id).await?;

    tx.commit().await?;
    Ok(Created(subscriber))
}

async fn list_subscribers(
    state: AppState,
    UrlPath(id): UrlPath<i64>,
) -> AppResult<Vec<Subscriber>> {
    let mut tx = state.database().start_transaction().await?;
    Path::find(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    let subscribers = Subscriber::by_path(&mut tx, id).await?;
    tx.commit().await?;
    Ok(AppJson(subscribers))
}

async fn unsubscribe(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(id): UrlPath<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.database().start_transaction().await?;
    if !Subscriber::unsubscribe(&mut tx, id, caller.id).await? {
        return Err(AppError::NotFound("Not found"));
    }
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn attach_point(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath(id): UrlPath<i64>,
    AppJson(link): AppJson<PointLink>,
) -> Result<Created<PathDetail>, AppError> {
    let mut tx = state.database().start_transaction().await?;

    validate_owner::<Path>(&mut tx, caller.id, id).await?;
    Point::find(&mut tx, link.point_id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    Path::attach_point(&mut tx, id, link.point_id).await?;

    let path = Path::find(&mut tx, id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;
    let detail = path.detail(&mut tx).await?;

    tx.commit().await?;
    Ok(Created(detail))
}

async fn detach_point(
    state: AppState,
    Extension(caller): Extension<JWTUserRequest>,
    UrlPath((id, point_id)): UrlPath<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.database().start_transaction().await?;

    validate_owner::<Path>(&mut tx, caller.id, id).await?;
    if !Path::detach_point(&mut tx, id, point_id).await? {
        return Err(AppError::NotFound("Not found"));
    }

    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
