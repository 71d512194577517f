use std::future::Future;

use sqlx::SqliteConnection;

use crate::errors::AppError;

/// An entity whose mutations are restricted to a single owning user.
pub trait Owned: Sized {
    /// Message returned when the actor is not the owner.
    const NOT_OWNER: &'static str;

    fn owner_id(&self) -> i64;

    fn find_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> impl Future<Output = Result<Option<Self>, AppError>> + Send;
}

/// Confirms that `actor_id` owns the entity `entity_id`, returning both ids unchanged.
pub async fn validate_owner<T: Owned>(
    conn: &mut SqliteConnection,
    actor_id: i64,
    entity_id: i64,
) -> Result<(i64, i64), AppError> {
    let entity = T::find_by_id(conn, entity_id)
        .await?
        .ok_or(AppError::NotFound("Not found"))?;

    if entity.owner_id() != actor_id {
        tracing::warn!(actor_id, entity_id, "ownership check failed");
        return Err(AppError::OwnershipViolation(T::NOT_OWNER));
    }

    Ok((actor_id, entity_id))
}
