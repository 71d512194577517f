use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{prelude::FromRow, SqliteConnection};

use crate::errors::AppError;

/// A user following a path.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscriber {
    pub path_id: i64,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
}

impl Subscriber {
    /// Subscribes `user_id` to `path_id`; subscribing twice keeps the first record.
    pub async fn subscribe(
        conn: &mut SqliteConnection,
        path_id: i64,
        user_id: i64,
    ) -> Result<Self, AppError> {
        sqlx::query(
            "INSERT INTO subscribers (path_id, user_id) VALUES ($1, $2)
                ON CONFLICT (path_id, user_id) DO NOTHING;",
        )
        .bind(path_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        let subscriber = sqlx::query_as(
            "SELECT path_id, user_id, created_at FROM subscribers
                WHERE path_id = $1 AND user_id = $2;",
        )
        .bind(path_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(subscriber)
    }

    pub async fn unsubscribe(
        conn: &mut SqliteConnection,
        path_id: i64,
        user_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE path_id = $1 AND user_id = $2;")
            .bind(path_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn by_path(
        conn: &mut SqliteConnection,
        path_id: i64,
    ) -> Result<Vec<Self>, AppError> {
        let subscribers = sqlx::query_as(
            "SELECT path_id, user_id, created_at FROM subscribers
                WHERE path_id = $1 ORDER BY user_id;",
        )
        .bind(path_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(subscribers)
    }
}
