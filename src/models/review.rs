use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, SqliteConnection};

use crate::{
    errors::{AppError, ValidationError},
    guards::Owned,
    validation::{Field, FieldKind, Payload, Schema},
};

pub const REVIEW_SCHEMA: Schema = Schema {
    fields: &[
        Field("review", FieldKind::String),
        Field("activity_id", FieldKind::Integer),
        Field("user_id", FieldKind::Integer),
    ],
    required: &["review", "activity_id", "user_id"],
    updatable: &["review"],
};

const COLUMNS: &str = "id, review, activity_id, user_id, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: i64,
    pub review: String,
    pub activity_id: i64,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewReview {
    pub review: String,
    pub activity_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewChanges {
    pub review: Option<String>,
}

impl Review {
    pub fn validate(payload: Payload) -> Result<Payload, ValidationError> {
        REVIEW_SCHEMA.validate(payload)
    }

    pub fn validate_update(payload: Payload) -> Result<Payload, ValidationError> {
        REVIEW_SCHEMA.validate_update(payload)
    }

    pub async fn create(conn: &mut SqliteConnection, new: NewReview) -> Result<Self, AppError> {
        let review = sqlx::query_as(&format!(
            "INSERT INTO reviews (review, activity_id, user_id)
                VALUES ($1, $2, $3)
                RETURNING {COLUMNS};"
        ))
        .bind(new.review)
        .bind(new.activity_id)
        .bind(new.user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(review)
    }

    pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, AppError> {
        let review = sqlx::query_as(&format!("SELECT {COLUMNS} FROM reviews WHERE id = $1;"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(review)
    }

    pub async fn by_activity(
        conn: &mut SqliteConnection,
        activity_id: i64,
    ) -> Result<Vec<Self>, AppError> {
        let reviews = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM reviews WHERE activity_id = $1 ORDER BY id;"
        ))
        .bind(activity_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(reviews)
    }

    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        changes: ReviewChanges,
    ) -> Result<Option<Self>, AppError> {
        let review = sqlx::query_as(&format!(
            "UPDATE reviews SET
                review = COALESCE($1, review),
                updated_at = CURRENT_TIMESTAMP
                WHERE id = $2
                RETURNING {COLUMNS};"
        ))
        .bind(changes.review)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(review)
    }

    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1;")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl Owned for Review {
    const NOT_OWNER: &'static str = "user cannot update or delete a review they did not write.";

    fn owner_id(&self) -> i64 {
        self.user_id
    }

    async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, AppError> {
        Self::find(conn, id).await
    }
}
