use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, SqliteConnection};

use crate::{
    errors::{AppError, ValidationError},
    validation::{Field, FieldKind, Payload, Schema},
};

pub const ACTIVITY_SCHEMA: Schema = Schema {
    fields: &[
        Field("name", FieldKind::String),
        Field("description", FieldKind::String),
        Field("date", FieldKind::String),
        Field("point_id", FieldKind::Integer),
    ],
    required: &["name", "point_id"],
    updatable: &["name", "description", "date"],
};

const COLUMNS: &str = "id, name, description, date, point_id, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub date: Option<String>,
    pub point_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewActivity {
    pub name: String,
    pub description: Option<String>,
    pub date: Option<String>,
    pub point_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl Activity {
    pub fn validate(payload: Payload) -> Result<Payload, ValidationError> {
        ACTIVITY_SCHEMA.validate(payload)
    }

    pub fn validate_update(payload: Payload) -> Result<Payload, ValidationError> {
        ACTIVITY_SCHEMA.validate_update(payload)
    }

    pub async fn create(
        conn: &mut SqliteConnection,
        new: NewActivity,
    ) -> Result<Self, AppError> {
        let activity = sqlx::query_as(&format!(
            "INSERT INTO activities (name, description, date, point_id)
                VALUES ($1, $2, $3, $4)
                RETURNING {COLUMNS};"
        ))
        .bind(new.name)
        .bind(new.description)
        .bind(new.date)
        .bind(new.point_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(activity)
    }

    pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, AppError> {
        let activity = sqlx::query_as(&format!("SELECT {COLUMNS} FROM activities WHERE id = $1;"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(activity)
    }

    pub async fn by_point(
        conn: &mut SqliteConnection,
        point_id: i64,
    ) -> Result<Vec<Self>, AppError> {
        let activities = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM activities WHERE point_id = $1 ORDER BY id;"
        ))
        .bind(point_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(activities)
    }

    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        changes: ActivityChanges,
    ) -> Result<Option<Self>, AppError> {
        let activity = sqlx::query_as(&format!(
            "UPDATE activities SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                date = COALESCE($3, date),
                updated_at = CURRENT_TIMESTAMP
                WHERE id = $4
                RETURNING {COLUMNS};"
        ))
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.date)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(activity)
    }

    /// Deletes the activity along with its reviews.
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1;")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
