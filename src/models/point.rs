use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, SqliteConnection};

use crate::{
    errors::{AppError, ValidationError},
    validation::{Field, FieldKind, Payload, Schema},
};

pub const POINT_SCHEMA: Schema = Schema {
    fields: &[
        Field("name", FieldKind::String),
        Field("description", FieldKind::String),
        Field("latitude", FieldKind::Float),
        Field("longitude", FieldKind::Float),
    ],
    required: &["name", "latitude", "longitude"],
    updatable: &["name", "description", "latitude", "longitude"],
};

const COLUMNS: &str = "id, name, description, latitude, longitude, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Point {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewPoint {
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PointChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Point {
    pub fn validate(payload: Payload) -> Result<Payload, ValidationError> {
        POINT_SCHEMA.validate(payload)
    }

    pub fn validate_update(payload: Payload) -> Result<Payload, ValidationError> {
        POINT_SCHEMA.validate_update(payload)
    }

    pub async fn create(conn: &mut SqliteConnection, new: NewPoint) -> Result<Self, AppError> {
        let point = sqlx::query_as(&format!(
            "INSERT INTO points (name, description, latitude, longitude)
                VALUES ($1, $2, $3, $4)
                RETURNING {COLUMNS};"
        ))
        .bind(new.name)
        .bind(new.description)
        .bind(new.latitude)
        .bind(new.longitude)
        .fetch_one(&mut *conn)
        .await?;

        Ok(point)
    }

    pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, AppError> {
        let point = sqlx::query_as(&format!("SELECT {COLUMNS} FROM points WHERE id = $1;"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(point)
    }

    pub async fn all(conn: &mut SqliteConnection) -> Result<Vec<Self>, AppError> {
        let points = sqlx::query_as(&format!("SELECT {COLUMNS} FROM points ORDER BY id;"))
            .fetch_all(&mut *conn)
            .await?;
        Ok(points)
    }

    pub async fn by_path(
        conn: &mut SqliteConnection,
        path_id: i64,
    ) -> Result<Vec<Self>, AppError> {
        let points = sqlx::query_as(
            "SELECT points.id, points.name, points.description, points.latitude,
                    points.longitude, points.created_at, points.updated_at
                FROM points
                INNER JOIN paths_points ON paths_points.point_id = points.id
                WHERE paths_points.path_id = $1
                ORDER BY points.id;",
        )
        .bind(path_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(points)
    }

    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        changes: PointChanges,
    ) -> Result<Option<Self>, AppError> {
        let point = sqlx::query_as(&format!(
            "UPDATE points SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                latitude = COALESCE($3, latitude),
                longitude = COALESCE($4, longitude),
                updated_at = CURRENT_TIMESTAMP
                WHERE id = $5
                RETURNING {COLUMNS};"
        ))
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.latitude)
        .bind(changes.longitude)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(point)
    }

    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM points WHERE id = $1;")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
