use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, SqliteConnection};

use crate::{
    errors::{AppError, ValidationError},
    guards::Owned,
    validation::{Field, FieldKind, Payload, Schema},
};

use super::{Point, Subscriber};

pub const PATH_SCHEMA: Schema = Schema {
    fields: &[
        Field("name", FieldKind::String),
        Field("description", FieldKind::String),
        Field("initial_date", FieldKind::String),
        Field("end_date", FieldKind::String),
        Field("duration", FieldKind::String),
        Field("admin_id", FieldKind::Integer),
    ],
    required: &["name", "description", "admin_id"],
    updatable: &["name", "description", "initial_date", "end_date", "duration"],
};

const COLUMNS: &str =
    "id, name, description, initial_date, end_date, duration, admin_id, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Path {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub initial_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<String>,
    pub admin_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewPath {
    pub name: String,
    pub description: String,
    pub initial_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<String>,
    pub admin_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PathChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub initial_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PathOwner {
    pub name: String,
    pub email: String,
}

/// Response for a freshly created path.
#[derive(Debug, Serialize)]
pub struct CreatedPath {
    #[serde(flatten)]
    pub path: Path,
    pub user: PathOwner,
}

#[derive(Debug, Serialize)]
pub struct PathDetail {
    #[serde(flatten)]
    pub path: Path,
    pub points: Vec<Point>,
    pub subscribers: Vec<Subscriber>,
}

impl Path {
    pub fn validate(payload: Payload) -> Result<Payload, ValidationError> {
        PATH_SCHEMA.validate(payload)
    }

    pub fn validate_update(payload: Payload) -> Result<Payload, ValidationError> {
        PATH_SCHEMA.validate_update(payload)
    }

    pub async fn create(conn: &mut SqliteConnection, new: NewPath) -> Result<Self, AppError> {
        let path = sqlx::query_as(&format!(
            "INSERT INTO paths (name, description, initial_date, end_date, duration, admin_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {COLUMNS};"
        ))
        .bind(new.name)
        .bind(new.description)
        .bind(new.initial_date)
        .bind(new.end_date)
        .bind(new.duration)
        .bind(new.admin_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(path)
    }

    pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, AppError> {
        let path = sqlx::query_as(&format!("SELECT {COLUMNS} FROM paths WHERE id = $1;"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(path)
    }

    pub async fn all(conn: &mut SqliteConnection) -> Result<Vec<Self>, AppError> {
        let paths = sqlx::query_as(&format!("SELECT {COLUMNS} FROM paths ORDER BY id;"))
            .fetch_all(&mut *conn)
            .await?;
        Ok(paths)
    }

    pub async fn by_owner(
        conn: &mut SqliteConnection,
        admin_id: i64,
    ) -> Result<Vec<Self>, AppError> {
        let paths = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM paths WHERE admin_id = $1 ORDER BY id;"
        ))
        .bind(admin_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(paths)
    }

    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        changes: PathChanges,
    ) -> Result<Option<Self>, AppError> {
        let path = sqlx::query_as(&format!(
            "UPDATE paths SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                initial_date = COALESCE($3, initial_date),
                end_date = COALESCE($4, end_date),
                duration = COALESCE($5, duration),
                updated_at = CURRENT_TIMESTAMP
                WHERE id = $6
                RETURNING {COLUMNS};"
        ))
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.initial_date)
        .bind(changes.end_date)
        .bind(changes.duration)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(path)
    }

    /// Deletes the path; subscribers and point links go with it.
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM paths WHERE id = $1;")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn points(&self, conn: &mut SqliteConnection) -> Result<Vec<Point>, AppError> {
        Point::by_path(conn, self.id).await
    }

    pub async fn attach_point(
        conn: &mut SqliteConnection,
        path_id: i64,
        point_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO paths_points (path_id, point_id) VALUES ($1, $2)
                ON CONFLICT (path_id, point_id) DO NOTHING;",
        )
        .bind(path_id)
        .bind(point_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn detach_point(
        conn: &mut SqliteConnection,
        path_id: i64,
        point_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM paths_points WHERE path_id = $1 AND point_id = $2;")
            .bind(path_id)
            .bind(point_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn detail(self, conn: &mut SqliteConnection) -> Result<PathDetail, AppError> {
        let points = self.points(conn).await?;
        let subscribers = Subscriber::by_path(conn, self.id).await?;
        Ok(PathDetail {
            path: self,
            points,
            subscribers,
        })
    }
}

impl Owned for Path {
    const NOT_OWNER: &'static str =
        "user cannot update or delete a path that does not belong to them.";

    fn owner_id(&self) -> i64 {
        self.admin_id
    }

    async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, AppError> {
        Self::find(conn, id).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        database::Database,
        guards::validate_owner,
        models::{NewPoint, NewUser, User},
        validation::{decode, to_payload},
    };

    async fn user(conn: &mut SqliteConnection, username: &str) -> User {
        User::create(
            conn,
            NewUser {
                name: "Walker".into(),
                username: username.into(),
                email: format!("{username}@example.com"),
                birthdate: "1990-01-01".into(),
                url_image: None,
                password: "long enough".into(),
            },
        )
        .await
        .unwrap()
    }

    async fn path(conn: &mut SqliteConnection, admin_id: i64) -> Path {
        let payload = Path::validate(to_payload(json!({
            "name": "camino de santiago",
            "description": "long walk",
            "admin_id": admin_id,
        })))
        .unwrap();
        Path::create(conn, decode(payload).unwrap()).await.unwrap()
    }

    #[test]
    fn test_validate_title_cases_name() {
        let validated = Path::validate(to_payload(json!({
            "name": "alice doe",
            "description": "d",
            "admin_id": 1,
        })))
        .unwrap();
        assert_eq!(validated["name"], "Alice Doe");
        assert_eq!(validated["description"], "d");
        assert_eq!(validated["admin_id"], 1);
    }

    #[test]
    fn test_validate_rejects_unknown_keys_first() {
        let error = Path::validate(to_payload(json!({
            "name": "",
            "admin_id": "one",
            "subscribers": [],
        })))
        .unwrap_err();
        assert!(matches!(error, ValidationError::UnknownField { .. }));
    }

    #[test]
    fn test_validate_requires_owner() {
        let error = Path::validate(to_payload(json!({ "name": "a", "description": "d" })))
            .unwrap_err();
        assert_eq!(
            error,
            ValidationError::MissingField {
                required_keys: vec!["name".into(), "description".into(), "admin_id".into()],
                missing_key: "admin_id".into(),
            }
        );
    }

    #[test]
    fn test_validate_rejects_numeric_duration() {
        let error = Path::validate(to_payload(json!({
            "name": "a",
            "description": "d",
            "admin_id": 1,
            "duration": 3,
        })))
        .unwrap_err();
        assert_eq!(
            error,
            ValidationError::TypeMismatch {
                key: "duration".into(),
                expected: FieldKind::String,
            }
        );
    }

    #[test]
    fn test_owner_cannot_be_changed() {
        let error = Path::validate_update(to_payload(json!({ "admin_id": 2 }))).unwrap_err();
        assert!(matches!(error, ValidationError::UnknownField { .. }));
    }

    #[tokio::test]
    async fn test_round_trip() {
        let database = Database::stub().await;
        let mut conn = database.acquire().await.unwrap();
        let owner = user(&mut conn, "ana").await;

        let payload = Path::validate(to_payload(json!({
            "name": "via de la plata",
            "description": "south to north",
            "initial_date": "2024-05-01",
            "end_date": "2024-06-01",
            "duration": "31 days",
            "admin_id": owner.id,
        })))
        .unwrap();
        let created = Path::create(&mut conn, decode(payload.clone()).unwrap())
            .await
            .unwrap();
        let loaded = Path::find(&mut conn, created.id).await.unwrap().unwrap();

        assert_eq!(loaded.name, payload["name"]);
        assert_eq!(loaded.description, payload["description"]);
        assert_eq!(loaded.initial_date.as_deref(), payload["initial_date"].as_str());
        assert_eq!(loaded.end_date.as_deref(), payload["end_date"].as_str());
        assert_eq!(loaded.duration.as_deref(), payload["duration"].as_str());
        assert_eq!(loaded.admin_id, owner.id);
    }

    #[tokio::test]
    async fn test_ownership_guard() {
        let database = Database::stub().await;
        let mut conn = database.acquire().await.unwrap();
        let ana = user(&mut conn, "ana").await;
        let bea = user(&mut conn, "bea").await;
        let path = path(&mut conn, ana.id).await;

        assert_eq!(
            validate_owner::<Path>(&mut conn, ana.id, path.id)
                .await
                .unwrap(),
            (ana.id, path.id)
        );

        let error = validate_owner::<Path>(&mut conn, bea.id, path.id)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::OwnershipViolation(_)));

        let error = validate_owner::<Path>(&mut conn, ana.id, path.id + 100)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let database = Database::stub().await;
        let mut conn = database.acquire().await.unwrap();
        let ana = user(&mut conn, "ana").await;
        let path = path(&mut conn, ana.id).await;

        let changes = decode(
            Path::validate_update(to_payload(json!({ "duration": "two weeks" }))).unwrap(),
        )
        .unwrap();
        let updated = Path::update(&mut conn, path.id, changes)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.duration.as_deref(), Some("two weeks"));
        assert_eq!(updated.name, "Camino De Santiago");
        assert_eq!(updated.description, "long walk");

        let missing = Path::update(&mut conn, path.id + 100, PathChanges::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_subscribers_and_point_links() {
        let database = Database::stub().await;
        let mut conn = database.acquire().await.unwrap();
        let ana = user(&mut conn, "ana").await;
        let bea = user(&mut conn, "bea").await;
        let path = path(&mut conn, ana.id).await;
        let point = Point::create(
            &mut conn,
            NewPoint {
                name: "Fuente".into(),
                description: None,
                latitude: 42.88,
                longitude: -8.54,
            },
        )
        .await
        .unwrap();

        Path::attach_point(&mut conn, path.id, point.id).await.unwrap();
        Subscriber::subscribe(&mut conn, path.id, bea.id)
            .await
            .unwrap();

        assert!(Path::delete(&mut conn, path.id).await.unwrap());
        assert!(!Path::delete(&mut conn, path.id).await.unwrap());

        assert!(Subscriber::by_path(&mut conn, path.id)
            .await
            .unwrap()
            .is_empty());
        assert!(Point::by_path(&mut conn, path.id).await.unwrap().is_empty());
        // the point itself survives
        assert!(Point::find(&mut conn, point.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_owner_deletes_paths() {
        let database = Database::stub().await;
        let mut conn = database.acquire().await.unwrap();
        let ana = user(&mut conn, "ana").await;
        let path = path(&mut conn, ana.id).await;

        assert!(User::delete(&mut conn, ana.id).await.unwrap());
        assert!(Path::find(&mut conn, path.id).await.unwrap().is_none());
    }
}
