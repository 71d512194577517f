use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{prelude::FromRow, SqliteConnection};
use validator::ValidateEmail;

use crate::{
    auth::hash_password,
    errors::{AppError, ValidationError},
    guards::Owned,
    validation::{Field, FieldKind, Payload, Schema},
};

use super::Path;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const USER_SCHEMA: Schema = Schema {
    fields: &[
        Field("name", FieldKind::String),
        Field("username", FieldKind::String),
        Field("email", FieldKind::String),
        Field("birthdate", FieldKind::String),
        Field("url_image", FieldKind::String),
        Field("password", FieldKind::String),
        Field("password_confirmation", FieldKind::String),
    ],
    required: &[
        "name",
        "username",
        "email",
        "birthdate",
        "password",
        "password_confirmation",
    ],
    updatable: &[
        "name",
        "username",
        "email",
        "birthdate",
        "url_image",
        "password",
        "password_confirmation",
    ],
};

const COLUMNS: &str =
    "id, name, username, email, birthdate, url_image, password_hash, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub birthdate: String,
    pub url_image: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub birthdate: String,
    pub url_image: Option<String>,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<String>,
    pub url_image: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub paths_list: Vec<Path>,
}

fn text<'a>(payload: &'a Payload, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

fn check_email_format(email: &str) -> Result<(), ValidationError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_owned()))
    }
}

impl User {
    /// Checks a signup payload. Order matters: confirmation, then uniqueness, then length.
    pub async fn validate(
        conn: &mut SqliteConnection,
        payload: Payload,
    ) -> Result<Payload, AppError> {
        let mut payload = USER_SCHEMA.validate(payload)?;

        let confirmation = payload.remove("password_confirmation");
        if payload.get("password") != confirmation.as_ref() {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let email = text(&payload, "email").unwrap_or_default();
        check_email_format(email)?;

        let username = text(&payload, "username").unwrap_or_default();
        if Self::username_taken(conn, username, None).await? {
            return Err(ValidationError::UsernameAlreadyExists.into());
        }

        if Self::email_taken(conn, email, None).await? {
            return Err(ValidationError::EmailAlreadyExists.into());
        }

        let password = text(&payload, "password").unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::WeakPassword.into());
        }

        Ok(payload)
    }

    /// Checks a partial update of the user `user_id`. Usernames and emails only
    /// clash with other users.
    pub async fn validate_update(
        conn: &mut SqliteConnection,
        user_id: i64,
        payload: Payload,
    ) -> Result<Payload, AppError> {
        let mut payload = USER_SCHEMA.validate_update(payload)?;

        let confirmation = payload.remove("password_confirmation");
        if let Some(password) = payload.get("password") {
            let Some(confirmation) = confirmation else {
                return Err(ValidationError::MissingField {
                    required_keys: vec!["password".into(), "password_confirmation".into()],
                    missing_key: "password_confirmation".into(),
                }
                .into());
            };
            if *password != confirmation {
                return Err(ValidationError::PasswordMismatch.into());
            }
        }

        if let Some(username) = text(&payload, "username") {
            if Self::username_taken(conn, username, Some(user_id)).await? {
                return Err(ValidationError::UsernameAlreadyExists.into());
            }
        }

        if let Some(email) = text(&payload, "email") {
            check_email_format(email)?;
            if Self::email_taken(conn, email, Some(user_id)).await? {
                return Err(ValidationError::EmailAlreadyExists.into());
            }
        }

        if let Some(password) = text(&payload, "password") {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(ValidationError::WeakPassword.into());
            }
        }

        Ok(payload)
    }

    async fn username_taken(
        conn: &mut SqliteConnection,
        username: &str,
        except: Option<i64>,
    ) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1;")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(found.is_some_and(|id| Some(id) != except))
    }

    async fn email_taken(
        conn: &mut SqliteConnection,
        email: &str,
        except: Option<i64>,
    ) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1;")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(found.is_some_and(|id| Some(id) != except))
    }

    pub async fn create(conn: &mut SqliteConnection, new: NewUser) -> Result<Self, AppError> {
        let password_hash = hash_password(&new.password)?;

        let user = sqlx::query_as(&format!(
            "INSERT INTO users (name, username, email, birthdate, url_image, password_hash)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {COLUMNS};"
        ))
        .bind(new.name)
        .bind(new.username)
        .bind(new.email)
        .bind(new.birthdate)
        .bind(new.url_image)
        .bind(password_hash)
        .fetch_one(&mut *conn)
        .await?;

        Ok(user)
    }

    pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, AppError> {
        let user = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = $1;"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(user)
    }

    /// Loads the user behind an authenticated request. Tokens outlive deleted users.
    pub async fn require(conn: &mut SqliteConnection, id: i64) -> Result<Self, AppError> {
        Self::find(conn, id)
            .await?
            .ok_or(AppError::NotFound("User not found"))
    }

    pub async fn find_by_email(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<Option<Self>, AppError> {
        let user = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE email = $1;"))
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(user)
    }

    pub async fn all(conn: &mut SqliteConnection) -> Result<Vec<Self>, AppError> {
        let users = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users ORDER BY id;"))
            .fetch_all(&mut *conn)
            .await?;
        Ok(users)
    }

    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<Self>, AppError> {
        let password_hash = changes
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;

        let user = sqlx::query_as(&format!(
            "UPDATE users SET
                name = COALESCE($1, name),
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                birthdate = COALESCE($4, birthdate),
                url_image = COALESCE($5, url_image),
                password_hash = COALESCE($6, password_hash),
                updated_at = CURRENT_TIMESTAMP
                WHERE id = $7
                RETURNING {COLUMNS};"
        ))
        .bind(changes.name)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.birthdate)
        .bind(changes.url_image)
        .bind(password_hash)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1;")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn with_paths(self, conn: &mut SqliteConnection) -> Result<UserDetail, AppError> {
        let paths_list = Path::by_owner(conn, self.id).await?;
        Ok(UserDetail {
            user: self,
            paths_list,
        })
    }
}

impl Owned for User {
    const NOT_OWNER: &'static str = "you cannot update or delete a different user!";

    fn owner_id(&self) -> i64 {
        self.id
    }

    async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, AppError> {
        Self::find(conn, id).await
    }
}
