use std::{ops::Deref, str::FromStr};

use sqlx::{
    migrate::{MigrateError, Migrator},
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool, Transaction,
};

use crate::errors::AppError;

#[derive(Clone, Debug)]
pub struct Database(SqlitePool);

impl Deref for Database {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Database {
    pub fn new(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let database_config = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives as long as its connection, so it must never be recycled.
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_lazy_with(database_config);

        Ok(Self(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        Migrator::new(std::path::Path::new("./migrations"))
            .await?
            .run(&**self)
            .await
    }

    pub async fn start_transaction(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        self.begin().await.map_err(AppError::Database)
    }

    /// In-memory database with every migration applied.
    #[cfg(test)]
    pub async fn stub() -> Self {
        let database = Self::new("sqlite::memory:", 1).expect("in-memory database url is valid");
        database
            .run_migrations()
            .await
            .expect("Migrations failed");
        database
    }
}
