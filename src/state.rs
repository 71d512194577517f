use axum::extract::{FromRequestParts, State};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation};
use std::{ops::Deref, sync::Arc};

use crate::{
    auth::{create_validator, Keys},
    config::Config,
    database::Database,
};

pub struct App {
    config: Config,
    database: Database,
    keys: Keys,
    jwt_validator: Validation,
}

impl App {
    pub fn new(config: Config) -> Result<Self, sqlx::Error> {
        Ok(Self {
            database: Database::new(&config.database_url, config.database_max_connections)?,
            keys: Keys::new(config.secret_key.as_bytes()),
            jwt_validator: create_validator(config.domain()),
            config,
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn domain(&self) -> &str {
        self.config.domain()
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.keys.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.keys.decoding
    }

    pub fn validator(&self) -> &Validation {
        &self.jwt_validator
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.config.jwt_expiration_hours)
    }
}

#[derive(Clone, FromRequestParts)]
#[from_request(via(State))]
pub struct AppState(pub Arc<App>);

impl AppState {
    pub fn new(config: Config) -> Result<Self, sqlx::Error> {
        Ok(AppState(Arc::new(App::new(config)?)))
    }
}

impl Deref for AppState {
    type Target = App;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
