mod auth;
mod config;
mod database;
mod errors;
mod guards;
mod logging;
mod models;
mod responses;
mod router;
mod routes;
mod server;
mod state;
pub mod testing;
mod validation;

pub use auth::{create_token, JWTUserRequest};
pub use config::{Config, Env};
pub use database::Database;
pub use errors::{AppError, ValidationError};
pub use models::{
    Activity, CreatedPath, Path, PathDetail, Point, Review, Subscriber, User, UserDetail,
};
pub use responses::{AppJson, AppResult, ErrorMessage};
pub use routes::{AccessToken, LoginForm};
pub use server::Server;
pub use state::AppState;
