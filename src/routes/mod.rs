mod paths;
mod points;
mod reviews;
mod users;

use axum::{middleware::from_fn_with_state, Router};

use crate::{auth::jwt_middleware, state::AppState};

pub use users::{AccessToken, LoginForm};

/// Every endpoint of the API. Routes under `protected` require a bearer token.
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .merge(users::public_routes())
        .merge(paths::public_routes())
        .merge(points::public_routes())
        .merge(reviews::public_routes());

    let protected = Router::new()
        .merge(users::protected_routes())
        .merge(paths::protected_routes())
        .merge(points::protected_routes())
        .merge(reviews::protected_routes())
        .route_layer(from_fn_with_state(state, jwt_middleware));

    public.merge(protected)
}
