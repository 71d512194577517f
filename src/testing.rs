//! In-process server used by the integration tests.

use axum::body::Body;
use http::{header, Method, Request, Response};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    auth::create_token,
    config::Config,
    router::{get_router, AppRouter},
    routes::routes,
    state::AppState,
};

pub struct StubServer {
    router: AppRouter,
    state: AppState,
}

impl StubServer {
    pub async fn new() -> Self {
        let config = Config::stub();
        let state = AppState::new(config.clone()).unwrap();
        state.database().run_migrations().await.unwrap();
        let router = get_router(&config, state.clone(), routes(state.clone()));
        Self { router, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// Sends `body` as JSON, with a bearer token when one is given.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.request(builder.body(body).unwrap()).await
    }

    pub fn token_for(&self, user_id: i64, username: &str) -> String {
        create_token(
            user_id,
            username,
            self.state.domain(),
            self.state.encoding(),
            self.state.token_ttl(),
        )
        .unwrap()
    }

    pub async fn deserialize_response<T: DeserializeOwned>(response: Response<Body>) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }
}
