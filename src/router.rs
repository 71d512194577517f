use axum::{
    http::{header::AUTHORIZATION, Request},
    response::{IntoResponse, Response},
    Router,
};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tower::{Layer, ServiceBuilder};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    request_id::{MakeRequestId, RequestId},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit, ServiceBuilderExt,
};
use tracing::Level;

use crate::{config::Config, errors::AppError, state::AppState};

/// The routed service. Trailing slashes are trimmed before routing.
pub type AppRouter = NormalizePath<Router>;

pub fn get_router(config: &Config, state: AppState, routes: Router<AppState>) -> AppRouter {
    let sensitive_headers: Arc<[_]> = vec![AUTHORIZATION].into();
    let middleware = ServiceBuilder::new()
        // Keep bearer tokens out of the logs
        .layer(SetSensitiveRequestHeadersLayer::from_shared(
            sensitive_headers.clone(),
        ))
        .set_x_request_id(CounterRequestId::default())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new())
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                )
                .on_failure(DefaultOnFailure::new().level(Level::WARN)),
        )
        .sensitive_response_headers(sensitive_headers)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .compression()
        .layer(cors(config))
        .propagate_x_request_id();

    let router = Router::new()
        .merge(routes)
        .fallback(error_404)
        .layer(middleware)
        .with_state(state);

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

fn cors(config: &Config) -> CorsLayer {
    let origins = config.allowed_origins();
    let allow_origin = if origins.is_any() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.to_headers())
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[derive(Clone, Default)]
struct CounterRequestId {
    counter: Arc<AtomicU64>,
}

impl MakeRequestId for CounterRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        self.counter
            .fetch_add(1, Ordering::SeqCst)
            .to_string()
            .parse()
            .ok()
            .map(RequestId::new)
    }
}

async fn error_404() -> Response {
    AppError::NotFound("Not found").into_response()
}
