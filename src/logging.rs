use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Env;

pub fn init_tracing(env: &Env) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match env {
        Env::Production => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .log_internal_errors(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_span_list(true)
                    .with_target(true),
            )
            .init(),
        Env::Development | Env::Test => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_line_number(true)
                    .with_target(true),
            )
            .init(),
    }
}
