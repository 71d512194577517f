use std::{io, net::SocketAddr};

use axum::{extract::Request, ServiceExt};
use menva::read_default_file;
use tokio::{net::TcpListener, signal};

use crate::{config::Config, logging, router::get_router, routes::routes, state::AppState};

/// Builds and runs the HTTP server.
///
/// ```no_run
/// pathpoints::Server::default()
///     .load_environment_variables()
///     .set_config_from_env()
///     .init_tracing()
///     .enable_migrations()
///     .run()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct Server {
    config: Option<Config>,
    run_migrations: bool,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config: Some(config),
            run_migrations: false,
        }
    }

    pub fn load_environment_variables(self) -> Self {
        read_default_file();
        self
    }

    pub fn set_config_from_env(mut self) -> Self {
        self.config = Some(Config::from_env());
        self
    }

    pub fn enable_migrations(mut self) -> Self {
        self.run_migrations = true;
        self
    }

    pub fn init_tracing(self) -> Self {
        if let Some(config) = &self.config {
            logging::init_tracing(&config.env);
        }
        self
    }

    pub fn run(self) -> io::Result<()> {
        let config = self
            .config
            .ok_or_else(|| io::Error::other("missing configuration, call set_config_from_env"))?;

        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .worker_threads(config.worker_threads)
            .max_blocking_threads(config.max_blocking_threads)
            .build()?
            .block_on(serve(config, self.run_migrations))
    }
}

async fn serve(config: Config, run_migrations: bool) -> io::Result<()> {
    let state = AppState::new(config.clone()).map_err(io::Error::other)?;

    if run_migrations {
        state
            .database()
            .run_migrations()
            .await
            .map_err(io::Error::other)?;
    }

    let router = get_router(&config, state.clone(), routes(state));
    let listener = TcpListener::bind(config.socket_addr()).await?;
    config.print();

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(router),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutting down");
}
