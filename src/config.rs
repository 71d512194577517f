use std::{fmt, net::Ipv4Addr, str::FromStr};

use axum::http::HeaderValue;
use menva::FromEnv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Env {
    Development,
    Production,
    Test,
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Env::Development),
            "production" => Ok(Env::Production),
            "test" => Ok(Env::Test),
            _ => Err(format!("Invalid value for enum Env: {}", s)),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Test => write!(f, "test"),
        }
    }
}

#[derive(Debug, Clone, FromEnv)]
pub struct Config {
    pub env: Env,
    ip: Ipv4Addr,
    port: u16,
    domain: String,
    allowed_origins: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub secret_key: String,
    pub jwt_expiration_hours: i64,
    pub request_timeout_secs: u64,
    pub worker_threads: usize,
    pub max_blocking_threads: usize,
}

impl Config {
    pub fn stub() -> Self {
        Self {
            env: Env::Test,
            ip: Ipv4Addr::new(127, 0, 0, 1),
            port: 8000,
            domain: "test.com".into(),
            allowed_origins: "*".into(),
            database_url: "sqlite::memory:".into(),
            database_max_connections: 1,
            secret_key: "secret_key".into(),
            jwt_expiration_hours: 24,
            request_timeout_secs: 10,
            worker_threads: 1,
            max_blocking_threads: 1,
        }
    }

    pub fn socket_addr(&self) -> (Ipv4Addr, u16) {
        (self.ip, self.port)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn allowed_origins(&self) -> AllowedOrigins {
        AllowedOrigins::from_string(&self.allowed_origins)
    }

    pub fn print(&self) {
        tracing::info!(env = %self.env, "listening on http://{}:{}", self.ip, self.port);
    }
}

#[derive(Clone, Debug, Default)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    fn from_string(allowed_origins: &str) -> Self {
        Self(
            allowed_origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_owned())
                .collect(),
        )
    }

    pub fn is_any(&self) -> bool {
        self.0.iter().any(|s| s == "*")
    }

    pub fn to_headers(&self) -> Vec<HeaderValue> {
        self.0
            .iter()
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect()
    }
}
