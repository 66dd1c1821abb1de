use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use clinic_core::AppError;
use clinic_infrastructure::MIN_TOKEN_SECRET_LENGTH;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::access_map::UnmappedPathPolicy;

/// Persistence backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Validation(format!(
                "STORE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
            ))),
        }
    }
}

/// Credentials for the administrator created on first boot.
#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub token_secret: String,
    pub token_ttl_minutes: i64,
    pub cookie_secure: bool,
    pub unmapped_path_policy: UnmappedPathPolicy,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let store_backend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_owned())
            .parse::<StoreBackend>()?;
        let database_url = match store_backend {
            StoreBackend::Postgres => Some(required_non_empty_env("DATABASE_URL")?),
            StoreBackend::Memory => optional_env("DATABASE_URL"),
        };
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to apply migrations".to_owned(),
            ));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let frontend_origin = Url::parse(&frontend_url)
            .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;
        let frontend_url = frontend_origin.origin().ascii_serialization();

        let token_secret = required_env("AUTH_TOKEN_SECRET")?;
        if token_secret.len() < MIN_TOKEN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "AUTH_TOKEN_SECRET must be at least {MIN_TOKEN_SECRET_LENGTH} characters"
            )));
        }

        let token_ttl_minutes = match optional_env("AUTH_TOKEN_TTL_MINUTES") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "AUTH_TOKEN_TTL_MINUTES must be a positive integer, got '{value}'"
                    ))
                })?,
            None => 60,
        };

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let unmapped_path_policy = env::var("GUARD_UNMAPPED_PATHS")
            .unwrap_or_else(|_| "allow".to_owned())
            .parse::<UnmappedPathPolicy>()?;

        let bootstrap_admin = match (
            optional_env("BOOTSTRAP_ADMIN_EMAIL"),
            optional_env("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdminConfig {
                email,
                password,
                display_name: optional_env("BOOTSTRAP_ADMIN_NAME")
                    .unwrap_or_else(|| "Administrator".to_owned()),
            }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            migrate_only,
            store_backend,
            database_url,
            frontend_url,
            api_host,
            api_port,
            token_secret,
            token_ttl_minutes,
            cookie_secure,
            unmapped_path_policy,
            bootstrap_admin,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
