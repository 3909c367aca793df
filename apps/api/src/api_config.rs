use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use stratum_core::AppError;
use tracing_subscriber::EnvFilter;

const MIN_BOOTSTRAP_TOKEN_LENGTH: usize = 32;

/// Where registry, audit and bootstrap state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

/// Backing store for rate-limit counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStore {
    Postgres,
    Redis,
    Memory,
}

/// Delivery channel for stale-view signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewInvalidationBackend {
    Log,
    Redis,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub store_backend: StoreBackend,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub bootstrap_token: Option<String>,
    pub authz_bypass_enabled: bool,
    pub rate_limit_store: RateLimitStore,
    pub redis_url: Option<String>,
    pub view_invalidation_backend: ViewInvalidationBackend,
    pub mutations_per_minute: i32,
    pub session_max_age_seconds: i64,
    pub rate_limit_cleanup_interval_seconds: u64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let store_backend = match optional("STORE_BACKEND")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => StoreBackend::Postgres {
                database_url: optional("DATABASE_URL").ok_or_else(|| {
                    AppError::Validation("DATABASE_URL is required".to_owned())
                })?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "STORE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && store_backend == StoreBackend::Memory {
            return Err(AppError::Validation(
                "migrate requires STORE_BACKEND=postgres".to_owned(),
            ));
        }

        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", &optional, 10_u32)?;
        if database_max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        let frontend_url =
            optional("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or("API_PORT", &optional, 3001_u16)?;
        let cookie_secure = flag("SESSION_COOKIE_SECURE", &optional);
        let authz_bypass_enabled = flag("AUTHZ_BYPASS_ENABLED", &optional);

        let bootstrap_token = optional("AUTH_BOOTSTRAP_TOKEN");
        if bootstrap_token
            .as_ref()
            .is_some_and(|token| token.len() < MIN_BOOTSTRAP_TOKEN_LENGTH)
        {
            return Err(AppError::Validation(format!(
                "AUTH_BOOTSTRAP_TOKEN must be at least {MIN_BOOTSTRAP_TOKEN_LENGTH} characters"
            )));
        }

        let default_rate_limit_store = match store_backend {
            StoreBackend::Postgres { .. } => "postgres",
            StoreBackend::Memory => "memory",
        };
        let rate_limit_store = match optional("RATE_LIMIT_STORE")
            .unwrap_or_else(|| default_rate_limit_store.to_owned())
            .as_str()
        {
            "postgres" => RateLimitStore::Postgres,
            "redis" => RateLimitStore::Redis,
            "memory" => RateLimitStore::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "RATE_LIMIT_STORE must be one of 'postgres', 'redis' or 'memory', got '{other}'"
                )));
            }
        };

        if rate_limit_store == RateLimitStore::Postgres && store_backend == StoreBackend::Memory {
            return Err(AppError::Validation(
                "RATE_LIMIT_STORE=postgres requires STORE_BACKEND=postgres".to_owned(),
            ));
        }

        let view_invalidation_backend = match optional("VIEW_INVALIDATION_BACKEND")
            .unwrap_or_else(|| "log".to_owned())
            .as_str()
        {
            "log" => ViewInvalidationBackend::Log,
            "redis" => ViewInvalidationBackend::Redis,
            other => {
                return Err(AppError::Validation(format!(
                    "VIEW_INVALIDATION_BACKEND must be either 'log' or 'redis', got '{other}'"
                )));
            }
        };

        let redis_url = optional("REDIS_URL");
        let config = Self {
            migrate_only,
            store_backend,
            database_max_connections,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            bootstrap_token,
            authz_bypass_enabled,
            rate_limit_store,
            redis_url,
            view_invalidation_backend,
            mutations_per_minute: parse_or("RATE_LIMIT_MUTATIONS_PER_MINUTE", &optional, 30_i32)?,
            session_max_age_seconds: parse_or("SESSION_MAX_AGE_SECONDS", &optional, 28_800_i64)?,
            rate_limit_cleanup_interval_seconds: parse_or(
                "RATE_LIMIT_CLEANUP_INTERVAL_SECONDS",
                &optional,
                3_600_u64,
            )?,
        };

        if config.mutations_per_minute <= 0 {
            return Err(AppError::Validation(
                "RATE_LIMIT_MUTATIONS_PER_MINUTE must be greater than zero".to_owned(),
            ));
        }

        if config.session_max_age_seconds <= 0 {
            return Err(AppError::Validation(
                "SESSION_MAX_AGE_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if config.rate_limit_cleanup_interval_seconds == 0 {
            return Err(AppError::Validation(
                "RATE_LIMIT_CLEANUP_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if config.requires_redis() && config.redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when RATE_LIMIT_STORE or VIEW_INVALIDATION_BACKEND is 'redis'"
                    .to_owned(),
            ));
        }

        Ok(config)
    }

    pub fn requires_redis(&self) -> bool {
        self.rate_limit_store == RateLimitStore::Redis
            || self.view_invalidation_backend == ViewInvalidationBackend::Redis
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

fn flag(name: &str, optional: &impl Fn(&str) -> Option<String>) -> bool {
    optional(name).is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

fn parse_or<T: FromStr>(
    name: &str,
    optional: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(value) => value
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}
