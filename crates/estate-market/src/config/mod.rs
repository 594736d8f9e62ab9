use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::Duration;

const DEV_JWT_SECRET: &str = "estate-market-development-secret";
const DEFAULT_HASH_COST: u32 = 12;
const MIN_HASH_COST: u32 = 4;
const MAX_HASH_COST: u32 = 31;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingSecret("JWT_SECRET"))
            }
            _ => DEV_JWT_SECRET.to_string(),
        };

        let auth = AuthConfig {
            jwt_secret,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "estate-market".to_string()),
            access_token_ttl_secs: numeric_var("JWT_ACCESS_TTL_SECS", 86_400)?,
            refresh_token_ttl_days: numeric_var("REFRESH_TOKEN_TTL_DAYS", 7)?,
            verification_token_ttl_hours: numeric_var("VERIFICATION_TOKEN_TTL_HOURS", 24)?,
            password_hash_cost: hash_cost_var("BCRYPT_COST")?,
        };

        let storage = StorageConfig {
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "estate-market-media".to_string()),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            presign_ttl_secs: numeric_var("S3_PRESIGN_TTL_SECS", 3_600)?,
        };

        let mail = MailConfig {
            from_address: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@estate-market.local".to_string()),
            frontend_url: env::var("APP_FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        };

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some(AdminSeed { email, password })
            }
            _ => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth,
            storage,
            mail,
            admin,
        })
    }

    /// Configuration used by tests and the CLI demo; never reads the environment.
    pub fn for_tests() -> Self {
        Self {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "warn".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                issuer: "estate-market".to_string(),
                access_token_ttl_secs: 86_400,
                refresh_token_ttl_days: 7,
                verification_token_ttl_hours: 24,
                password_hash_cost: MIN_HASH_COST,
            },
            storage: StorageConfig {
                bucket: "estate-market-media".to_string(),
                region: "us-east-1".to_string(),
                presign_ttl_secs: 3_600,
            },
            mail: MailConfig {
                from_address: "no-reply@estate-market.local".to_string(),
                frontend_url: "http://localhost:5173".to_string(),
            },
            admin: None,
        }
    }
}

fn hash_cost_var(name: &'static str) -> Result<u32, ConfigError> {
    let cost = numeric_var(name, DEFAULT_HASH_COST)?;
    if (MIN_HASH_COST..=MAX_HASH_COST).contains(&cost) {
        Ok(cost)
    } else {
        Err(ConfigError::InvalidNumber(name))
    }
}

fn numeric_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Token lifetimes and signing material.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_days: i64,
    pub verification_token_ttl_hours: i64,
    /// bcrypt work factor for stored passwords.
    pub password_hash_cost: u32,
}

impl AuthConfig {
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_ttl_days)
    }

    pub fn verification_token_ttl(&self) -> Duration {
        Duration::hours(self.verification_token_ttl_hours)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field(
                "verification_token_ttl_hours",
                &self.verification_token_ttl_hours,
            )
            .field("password_hash_cost", &self.password_hash_cost)
            .finish()
    }
}

/// Object storage bucket used for listing images.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub presign_ttl_secs: i64,
}

/// Outgoing mail settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from_address: String,
    pub frontend_url: String,
}

/// Administrator account created at startup when both credentials are present.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber(&'static str),
    MissingSecret(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber(name) => write!(f, "{name} must be a valid integer"),
            ConfigError::MissingSecret(name) => {
                write!(f, "{name} must be set when running in production")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber(_)
            | ConfigError::MissingSecret(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "JWT_SECRET",
            "JWT_ISSUER",
            "JWT_ACCESS_TTL_SECS",
            "REFRESH_TOKEN_TTL_DAYS",
            "VERIFICATION_TOKEN_TTL_HOURS",
            "BCRYPT_COST",
            "S3_BUCKET",
            "S3_REGION",
            "S3_PRESIGN_TTL_SECS",
            "ADMIN_EMAIL",
            "ADMIN_PASSWORD",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.auth.refresh_token_ttl(), Duration::days(7));
        assert_eq!(config.auth.verification_token_ttl(), Duration::hours(24));
        assert_eq!(config.auth.password_hash_cost, 12);
        assert!(config.admin.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
        reset_env();
    }

    #[test]
    fn production_requires_jwt_secret() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        match AppConfig::load() {
            Err(ConfigError::MissingSecret("JWT_SECRET")) => {}
            other => panic!("expected missing secret, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_ttl() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REFRESH_TOKEN_TTL_DAYS", "a week");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber("REFRESH_TOKEN_TTL_DAYS")) => {}
            other => panic!("expected invalid number, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_hash_cost_outside_bcrypt_range() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BCRYPT_COST", "3");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber("BCRYPT_COST")) => {}
            other => panic!("expected invalid number, got {other:?}"),
        }
        env::set_var("BCRYPT_COST", "10");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.auth.password_hash_cost, 10);
        reset_env();
    }

    #[test]
    fn admin_seed_requires_both_credentials() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMIN_EMAIL", "admin@estate.test");
        let config = AppConfig::load().expect("config loads");
        assert!(config.admin.is_none());

        env::set_var("ADMIN_PASSWORD", "change-me-now");
        let config = AppConfig::load().expect("config loads");
        let seed = config.admin.expect("admin seed present");
        assert_eq!(seed.email, "admin@estate.test");
        assert!(!format!("{seed:?}").contains("change-me-now"));
        reset_env();
    }
}
