use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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
    pub assessor: AssessorConfig,
    pub review: ReviewConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let assessor = AssessorConfig::from_env()?;
        let review = ReviewConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            assessor,
            review,
        })
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection settings for the narrative assessment backend.
///
/// The sampling temperature is pinned low so repeated runs over the same
/// ticket stay as close to deterministic as the backend allows. It is a fixed
/// system requirement, not an environment knob.
#[derive(Debug, Clone)]
pub struct AssessorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl AssessorConfig {
    pub const TEMPERATURE: f32 = 0.1;

    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        let max_tokens = env::var("OPENAI_MAX_TOKENS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidMaxTokens)?;
        let timeout_secs = env::var("OPENAI_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        Ok(Self {
            api_key,
            base_url,
            model,
            temperature: Self::TEMPERATURE,
            max_tokens,
            timeout: Duration::from_secs(timeout_secs),
            max_retries: 3,
        })
    }

    /// Returns the API key or fails when the backend is required but
    /// unconfigured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey)
    }
}

/// Batch review controls.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub concurrency: usize,
}

impl ReviewConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let concurrency = env::var("REVIEW_CONCURRENCY")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<usize>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidConcurrency)?;

        Ok(Self { concurrency })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMaxTokens,
    InvalidTimeout,
    InvalidConcurrency,
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMaxTokens => {
                write!(f, "OPENAI_MAX_TOKENS must be a positive integer")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "OPENAI_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidConcurrency => {
                write!(f, "REVIEW_CONCURRENCY must be a positive integer")
            }
            ConfigError::MissingApiKey => {
                write!(f, "OPENAI_API_KEY must be set to run narrative assessments")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("OPENAI_API_KEY");
        env::remove_var("OPENAI_BASE_URL");
        env::remove_var("OPENAI_MODEL");
        env::remove_var("OPENAI_MAX_TOKENS");
        env::remove_var("OPENAI_TIMEOUT_SECS");
        env::remove_var("REVIEW_CONCURRENCY");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.review.concurrency, 5);
        assert_eq!(config.assessor.model, "gpt-4o");
        assert_eq!(config.assessor.max_retries, 3);
        assert!(config.assessor.api_key.is_none());
    }

    #[test]
    fn temperature_is_pinned_regardless_of_environment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads");
        assert!((config.assessor.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_zero_concurrency() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REVIEW_CONCURRENCY", "0");
        let error = AppConfig::load().expect_err("zero concurrency is invalid");
        assert!(matches!(error, ConfigError::InvalidConcurrency));
        reset_env();
    }

    #[test]
    fn missing_api_key_is_surfaced_on_demand() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads");
        let error = config
            .assessor
            .require_api_key()
            .expect_err("no key configured");
        assert!(matches!(error, ConfigError::MissingApiKey));
    }
}
