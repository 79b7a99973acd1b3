use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::workflows::hiring::{
    IntakeSettings, PipelineError, PipelineSettings, PostPublishPolicy, RequirementsArtifact,
};

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

const DEFAULT_SENDER_ADDRESS: &str = "hr@example.com";

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub hiring: HiringConfig,
    pub intake: IntakeConfig,
}

impl AppConfig {
    /// Read `.env` and the process environment. Every problem surfaces here, before any
    /// pipeline step can run.
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

        let hiring = HiringConfig::from_env(environment)?;
        let intake = IntakeConfig::from_env()?;

        let config = Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            hiring,
            intake,
        };
        config
            .pipeline_settings()
            .validate()
            .map_err(ConfigError::Pipeline)?;
        Ok(config)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        let hiring = &self.hiring;
        PipelineSettings {
            min_applicants: hiring.min_applicants,
            top_candidates: hiring.top_candidates,
            post_publish: hiring.post_publish,
            max_modify_rounds: hiring.max_modify_rounds,
            max_offer_rounds: hiring.max_offer_rounds,
            max_approval_polls: hiring.max_approval_polls,
            max_steps: hiring.max_steps,
            call_timeout: hiring.call_timeout,
            sender_address: hiring.sender_address.clone(),
            approval_recipient: hiring.approval_recipient.clone(),
        }
    }

    pub fn intake_settings(&self) -> IntakeSettings {
        IntakeSettings {
            call_timeout: self.hiring.call_timeout,
            sender_address: self.hiring.sender_address.clone(),
            handle_replies: self.intake.handle_replies,
        }
    }

    pub fn requirements_artifact(&self) -> RequirementsArtifact {
        RequirementsArtifact::new(self.hiring.requirements_path.clone())
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

/// Pipeline tunables and shared hiring settings.
#[derive(Debug, Clone)]
pub struct HiringConfig {
    pub min_applicants: usize,
    pub top_candidates: usize,
    pub post_publish: PostPublishPolicy,
    pub max_modify_rounds: u32,
    pub max_offer_rounds: u32,
    pub max_approval_polls: u32,
    pub max_steps: u32,
    pub call_timeout: Duration,
    pub requirements_path: PathBuf,
    pub sender_address: String,
    pub approval_recipient: Option<String>,
}

impl HiringConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let post_publish = match optional_var("HIRING_POST_PUBLISH") {
            Some(value) => PostPublishPolicy::parse(&value)
                .ok_or(ConfigError::InvalidPostPublishPolicy { value })?,
            None => PostPublishPolicy::default(),
        };

        let sender_address = match optional_var("HIRING_SENDER_ADDRESS") {
            Some(address) => address,
            None if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingSenderAddress)
            }
            None => DEFAULT_SENDER_ADDRESS.to_string(),
        };

        Ok(Self {
            min_applicants: parse_var("HIRING_MIN_APPLICANTS", 10)?,
            top_candidates: parse_var("HIRING_TOP_CANDIDATES", 5)?,
            post_publish,
            max_modify_rounds: parse_var("HIRING_MAX_MODIFY_ROUNDS", 3)?,
            max_offer_rounds: parse_var("HIRING_MAX_OFFER_ROUNDS", 3)?,
            max_approval_polls: parse_var("HIRING_MAX_APPROVAL_POLLS", 5)?,
            max_steps: parse_var("HIRING_MAX_STEPS", 200)?,
            call_timeout: Duration::from_secs(parse_var("HIRING_CALL_TIMEOUT_SECS", 30)?),
            requirements_path: optional_var("HIRING_REQUIREMENTS_PATH")
                .unwrap_or_else(|| "latest_requirements.txt".to_string())
                .into(),
            sender_address,
            approval_recipient: optional_var("HIRING_APPROVAL_RECIPIENT"),
        })
    }
}

/// Resume intake schedule and inbox.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub interval: Duration,
    pub inbox_dir: PathBuf,
    pub handle_replies: bool,
}

impl IntakeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let minutes: u64 = parse_var("INTAKE_INTERVAL_MINUTES", 60)?;
        if minutes == 0 {
            return Err(ConfigError::ZeroIntakeInterval);
        }
        let interval = intake_interval(minutes).ok_or_else(|| ConfigError::InvalidValue {
            key: "INTAKE_INTERVAL_MINUTES",
            value: minutes.to_string(),
        })?;

        let handle_replies = match optional_var("INTAKE_HANDLE_REPLIES") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                key: "INTAKE_HANDLE_REPLIES",
                value,
            })?,
            None => true,
        };

        Ok(Self {
            interval,
            inbox_dir: optional_var("INTAKE_INBOX_DIR")
                .unwrap_or_else(|| "inbox".to_string())
                .into(),
            handle_replies,
        })
    }
}

/// Longest accepted intake interval: one week.
pub const MAX_INTAKE_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Tick interval for a minute count; `None` when zero or above a week.
pub fn intake_interval(minutes: u64) -> Option<Duration> {
    if minutes == 0 || minutes > MAX_INTAKE_INTERVAL_MINUTES {
        return None;
    }
    minutes.checked_mul(60).map(Duration::from_secs)
}

/// Set and non-blank.
fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(key) {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { key: &'static str, value: String },
    InvalidPostPublishPolicy { value: String },
    MissingSenderAddress,
    ZeroIntakeInterval,
    Pipeline(PipelineError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "{key} has an invalid value '{value}'")
            }
            ConfigError::InvalidPostPublishPolicy { value } => write!(
                f,
                "HIRING_POST_PUBLISH must be 'stop' or 'continue', got '{value}'"
            ),
            ConfigError::MissingSenderAddress => {
                write!(f, "HIRING_SENDER_ADDRESS is required in production")
            }
            ConfigError::ZeroIntakeInterval => {
                write!(f, "INTAKE_INTERVAL_MINUTES must be at least 1")
            }
            ConfigError::Pipeline(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Pipeline(err) => Some(err),
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

    const KEYS: [&str; 18] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "APP_LOG_LEVEL",
        "HIRING_MIN_APPLICANTS",
        "HIRING_TOP_CANDIDATES",
        "HIRING_POST_PUBLISH",
        "HIRING_MAX_MODIFY_ROUNDS",
        "HIRING_MAX_OFFER_ROUNDS",
        "HIRING_MAX_APPROVAL_POLLS",
        "HIRING_MAX_STEPS",
        "HIRING_CALL_TIMEOUT_SECS",
        "HIRING_REQUIREMENTS_PATH",
        "HIRING_SENDER_ADDRESS",
        "HIRING_APPROVAL_RECIPIENT",
        "INTAKE_INTERVAL_MINUTES",
        "INTAKE_INBOX_DIR",
        "INTAKE_HANDLE_REPLIES",
    ];

    fn reset_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");

        let settings = config.pipeline_settings();
        assert_eq!(settings, PipelineSettings::default());
        assert_eq!(config.hiring.requirements_path, PathBuf::from("latest_requirements.txt"));
        assert_eq!(config.intake.interval, Duration::from_secs(3600));
        assert!(config.intake_settings().handle_replies);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn hiring_overrides_are_applied() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("HIRING_POST_PUBLISH", "continue");
        env::set_var("HIRING_TOP_CANDIDATES", "3");
        env::set_var("HIRING_APPROVAL_RECIPIENT", "director@example.com");
        env::set_var("INTAKE_HANDLE_REPLIES", "off");

        let config = AppConfig::load().expect("config loads");
        let settings = config.pipeline_settings();
        assert_eq!(settings.post_publish, PostPublishPolicy::Continue);
        assert_eq!(settings.top_candidates, 3);
        assert_eq!(
            settings.approval_recipient.as_deref(),
            Some("director@example.com")
        );
        assert!(!config.intake_settings().handle_replies);
        reset_env();
    }

    #[test]
    fn production_requires_sender_address() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::MissingSenderAddress)
        ));

        env::set_var("HIRING_SENDER_ADDRESS", "talent@acme.test");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.hiring.sender_address, "talent@acme.test");
        reset_env();
    }

    #[test]
    fn invalid_values_fail_before_anything_runs() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        env::set_var("HIRING_POST_PUBLISH", "sometimes");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPostPublishPolicy { .. })
        ));
        reset_env();

        env::set_var("HIRING_MIN_APPLICANTS", "ten");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidValue { key: "HIRING_MIN_APPLICANTS", .. })
        ));
        reset_env();

        env::set_var("INTAKE_INTERVAL_MINUTES", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::ZeroIntakeInterval)
        ));
        reset_env();

        env::set_var("INTAKE_INTERVAL_MINUTES", u64::MAX.to_string());
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidValue { key: "INTAKE_INTERVAL_MINUTES", .. })
        ));
        reset_env();

        env::set_var("HIRING_TOP_CANDIDATES", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::Pipeline(_))));
        reset_env();
    }

    #[test]
    fn intake_interval_rejects_zero_and_overflow() {
        assert_eq!(intake_interval(5), Some(Duration::from_secs(300)));
        assert_eq!(intake_interval(0), None);
        assert_eq!(
            intake_interval(MAX_INTAKE_INTERVAL_MINUTES),
            Some(Duration::from_secs(7 * 24 * 3600))
        );
        assert_eq!(intake_interval(MAX_INTAKE_INTERVAL_MINUTES + 1), None);
        assert_eq!(intake_interval(u64::MAX), None);
    }
}
