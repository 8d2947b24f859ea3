use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};
use validator::{Validate, ValidationError};

const CONFIG_DIR: &str = "config";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Runtime settings. Every key is optional in the files; missing keys take
/// the values from [`Default`].
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
#[validate(schema(function = "check_cross_field_limits"))]
pub struct AppConfig {
    /// Postgres or SQLite URL
    #[validate(length(min = 1))]
    pub database_url: String,
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// development, staging, production or test
    #[validate(length(min = 1))]
    pub environment: String,

    #[validate(custom = "check_log_level")]
    pub log_level: String,
    pub log_json: bool,

    /// Apply pending migrations before serving
    pub auto_migrate: bool,

    /// Comma-separated origin list
    pub cors_allowed_origins: Option<String>,
    pub cors_allow_any_origin: bool,

    #[validate(range(min = 1))]
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_connect_timeout_secs: u64,
    pub db_idle_timeout_secs: u64,
    pub db_acquire_timeout_secs: u64,

    /// `limit` used by list endpoints when the query has none
    #[validate(range(min = 1))]
    pub api_default_page_size: u64,
    #[validate(range(min = 1))]
    pub api_max_page_size: u64,

    #[validate(range(min = 1, max = 3650))]
    pub analytics_default_days: i64,
    #[validate(range(min = 1, max = 120))]
    pub analytics_default_months: i64,

    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://ecommerce_admin.db?mode=rwc".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            auto_migrate: true,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            db_max_connections: 10,
            db_min_connections: 1,
            db_connect_timeout_secs: 30,
            db_idle_timeout_secs: 600,
            db_acquire_timeout_secs: 30,
            api_default_page_size: 100,
            api_max_page_size: 1000,
            analytics_default_days: 7,
            analytics_default_months: 12,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            ..Self::default()
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn cors_origins(&self) -> Vec<String> {
        let Some(raw) = self.cors_allowed_origins.as_deref() else {
            return Vec::new();
        };
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    /// Any origin is accepted in development, or anywhere the operator opted in.
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.cors_allow_any_origin || self.is_development()
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn check_log_level(level: &str) -> Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        return Ok(());
    }
    Err(invalid("log_level", "expected trace, debug, info, warn or error"))
}

fn check_cross_field_limits(cfg: &AppConfig) -> Result<(), ValidationError> {
    if cfg.api_default_page_size > cfg.api_max_page_size {
        return Err(invalid(
            "api_default_page_size",
            "api_default_page_size exceeds api_max_page_size",
        ));
    }
    if cfg.db_min_connections > cfg.db_max_connections {
        return Err(invalid(
            "db_min_connections",
            "db_min_connections exceeds db_max_connections",
        ));
    }
    if cfg.cors_origins().is_empty() && !cfg.should_allow_permissive_cors() {
        return Err(invalid(
            "cors_allowed_origins",
            "outside development set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true",
        ));
    }
    Ok(())
}

/// Installs the global subscriber. A non-empty `RUST_LOG` replaces the
/// configured directives entirely.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(format!("ecommerce_admin_api={level},tower_http=debug,sqlx=warn")),
    };

    let builder = fmt().with_env_filter(filter).with_target(true);
    // A subscriber may already be installed by a test harness.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Loads `config/default.toml`, then `config/<RUN_ENV>.toml`, then `APP__*`
/// variables, each layer overriding the previous one.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string());

    if !config_dir.is_dir() {
        warn!(dir = %config_dir.display(), "config directory missing, using defaults and APP__* only");
    }

    let layer = |name: &str| File::from(config_dir.join(name)).required(false);
    let cfg: AppConfig = Config::builder()
        .set_default("environment", run_env.as_str())?
        .add_source(layer("default.toml"))
        .add_source(layer(&format!("{run_env}.toml")))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()?;

    cfg.validate()?;

    info!(
        environment = %cfg.environment,
        host = %cfg.host,
        port = cfg.port,
        auto_migrate = cfg.auto_migrate,
        "configuration loaded"
    );
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn production() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "production".into(),
        )
    }

    fn dir_with_default(content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("default.toml"), content).unwrap();
        dir
    }

    #[test]
    fn production_needs_an_origin_list_or_opt_in() {
        let mut cfg = production();
        assert!(cfg.validate().is_err());

        cfg.cors_allow_any_origin = true;
        assert!(cfg.validate().is_ok());

        cfg.cors_allow_any_origin = false;
        cfg.cors_allowed_origins = Some(" https://admin.example.com, ,".into());
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.cors_origins(), vec!["https://admin.example.com"]);
    }

    #[test]
    fn development_is_valid_out_of_the_box() {
        let cfg = AppConfig::default();
        assert!(cfg.is_development());
        assert!(cfg.should_allow_permissive_cors());
        assert!(cfg.auto_migrate);
        assert_eq!(cfg.api_default_page_size, 100);
        assert_eq!(cfg.analytics_default_days, 7);
        assert_eq!(cfg.analytics_default_months, 12);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let cfg = AppConfig {
            log_level: "chatty".into(),
            ..AppConfig::default()
        };
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("log_level"));
    }

    #[test]
    fn default_page_size_cannot_exceed_maximum() {
        let cfg = AppConfig {
            api_default_page_size: 500,
            api_max_page_size: 50,
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = dir_with_default(
            r#"
                database_url = "postgres://localhost/admin"
                port = 9000
                api_default_page_size = 25
            "#,
        );

        let cfg = load_config_from(dir.path()).unwrap();
        assert_eq!(cfg.database_url, "postgres://localhost/admin");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.api_default_page_size, 25);
        assert_eq!(cfg.api_max_page_size, 1000);
    }

    #[test]
    fn unknown_keys_fail_to_load() {
        let dir = dir_with_default("jwt_secret = \"unused\"\n");
        assert!(matches!(
            load_config_from(dir.path()),
            Err(AppConfigError::Load(_))
        ));
    }
}
