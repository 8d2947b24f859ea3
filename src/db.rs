pub mod unit_of_work;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::migrator::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub use unit_of_work::UnitOfWork;

pub type DbPool = DatabaseConnection;

/// Pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            acquire_timeout: Duration::from_secs(10),
        }
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .sqlx_logging(true);
        opt
    }

    /// URL with any password replaced, for log output.
    fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let credentials = &self.url[scheme_end + 3..at];
                match credentials.split_once(':') {
                    Some((user, _)) => format!(
                        "{}{}:***{}",
                        &self.url[..scheme_end + 3],
                        user,
                        &self.url[at..]
                    ),
                    None => self.url.clone(),
                }
            }
            _ => self.url.clone(),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    let url = config.redacted_url();
    debug!(url = %url, ?config.connect_timeout, ?config.acquire_timeout, "opening database pool");

    let pool = Database::connect(config.connect_options()).await.map_err(|e| {
        error!(url = %url, error = %e, "database connection failed");
        e
    })?;

    info!(
        url = %url,
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Small pool for command-line tools.
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    establish_connection_with_config(&DbConfig::for_url(database_url)).await
}

pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    establish_connection_with_config(&DbConfig::from(cfg)).await
}

/// Applies every pending migration.
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    let started = Instant::now();
    let pending = Migrator::get_pending_migrations(pool).await?.len();
    if pending == 0 {
        debug!("schema up to date");
        return Ok(());
    }

    info!(pending, "applying migrations");
    Migrator::up(pool, None).await.map_err(|e| {
        error!(error = %e, elapsed_ms = started.elapsed().as_millis() as u64, "migration failed");
        e
    })?;
    info!(
        pending,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "migrations applied"
    );
    Ok(())
}

/// Round-trips a ping; used by the readiness probe.
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    let started = Instant::now();
    pool.ping().await.map_err(|e| {
        warn!(error = %e, "database ping failed");
        e
    })?;
    debug!(elapsed_us = started.elapsed().as_micros() as u64, "database ping ok");
    Ok(())
}

pub async fn close_pool(pool: DbPool) -> Result<(), ServiceError> {
    info!("closing database pool");
    Ok(pool.close().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_password_only() {
        let cfg = DbConfig::for_url("postgres://admin:hunter2@db:5432/shop");
        assert_eq!(cfg.redacted_url(), "postgres://admin:***@db:5432/shop");

        let cfg = DbConfig::for_url("sqlite::memory:");
        assert_eq!(cfg.redacted_url(), "sqlite::memory:");
    }

    #[test]
    fn app_config_tuning_is_carried_over() {
        let mut app = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        );
        app.db_max_connections = 3;
        app.db_acquire_timeout_secs = 2;

        let cfg = DbConfig::from(&app);
        assert_eq!(cfg.max_connections, 3);
        assert_eq!(cfg.acquire_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let mut cfg = DbConfig::for_url("sqlite::memory:");
        cfg.max_connections = 1;
        let pool = establish_connection_with_config(&cfg)
            .await
            .expect("connect");

        run_migrations(&pool).await.expect("first run");
        run_migrations(&pool).await.expect("second run");
        check_connection(&pool).await.expect("ping");
        assert!(Migrator::get_pending_migrations(&pool)
            .await
            .expect("pending")
            .is_empty());
    }
}
