//! # Infrastructure Layer
//!
//! Concrete adapters for the MailGate core:
//!
//! - **Database**: MySQL repositories for codes, refresh tokens and accounts
//! - **Cache**: Redis lockout guard shared between instances
//! - **Email**: SMTP and logging transports
//! - **Telemetry**: tracing subscriber setup
//!
//! [`initialize`] wires these into ready-to-use services.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use mg_core::errors::DomainError;
use mg_core::services::{
    AuthService, Clock, EmailServiceTrait, InMemoryLockoutGuard, LockoutGuard, LockoutPolicy,
    MaintenanceService, RefreshTokenService, SystemClock, TokenSigner, TokenSignerConfig,
    VerificationService, VerificationServiceConfig,
};
use mg_shared::AppConfig;

pub mod cache;
pub mod database;
pub mod email;
pub mod telemetry;

use cache::RedisLockoutGuard;
use database::{
    DatabasePool, MySqlAccountRepository, MySqlRefreshTokenRepository,
    MySqlVerificationCodeRepository,
};

/// Infrastructure-specific errors
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::Internal {
            message: err.to_string(),
        }
    }
}

/// Authentication service over the MySQL adapters
pub type MailGateAuthService = AuthService<
    MySqlVerificationCodeRepository,
    dyn EmailServiceTrait,
    MySqlRefreshTokenRepository,
    MySqlAccountRepository,
>;

/// Maintenance sweep over the MySQL adapters
pub type MailGateMaintenance =
    MaintenanceService<MySqlVerificationCodeRepository, MySqlRefreshTokenRepository>;

/// Fully wired services
pub struct MailGate {
    pub auth: Arc<MailGateAuthService>,
    pub maintenance: Arc<MailGateMaintenance>,
    pub database: DatabasePool,
}

/// Load configuration from the environment
///
/// Reads `.env` first and then the environment-specific file, without
/// overriding variables that are already set.
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok();
    let environment = mg_shared::Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();

    let config = AppConfig::from_env();
    config.validate().map_err(InfrastructureError::Config)?;
    Ok(config)
}

/// Connect every adapter and build the services
///
/// This function sets up:
/// - The database pool, with migrations applied
/// - The lockout guard, on Redis when configured and in memory otherwise
/// - The email transport
/// - The token signer, refusing weak secrets
pub async fn initialize(config: &AppConfig) -> Result<MailGate, InfrastructureError> {
    tracing::info!(
        environment = ?config.environment,
        event = "mailgate_initializing",
        "Initializing MailGate services"
    );

    let database = DatabasePool::new(config.database.clone()).await?;
    database.run_migrations().await?;
    let stats = database.get_statistics();
    tracing::info!(
        connections = stats.connections,
        idle_connections = stats.idle_connections,
        max_connections = stats.max_connections,
        event = "db_pool_ready",
        "Database pool ready"
    );
    let pool = database.get_pool().clone();

    let code_repository = Arc::new(MySqlVerificationCodeRepository::new(pool.clone()));
    let token_repository = Arc::new(MySqlRefreshTokenRepository::new(pool.clone()));
    let account_repository = Arc::new(MySqlAccountRepository::new(pool));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let io_timeout = Duration::from_secs(config.auth.io_timeout_seconds);
    let policy = LockoutPolicy::from_settings(&config.auth.verification);

    let lockout: Arc<dyn LockoutGuard> = match &config.cache {
        Some(cache) => Arc::new(RedisLockoutGuard::connect(cache, policy).await?),
        None => {
            tracing::warn!(
                event = "lockout_in_memory",
                "REDIS_URL not set, lockout state is local to this process"
            );
            Arc::new(InMemoryLockoutGuard::new(policy))
        }
    };

    let email_service = email::create_email_service(&config.email)?;

    let signer_config =
        TokenSignerConfig::from_settings(&config.auth.jwt, config.environment.is_production());
    let signer = TokenSigner::new(signer_config, clock.clone())
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    let verification_service = Arc::new(VerificationService::new(
        code_repository.clone(),
        email_service,
        lockout.clone(),
        clock.clone(),
        VerificationServiceConfig::from_settings(
            &config.auth.verification,
            config.auth.io_timeout_seconds,
        ),
    ));

    let token_service = Arc::new(RefreshTokenService::new(
        token_repository.clone(),
        account_repository.clone(),
        Arc::new(signer),
        clock.clone(),
        io_timeout,
    ));

    let auth = Arc::new(AuthService::new(
        verification_service,
        token_service,
        account_repository,
        clock.clone(),
        io_timeout,
    ));

    let maintenance = Arc::new(MaintenanceService::new(
        code_repository,
        token_repository,
        lockout,
        clock,
        config.maintenance.clone(),
        io_timeout,
    ));

    tracing::info!(event = "mailgate_initialized", "MailGate services initialized");

    Ok(MailGate {
        auth,
        maintenance,
        database,
    })
}
