//! Periodic sweep of expired codes, elapsed lockouts and expired refresh tokens

use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use mg_shared::MaintenanceConfig;

use crate::domain::entities::token::RefreshTokenStatus;
use crate::domain::entities::verification_code::VerificationCodeStatus;
use crate::domain::value_objects::SweepReport;
use crate::errors::DomainError;
use crate::repositories::{RefreshTokenRepository, VerificationCodeRepository};
use crate::services::clock::Clock;
use crate::services::timeout::with_timeout;
use crate::services::verification::LockoutGuard;

/// Service running the hourly maintenance sweep
pub struct MaintenanceService<V, R>
where
    V: VerificationCodeRepository + 'static,
    R: RefreshTokenRepository + 'static,
{
    code_repository: Arc<V>,
    token_repository: Arc<R>,
    lockout: Arc<dyn LockoutGuard>,
    clock: Arc<dyn Clock>,
    config: MaintenanceConfig,
    io_timeout: StdDuration,
}

impl<V, R> MaintenanceService<V, R>
where
    V: VerificationCodeRepository + 'static,
    R: RefreshTokenRepository + 'static,
{
    /// Create a new maintenance service
    ///
    /// `io_timeout` bounds each store and guard call of a sweep.
    pub fn new(
        code_repository: Arc<V>,
        token_repository: Arc<R>,
        lockout: Arc<dyn LockoutGuard>,
        clock: Arc<dyn Clock>,
        config: MaintenanceConfig,
        io_timeout: StdDuration,
    ) -> Self {
        Self {
            code_repository,
            token_repository,
            lockout,
            clock,
            config,
            io_timeout,
        }
    }

    /// Run a single sweep
    ///
    /// This method performs the following tasks:
    /// 1. Move active codes past their expiration time to `Expired`
    /// 2. Sweep the lockout guard
    /// 3. Move active refresh tokens past their expiry date to `Inactive`
    ///
    /// A failing step is logged and recorded in the report; the remaining
    /// steps still run.
    pub async fn run_once(&self) -> SweepReport {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        info!(event = "sweep_started", "Starting maintenance sweep");

        match self.expire_codes(now).await {
            Ok(count) => report.codes_expired = count,
            Err(e) => {
                error!(error = %e, event = "sweep_codes_failed", "Failed to expire verification codes");
                report.errors.push(format!("Code expiry error: {}", e));
            }
        }

        match with_timeout(self.io_timeout, "lockout.sweep", self.lockout.sweep(now)).await {
            Ok(sweep) => {
                report.locks_released = sweep.locks_released;
                report.counters_dropped = sweep.counters_dropped;
            }
            Err(e) => {
                error!(error = %e, event = "sweep_lockouts_failed", "Failed to sweep lockouts");
                report.errors.push(format!("Lockout sweep error: {}", e));
            }
        }

        match self.deactivate_expired_tokens(now).await {
            Ok(count) => report.tokens_deactivated = count,
            Err(e) => {
                error!(error = %e, event = "sweep_tokens_failed", "Failed to deactivate expired refresh tokens");
                report.errors.push(format!("Token expiry error: {}", e));
            }
        }

        info!(
            codes_expired = report.codes_expired,
            locks_released = report.locks_released,
            counters_dropped = report.counters_dropped,
            tokens_deactivated = report.tokens_deactivated,
            errors = report.errors.len(),
            event = "sweep_completed",
            "Maintenance sweep completed"
        );

        report
    }

    async fn expire_codes(&self, now: chrono::DateTime<chrono::Utc>) -> Result<usize, DomainError> {
        let expired = with_timeout(
            self.io_timeout,
            "verification_code.find_expired_active",
            self.code_repository.find_expired_active(now),
        )
        .await?;
        if expired.is_empty() {
            return Ok(0);
        }
        let ids: Vec<_> = expired.iter().map(|c| c.id).collect();
        with_timeout(
            self.io_timeout,
            "verification_code.update_status",
            self.code_repository
                .update_status(&ids, VerificationCodeStatus::Expired, now),
        )
        .await
    }

    async fn deactivate_expired_tokens(
        &self,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<usize, DomainError> {
        let expired = with_timeout(
            self.io_timeout,
            "refresh_token.find_expired_active",
            self.token_repository.find_expired_active(now),
        )
        .await?;
        let mut count = 0;
        for token in expired {
            // Only tokens still active; a concurrent rotation may have moved it
            let deactivated = with_timeout(
                self.io_timeout,
                "refresh_token.compare_and_set_status",
                self.token_repository.compare_and_set_status(
                    token.token_id,
                    RefreshTokenStatus::Active,
                    RefreshTokenStatus::Inactive,
                    now,
                ),
            )
            .await?;
            if deactivated {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Start the sweep as a background task
    ///
    /// Returns `None` when maintenance is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!(event = "sweep_disabled", "Maintenance sweep is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                event = "sweep_scheduled",
                "Maintenance sweep scheduled"
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                let report = self.run_once().await;
                if !report.is_clean() {
                    warn!(errors = ?report.errors, event = "sweep_partial", "Sweep completed with errors");
                }
            }
        }))
    }
}
