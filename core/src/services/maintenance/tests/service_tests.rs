//! Unit tests for the maintenance sweep

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use mg_shared::MaintenanceConfig;

use crate::domain::entities::token::{IssuedToken, RefreshToken, RefreshTokenStatus};
use crate::domain::entities::verification_code::{VerificationCode, VerificationCodeStatus};
use crate::repositories::{
    MockRefreshTokenRepository, MockVerificationCodeRepository, RefreshTokenRepository,
    VerificationCodeRepository,
};
use crate::services::clock::{Clock, ManualClock};
use crate::services::maintenance::MaintenanceService;
use crate::services::verification::tests::mocks::HangingLockoutGuard;
use crate::services::verification::{InMemoryLockoutGuard, LockoutGuard};

struct Harness {
    service: MaintenanceService<MockVerificationCodeRepository, MockRefreshTokenRepository>,
    codes: Arc<MockVerificationCodeRepository>,
    tokens: Arc<MockRefreshTokenRepository>,
    guard: Arc<InMemoryLockoutGuard>,
    clock: Arc<ManualClock>,
}

fn harness(enabled: bool) -> Harness {
    let codes = Arc::new(MockVerificationCodeRepository::new());
    let tokens = Arc::new(MockRefreshTokenRepository::new());
    let guard = Arc::new(InMemoryLockoutGuard::default());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = MaintenanceService::new(
        codes.clone(),
        tokens.clone(),
        guard.clone(),
        clock.clone(),
        MaintenanceConfig {
            interval_seconds: 3600,
            enabled,
        },
        std::time::Duration::from_secs(10),
    );
    Harness {
        service,
        codes,
        tokens,
        guard,
        clock,
    }
}

fn refresh_token(email: &str, issued_at: chrono::DateTime<Utc>, ttl: Duration) -> RefreshToken {
    RefreshToken::from_issued(
        email.to_string(),
        IssuedToken {
            token_id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            expires_at: issued_at + ttl,
        },
        issued_at,
    )
}

#[tokio::test]
async fn test_sweep_expires_codes() {
    let h = harness(true);
    let start = h.clock.now();
    h.codes
        .create(VerificationCode::new("a@x.com".into(), "111111".into(), start, Duration::minutes(5)))
        .await
        .unwrap();
    h.codes
        .create(VerificationCode::new("b@x.com".into(), "222222".into(), start + Duration::minutes(10), Duration::minutes(5)))
        .await
        .unwrap();

    h.clock.advance(Duration::minutes(11));
    let report = h.service.run_once().await;

    assert!(report.is_clean());
    assert_eq!(report.codes_expired, 1);
    assert_eq!(h.codes.codes_for("a@x.com").await[0].status, VerificationCodeStatus::Expired);
    assert_eq!(h.codes.codes_for("b@x.com").await[0].status, VerificationCodeStatus::Active);
}

#[tokio::test]
async fn test_sweep_releases_lockouts() {
    let h = harness(true);
    let start = h.clock.now();
    for _ in 0..5 {
        h.guard.record_failure("a@x.com", start).await.unwrap();
    }
    h.guard.record_failure("b@x.com", start).await.unwrap();

    h.clock.advance(Duration::minutes(16));
    let report = h.service.run_once().await;

    assert_eq!(report.locks_released, 1);
    assert_eq!(report.counters_dropped, 1);
    assert_eq!(h.guard.state_of("a@x.com"), None);
    assert_eq!(h.guard.state_of("b@x.com"), None);
}

#[tokio::test]
async fn test_sweep_deactivates_expired_tokens() {
    let h = harness(true);
    let start = h.clock.now();
    let stale = h.tokens.save(refresh_token("a@x.com", start, Duration::days(1))).await.unwrap();
    let fresh = h.tokens.save(refresh_token("a@x.com", start, Duration::days(30))).await.unwrap();

    h.clock.advance(Duration::days(2));
    let report = h.service.run_once().await;

    assert_eq!(report.tokens_deactivated, 1);
    assert_eq!(h.tokens.get(stale.token_id).await.unwrap().status, RefreshTokenStatus::Inactive);
    assert_eq!(h.tokens.get(fresh.token_id).await.unwrap().status, RefreshTokenStatus::Active);
}

#[tokio::test]
async fn test_failing_step_does_not_stop_others() {
    let h = harness(true);
    let start = h.clock.now();
    h.tokens.save(refresh_token("a@x.com", start, Duration::days(1))).await.unwrap();
    h.codes.set_should_fail(true);

    h.clock.advance(Duration::days(2));
    let report = h.service.run_once().await;

    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Code expiry error"));
    assert_eq!(report.tokens_deactivated, 1);
}

#[tokio::test]
async fn test_disabled_service_does_not_start() {
    let h = harness(false);
    assert!(Arc::new(h.service).start_background_task().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_background_task_runs_immediately() {
    let h = harness(true);
    let start = h.clock.now();
    h.codes
        .create(VerificationCode::new("a@x.com".into(), "111111".into(), start - Duration::minutes(10), Duration::minutes(5)))
        .await
        .unwrap();
    let codes = h.codes.clone();

    let handle = Arc::new(h.service).start_background_task().unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    handle.abort();

    assert_eq!(codes.codes_for("a@x.com").await[0].status, VerificationCodeStatus::Expired);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_guard_does_not_block_sweep() {
    let codes = Arc::new(MockVerificationCodeRepository::new());
    let tokens = Arc::new(MockRefreshTokenRepository::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = MaintenanceService::new(
        codes.clone(),
        tokens.clone(),
        Arc::new(HangingLockoutGuard),
        clock.clone(),
        MaintenanceConfig::default(),
        std::time::Duration::from_secs(1),
    );
    let start = clock.now();
    codes
        .create(VerificationCode::new("a@x.com".into(), "111111".into(), start, Duration::minutes(5)))
        .await
        .unwrap();
    clock.advance(Duration::minutes(6));

    let report = tokio::time::timeout(std::time::Duration::from_secs(600), service.run_once())
        .await
        .expect("sweep must not hang on a stalled guard");

    assert_eq!(report.codes_expired, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("lockout.sweep"));
}
