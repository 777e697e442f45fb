//! Unit tests for mock refresh token repository implementation

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{IssuedToken, RefreshToken, RefreshTokenStatus};
use crate::repositories::token::{MockRefreshTokenRepository, RefreshTokenRepository};

fn token(email: &str, value: &str, days: i64) -> RefreshToken {
    let now = Utc::now();
    RefreshToken::from_issued(
        email.to_string(),
        IssuedToken {
            token_id: Uuid::new_v4(),
            token: value.to_string(),
            expires_at: now + Duration::days(days),
        },
        now,
    )
}

#[tokio::test]
async fn test_save_and_find_by_token() {
    let repo = MockRefreshTokenRepository::new();
    let saved = repo.save(token("a@x.com", "t1", 30)).await.unwrap();

    let found = repo.find_by_token("t1").await.unwrap().unwrap();
    assert_eq!(found.token_id, saved.token_id);
    assert!(repo.find_by_token("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_token_value_rejected() {
    let repo = MockRefreshTokenRepository::new();
    repo.save(token("a@x.com", "same", 30)).await.unwrap();
    assert!(repo.save(token("a@x.com", "same", 30)).await.is_err());
}

#[tokio::test]
async fn test_compare_and_set_only_succeeds_once() {
    let repo = MockRefreshTokenRepository::new();
    let saved = repo.save(token("a@x.com", "t1", 30)).await.unwrap();
    let now = Utc::now();

    let first = repo
        .compare_and_set_status(saved.token_id, RefreshTokenStatus::Active, RefreshTokenStatus::Inactive, now)
        .await
        .unwrap();
    let second = repo
        .compare_and_set_status(saved.token_id, RefreshTokenStatus::Active, RefreshTokenStatus::Inactive, now)
        .await
        .unwrap();

    assert!(first);
    assert!(!second);
}

#[tokio::test]
async fn test_is_blacklisted_follows_status() {
    let repo = MockRefreshTokenRepository::new();
    let saved = repo.save(token("a@x.com", "t1", 30)).await.unwrap();

    assert!(!repo.is_blacklisted("t1").await.unwrap());
    assert!(!repo.is_blacklisted("unknown").await.unwrap());

    repo.set_status(saved.token_id, RefreshTokenStatus::Blacklisted, Utc::now())
        .await
        .unwrap();
    assert!(repo.is_blacklisted("t1").await.unwrap());
}

#[tokio::test]
async fn test_active_and_expired_queries() {
    let repo = MockRefreshTokenRepository::new();
    repo.save(token("a@x.com", "fresh", 30)).await.unwrap();
    repo.save(token("a@x.com", "stale", -1)).await.unwrap();
    repo.save(token("b@x.com", "other", 30)).await.unwrap();

    assert_eq!(repo.find_active_by_email("a@x.com").await.unwrap().len(), 2);

    let expired = repo.find_expired_active(Utc::now()).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].token, "stale");
}

#[tokio::test]
async fn test_set_status_unknown_id() {
    let repo = MockRefreshTokenRepository::new();
    assert!(!repo
        .set_status(Uuid::new_v4(), RefreshTokenStatus::Inactive, Utc::now())
        .await
        .unwrap());
}
