//! End-to-end login and refresh flow through the public API
//!
//! Uses small in-file stores so the test only depends on what the crate
//! exports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use mg_core::services::ManualClock;
use mg_core::{
    Account, AccountRepository, AuthError, AuthService, Clock, DomainError, EmailServiceTrait,
    InMemoryLockoutGuard, LockoutPolicy, RefreshToken, RefreshTokenRepository,
    RefreshTokenService, RefreshTokenStatus, TokenError, TokenSigner, TokenSignerConfig,
    VerificationCode, VerificationCodeRepository, VerificationCodeStatus, VerificationService,
    VerificationServiceConfig,
};

#[derive(Default)]
struct CodeStore {
    codes: Mutex<HashMap<Uuid, VerificationCode>>,
}

#[async_trait]
impl VerificationCodeRepository for CodeStore {
    async fn create(&self, code: VerificationCode) -> Result<VerificationCode, DomainError> {
        self.codes.lock().unwrap().insert(code.id, code.clone());
        Ok(code)
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<VerificationCode>, DomainError> {
        Ok(self.find_all_active_by_email(email).await?.into_iter().next())
    }

    async fn find_all_active_by_email(&self, email: &str) -> Result<Vec<VerificationCode>, DomainError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.email == email && c.status == VerificationCodeStatus::Active)
            .cloned()
            .collect())
    }

    async fn exists_active_created_after(&self, email: &str, since: DateTime<Utc>) -> Result<bool, DomainError> {
        Ok(self
            .find_all_active_by_email(email)
            .await?
            .iter()
            .any(|c| c.created_at > since))
    }

    async fn update_status(
        &self,
        ids: &[Uuid],
        status: VerificationCodeStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut codes = self.codes.lock().unwrap();
        let mut updated = 0;
        for id in ids {
            if let Some(code) = codes.get_mut(id) {
                code.transition(status, at);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut codes = self.codes.lock().unwrap();
        match codes.get_mut(&id) {
            Some(code) if code.status == VerificationCodeStatus::Active => {
                code.transition(VerificationCodeStatus::Used, at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn supersede_and_create(&self, code: VerificationCode) -> Result<usize, DomainError> {
        let mut codes = self.codes.lock().unwrap();
        let mut superseded = 0;
        for existing in codes.values_mut() {
            if existing.email == code.email && existing.status == VerificationCodeStatus::Active {
                existing.transition(VerificationCodeStatus::Inactive, code.created_at);
                superseded += 1;
            }
        }
        codes.insert(code.id, code);
        Ok(superseded)
    }

    async fn find_expired_active(&self, now: DateTime<Utc>) -> Result<Vec<VerificationCode>, DomainError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.status == VerificationCodeStatus::Active && c.expires_at < now)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct TokenStore {
    tokens: Mutex<HashMap<Uuid, RefreshToken>>,
}

#[async_trait]
impl RefreshTokenRepository for TokenStore {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        self.tokens.lock().unwrap().insert(token.token_id, token.clone());
        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DomainError> {
        Ok(self.tokens.lock().unwrap().values().find(|t| t.token == token).cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Vec<RefreshToken>, DomainError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.email == email && t.is_active())
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        token_id: Uuid,
        status: RefreshTokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.get_mut(&token_id) {
            Some(token) => {
                token.status = status;
                token.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn compare_and_set_status(
        &self,
        token_id: Uuid,
        expected: RefreshTokenStatus,
        new: RefreshTokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.get_mut(&token_id) {
            Some(token) if token.status == expected => {
                token.status = new;
                token.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_expired_active(&self, now: DateTime<Utc>) -> Result<Vec<RefreshToken>, DomainError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.is_active() && t.expiry_date < now)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct AccountStore {
    accounts: Mutex<HashMap<String, Account>>,
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.lock().unwrap().get(email).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.email.clone(), account.clone());
        Ok(account)
    }
}

/// Keeps the last code mailed to each recipient
#[derive(Default)]
struct Inbox {
    last_code: Mutex<HashMap<String, String>>,
}

impl Inbox {
    fn code_for(&self, to: &str) -> String {
        self.last_code.lock().unwrap().get(to).cloned().expect("no email received")
    }
}

#[async_trait]
impl EmailServiceTrait for Inbox {
    async fn send_email(&self, to: &str, _subject: &str, body: &str) -> Result<(), String> {
        let code = body
            .lines()
            .find_map(|line| line.strip_prefix("Your verification code is: "))
            .ok_or_else(|| "missing code".to_string())?;
        self.last_code.lock().unwrap().insert(to.to_string(), code.trim().to_string());
        Ok(())
    }
}

struct Harness {
    auth: AuthService<CodeStore, Inbox, TokenStore, AccountStore>,
    inbox: Arc<Inbox>,
    clock: Arc<ManualClock>,
    accounts: Arc<AccountStore>,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::default());
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let inbox = Arc::new(Inbox::default());
    let accounts = Arc::new(AccountStore::default());
    let io_timeout = StdDuration::from_secs(5);

    let verification = Arc::new(VerificationService::new(
        Arc::new(CodeStore::default()),
        inbox.clone(),
        Arc::new(InMemoryLockoutGuard::new(LockoutPolicy::default())),
        dyn_clock.clone(),
        VerificationServiceConfig::default(),
    ));

    let signer = TokenSigner::new(
        TokenSignerConfig {
            jwt_secret: "integration-test-secret-with-enough-bytes".to_string(),
            ..TokenSignerConfig::default()
        },
        dyn_clock.clone(),
    )
    .unwrap();

    let tokens = Arc::new(RefreshTokenService::new(
        Arc::new(TokenStore::default()),
        accounts.clone(),
        Arc::new(signer),
        dyn_clock.clone(),
        io_timeout,
    ));

    Harness {
        auth: AuthService::new(verification, tokens, accounts.clone(), dyn_clock, io_timeout),
        inbox,
        clock,
        accounts,
    }
}

#[tokio::test]
async fn test_login_refresh_and_replay() {
    let h = harness();
    let email = "flow@example.com";

    let sent = h.auth.send_verification_code(email).await.unwrap();
    assert!(sent.success);

    let code = h.inbox.code_for(email);
    let pair = h.auth.verify_code(email, &code).await.unwrap();
    assert!(h.accounts.find_by_email(email).await.unwrap().is_some());

    // The code is single-use
    let reused = h.auth.verify_code(email, &code).await.unwrap_err();
    assert_eq!(reused.as_auth_error(), Some(&AuthError::InvalidVerificationCode));

    h.clock.advance(Duration::minutes(1));
    let rotated = h.auth.refresh_token(&pair.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);

    let replay = h.auth.refresh_token(&pair.refresh_token).await.unwrap_err();
    assert_eq!(replay.as_token_error(), Some(&TokenError::Blacklisted));

    let report = h.auth.revoke_all_for_identity(email).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.revoked, 1);

    let after_revoke = h.auth.refresh_token(&rotated.refresh_token).await.unwrap_err();
    assert_eq!(after_revoke.as_token_error(), Some(&TokenError::Blacklisted));
}

#[tokio::test]
async fn test_resend_is_rate_limited() {
    let h = harness();
    let email = "resend@example.com";

    h.auth.send_verification_code(email).await.unwrap();
    let first_code = h.inbox.code_for(email);

    h.clock.advance(Duration::minutes(4));
    let err = h.auth.send_verification_code(email).await.unwrap_err();
    assert!(matches!(
        err.as_auth_error(),
        Some(AuthError::RateLimited { retry_after_seconds: 60 })
    ));

    // The original code still works
    assert!(h.auth.verify_code(email, &first_code).await.is_ok());
}

#[tokio::test]
async fn test_lockout_refuses_correct_code() {
    let h = harness();
    let email = "locked@example.com";

    h.auth.send_verification_code(email).await.unwrap();
    let code = h.inbox.code_for(email);
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for _ in 0..5 {
        assert!(h.auth.verify_code(email, wrong).await.is_err());
    }

    let locked = h.auth.verify_code(email, &code).await.unwrap_err();
    assert_eq!(locked.as_auth_error(), Some(&AuthError::InvalidVerificationCode));
    assert!(h.accounts.find_by_email(email).await.unwrap().is_none());
}
