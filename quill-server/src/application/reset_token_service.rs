use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::User;
use crate::infrastructure::clock::Clock;
use crate::infrastructure::reset_token::{ResetClaims, ResetTokenSigner};

/// Stateless password-reset tokens.
///
/// A token is accepted while its signature verifies against the current secret
/// and `now - issued_at <= ttl`. Nothing is stored server-side, so a password
/// change does not revoke tokens that are still within their TTL.
pub(crate) struct PasswordResetTokenService<R: UserRepository> {
    users: R,
    signer: ResetTokenSigner,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<R: UserRepository> PasswordResetTokenService<R> {
    pub(crate) const DEFAULT_TTL_SECONDS: i64 = 1800;
    pub(crate) const MAX_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
    // tolerated clock drift between the issuing and the verifying instance
    const ISSUED_AT_LEEWAY_SECONDS: i64 = 10;

    pub(crate) fn new(
        users: R,
        signer: ResetTokenSigner,
        clock: Arc<dyn Clock>,
        ttl_seconds: i64,
    ) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds.min(Self::MAX_TTL_SECONDS)
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        Self {
            users,
            signer,
            clock,
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn issue(&self, user_id: i64) -> Result<String, DomainError> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    pub(crate) fn issue_with_ttl(&self, user_id: i64, ttl: Duration) -> Result<String, DomainError> {
        if ttl <= Duration::zero() {
            return Err(DomainError::Validation {
                field: "ttl",
                message: "must be > 0",
            });
        }

        let claims =
            ResetClaims::new(user_id, self.clock.now(), ttl).ok_or(DomainError::Validation {
                field: "ttl",
                message: "is too large",
            })?;
        self.signer
            .sign(&claims)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    /// Resolves the user a token was issued for. Malformed, forged, expired and
    /// orphaned tokens all come back as `Ok(None)`; only a storage failure
    /// during the user lookup is an error.
    pub(crate) async fn verify(&self, token: &str) -> Result<Option<User>, DomainError> {
        let Some(user_id) = self.verify_claims(token) else {
            return Ok(None);
        };

        let user = self.users.find_by_id(user_id).await?;
        if user.is_none() {
            debug!(user_id, "reset token rejected: user no longer exists");
        }
        Ok(user)
    }

    fn verify_claims(&self, token: &str) -> Option<i64> {
        let claims = match self.signer.decode(token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "reset token rejected");
                return None;
            }
        };

        let ttl = claims.ttl_seconds();
        let elapsed = self.clock.now().timestamp() - claims.iat;

        if ttl <= 0 || elapsed < -Self::ISSUED_AT_LEEWAY_SECONDS || elapsed > ttl {
            debug!(
                user_id = claims.user_id,
                elapsed, ttl, "reset token rejected: outside its lifetime"
            );
            return None;
        }

        Some(claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::PasswordResetTokenService;
    use crate::data::user_repository::{AccountPatch, NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::User;
    use crate::infrastructure::clock::Clock;
    use crate::infrastructure::reset_token::ResetTokenSigner;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[derive(Clone)]
    struct ManualClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        fn at(seconds: i64) -> Self {
            Self {
                now: Arc::new(Mutex::new(
                    Utc.timestamp_opt(seconds, 0).single().expect("valid ts"),
                )),
            }
        }

        fn advance(&self, by: Duration) {
            *self.now.lock().expect("clock mutex poisoned") += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("clock mutex poisoned")
        }
    }

    #[derive(Clone, Default)]
    struct FakeUserRepo {
        users: Arc<Mutex<HashMap<i64, User>>>,
        fail_lookup: Arc<Mutex<bool>>,
    }

    impl FakeUserRepo {
        fn insert(&self, id: i64) {
            let user = User::new(
                id,
                format!("user_{id}"),
                format!("user{id}@example.com"),
                "",
                Utc::now(),
            )
            .expect("sample user must be valid");
            self.users
                .lock()
                .expect("users mutex poisoned")
                .insert(id, user);
        }

        fn remove(&self, id: i64) {
            self.users
                .lock()
                .expect("users mutex poisoned")
                .remove(&id);
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, _input: NewUser) -> Result<User, DomainError> {
            Err(DomainError::Unexpected("not used".to_string()))
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
            if *self.fail_lookup.lock().expect("fail mutex poisoned") {
                return Err(DomainError::Unexpected("db down".to_string()));
            }
            Ok(self
                .users
                .lock()
                .expect("users mutex poisoned")
                .get(&id)
                .cloned())
        }

        async fn find_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(None)
        }

        async fn update_account(
            &self,
            _id: i64,
            _patch: AccountPatch,
        ) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn update_password(
            &self,
            _id: i64,
            _password_hash: &str,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    fn service(
        repo: FakeUserRepo,
        clock: ManualClock,
        ttl_seconds: i64,
    ) -> PasswordResetTokenService<FakeUserRepo> {
        PasswordResetTokenService::new(
            repo,
            ResetTokenSigner::new(SECRET),
            Arc::new(clock),
            ttl_seconds,
        )
    }

    #[tokio::test]
    async fn issued_token_verifies_to_its_user() {
        let repo = FakeUserRepo::default();
        repo.insert(7);
        let service = service(repo, ManualClock::at(1_700_000_000), 1800);

        let token = service.issue(7).expect("token must be issued");
        let user = service
            .verify(&token)
            .await
            .expect("verify must not fail")
            .expect("user must resolve");

        assert_eq!(user.id, 7);
    }

    #[tokio::test]
    async fn token_is_accepted_up_to_ttl_and_rejected_after() {
        let repo = FakeUserRepo::default();
        repo.insert(7);
        let clock = ManualClock::at(1_700_000_000);
        let service = service(repo, clock.clone(), 1800);
        let token = service.issue(7).expect("token must be issued");

        clock.advance(Duration::seconds(1800));
        assert!(
            service
                .verify(&token)
                .await
                .expect("verify must not fail")
                .is_some()
        );

        clock.advance(Duration::seconds(1));
        assert!(
            service
                .verify(&token)
                .await
                .expect("verify must not fail")
                .is_none()
        );
    }

    #[tokio::test]
    async fn garbage_token_yields_no_user() {
        let repo = FakeUserRepo::default();
        repo.insert(7);
        let service = service(repo, ManualClock::at(1_700_000_000), 1800);

        for token in ["garbage-string", "", "a.b.c", "...."] {
            let result = service.verify(token).await.expect("verify must not fail");
            assert!(result.is_none(), "token {token:?} must be rejected");
        }
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_yields_no_user() {
        let repo = FakeUserRepo::default();
        repo.insert(7);
        let clock = ManualClock::at(1_700_000_000);
        let other = PasswordResetTokenService::new(
            repo.clone(),
            ResetTokenSigner::new("fedcba9876543210fedcba9876543210"),
            Arc::new(clock.clone()),
            1800,
        );
        let service = service(repo, clock, 1800);

        let token = other.issue(7).expect("token must be issued");
        assert!(
            service
                .verify(&token)
                .await
                .expect("verify must not fail")
                .is_none()
        );
    }

    #[tokio::test]
    async fn token_for_deleted_user_yields_no_user() {
        let repo = FakeUserRepo::default();
        repo.insert(7);
        let service = service(repo.clone(), ManualClock::at(1_700_000_000), 1800);

        let token = service.issue(7).expect("token must be issued");
        repo.remove(7);

        assert!(
            service
                .verify(&token)
                .await
                .expect("verify must not fail")
                .is_none()
        );
    }

    #[tokio::test]
    async fn token_from_the_future_is_rejected() {
        let repo = FakeUserRepo::default();
        repo.insert(7);
        let clock = ManualClock::at(1_700_000_000);
        let service = service(repo, clock.clone(), 1800);

        let token = service.issue(7).expect("token must be issued");
        clock.advance(Duration::seconds(-60));

        assert!(
            service
                .verify(&token)
                .await
                .expect("verify must not fail")
                .is_none()
        );
    }

    #[tokio::test]
    async fn storage_failure_during_lookup_is_an_error() {
        let repo = FakeUserRepo::default();
        repo.insert(7);
        let service = service(repo.clone(), ManualClock::at(1_700_000_000), 1800);
        let token = service.issue(7).expect("token must be issued");

        *repo.fail_lookup.lock().expect("fail mutex poisoned") = true;

        let err = service
            .verify(&token)
            .await
            .expect_err("storage failure must surface");
        assert!(matches!(err, DomainError::Unexpected(_)));
    }

    #[tokio::test]
    async fn non_positive_ttl_is_rejected_on_issue() {
        let service = service(FakeUserRepo::default(), ManualClock::at(1_700_000_000), 1800);
        assert!(service.issue_with_ttl(7, Duration::zero()).is_err());
    }

    #[tokio::test]
    async fn out_of_range_ttl_is_rejected_on_issue() {
        let service = service(FakeUserRepo::default(), ManualClock::at(1_700_000_000), 1800);

        let err = service
            .issue_with_ttl(7, Duration::seconds(10_000_000_000_000))
            .expect_err("ttl past representable time must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "ttl", .. }));
    }

    #[tokio::test]
    async fn oversized_configured_ttl_is_capped() {
        let service = service(
            FakeUserRepo::default(),
            ManualClock::at(1_700_000_000),
            i64::MAX,
        );
        assert_eq!(
            service.ttl(),
            Duration::seconds(PasswordResetTokenService::<FakeUserRepo>::MAX_TTL_SECONDS)
        );
        assert!(service.issue(7).is_ok());
    }

    #[tokio::test]
    async fn non_positive_configured_ttl_falls_back_to_default() {
        let service = service(FakeUserRepo::default(), ManualClock::at(1_700_000_000), 0);
        assert_eq!(service.ttl(), Duration::seconds(1800));
    }

    #[tokio::test]
    async fn random_ids_and_ttls_round_trip() {
        let repo = FakeUserRepo::default();
        let service = service(repo.clone(), ManualClock::at(1_700_000_000), 1800);

        for _ in 0..100 {
            let user_id = i64::from(rand::random::<u32>() % 1_000_000) + 1;
            let ttl = Duration::seconds(i64::from(rand::random::<u32>() % 86_400) + 1);
            repo.insert(user_id);

            let token = service
                .issue_with_ttl(user_id, ttl)
                .expect("token must be issued");
            let user = service
                .verify(&token)
                .await
                .expect("verify must not fail")
                .expect("user must resolve");

            assert_eq!(user.id, user_id);
        }
    }
}
