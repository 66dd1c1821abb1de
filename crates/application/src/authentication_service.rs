//! Login and bearer-token authentication.
//!
//! Every failure collapses into one generic `Unauthorized` error so callers
//! cannot tell unknown accounts from wrong passwords.

use std::sync::Arc;

use clinic_core::{AppError, AppResult, Principal};
use clinic_domain::EmailAddress;
use tracing::debug;

use crate::{IssuedToken, PasswordHasher, TokenCodec, UserRepository};

/// Message used for every authentication failure.
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Successful login result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Principal that signed in, without clinic context.
    pub principal: Principal,
    /// Bearer token for subsequent requests.
    pub token: IssuedToken,
}

/// Application service resolving credentials into principals.
#[derive(Clone)]
pub struct AuthenticationService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_codec: Arc<dyn TokenCodec>,
}

impl AuthenticationService {
    /// Creates a new authentication service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_codec: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            token_codec,
        }
    }

    /// Verifies email and password and issues a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let Ok(email) = EmailAddress::new(email) else {
            return Err(unauthorized());
        };

        let user = self.user_repository.find_by_email(email.as_str()).await?;
        let Some(user) = user else {
            // Hash anyway so unknown emails cost the same as wrong passwords.
            let _ = self.password_hasher.hash_password(password);
            return Err(unauthorized());
        };

        let password_valid = self
            .password_hasher
            .verify_password(password, user.password_hash.as_str())?;
        if !password_valid || !user.account.is_active() {
            debug!(user_id = %user.account.user_id(), "login rejected");
            return Err(unauthorized());
        }

        let token = self.token_codec.issue(user.account.user_id())?;
        let account = user.account;

        Ok(LoginOutcome {
            principal: Principal::new(
                account.user_id(),
                account.display_name().as_str(),
                account.email().as_str(),
                account.global_role(),
            ),
            token,
        })
    }

    /// Resolves a bearer token into an active principal.
    pub async fn authenticate(&self, token: &str) -> AppResult<Principal> {
        let user_id = self.token_codec.verify(token).map_err(|error| {
            debug!(error = %error, "bearer token rejected");
            unauthorized()
        })?;

        let user = self.user_repository.find_by_id(user_id).await?;
        let Some(user) = user.filter(|user| user.account.is_active()) else {
            debug!(user_id = %user_id, "token subject is missing or inactive");
            return Err(unauthorized());
        };

        let account = user.account;
        Ok(Principal::new(
            account.user_id(),
            account.display_name().as_str(),
            account.email().as_str(),
            account.global_role(),
        ))
    }
}

fn unauthorized() -> AppError {
    AppError::Unauthorized(AUTHENTICATION_REQUIRED.to_owned())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clinic_core::{AppError, GlobalRole, UserId};
    use clinic_domain::UserAccount;

    use crate::test_support::{FakePasswordHasher, FakeTokenCodec, FakeUserRepository};

    use super::AuthenticationService;

    fn service(accounts: Vec<(UserAccount, &str)>) -> AuthenticationService {
        AuthenticationService::new(
            Arc::new(FakeUserRepository::with_users(accounts)),
            Arc::new(FakePasswordHasher),
            Arc::new(FakeTokenCodec),
        )
    }

    fn account(email: &str, active: bool) -> UserAccount {
        UserAccount::new(email, "Dana", GlobalRole::Doctor)
            .and_then(|account| account.updated("Dana", GlobalRole::Doctor, active))
            .unwrap_or_else(|_| panic!("valid account"))
    }

    #[tokio::test]
    async fn login_then_authenticate_roundtrips_principal() {
        let doctor = account("dana@clinic.org", true);
        let service = service(vec![(doctor.clone(), "correct horse battery")]);

        let outcome = service
            .login("DANA@clinic.org", "correct horse battery")
            .await
            .unwrap_or_else(|_| panic!("login succeeds"));
        assert_eq!(outcome.principal.user_id(), doctor.user_id());

        let principal = service
            .authenticate(outcome.token.token.as_str())
            .await
            .unwrap_or_else(|_| panic!("token accepted"));
        assert_eq!(principal.global_role(), GlobalRole::Doctor);
        assert_eq!(principal.clinic_id(), None);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_identically() {
        let service = service(vec![(account("dana@clinic.org", true), "correct horse battery")]);

        let wrong_password = service.login("dana@clinic.org", "nope").await;
        let unknown_email = service.login("ghost@clinic.org", "nope").await;
        let message = |result: Result<_, AppError>| match result {
            Err(AppError::Unauthorized(message)) => message,
            _ => String::new(),
        };
        assert_eq!(message(wrong_password), "Authentication required");
        assert_eq!(message(unknown_email), "Authentication required");
    }

    #[tokio::test]
    async fn inactive_user_cannot_login_or_authenticate() {
        let inactive = account("old@clinic.org", false);
        let service = service(vec![(inactive.clone(), "correct horse battery")]);

        assert!(
            service
                .login("old@clinic.org", "correct horse battery")
                .await
                .is_err()
        );
        let token = format!("token:{}", inactive.user_id());
        assert!(matches!(
            service.authenticate(token.as_str()).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn token_for_unknown_user_is_rejected() {
        let service = service(Vec::new());
        let token = format!("token:{}", UserId::new());
        assert!(matches!(
            service.authenticate(token.as_str()).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.authenticate("garbage").await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
