//! Platform user administration and bootstrap admin provisioning.

use std::sync::Arc;

use clinic_core::{AppError, AppResult, GlobalRole, Principal, UserId};
use clinic_domain::{AuditAction, EmailAddress, UserAccount, validate_password};
use tracing::info;

use crate::{AuditEvent, AuditRepository, PasswordHasher, UserRepository};

/// Input for creating a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Login email.
    pub email: String,
    /// Plaintext password, validated then hashed.
    pub password: String,
    /// Display name.
    pub display_name: String,
    /// Platform-wide role.
    pub global_role: GlobalRole,
}

/// Input for updating a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// Display name.
    pub display_name: String,
    /// Platform-wide role.
    pub global_role: GlobalRole,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Optional new password.
    pub password: Option<String>,
}

/// Application service for user accounts.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            audit_repository,
        }
    }

    /// Lists all accounts.
    pub async fn list_users(&self) -> AppResult<Vec<UserAccount>> {
        self.user_repository.list_users().await
    }

    /// Creates an account. Accounts are platform-wide, so only
    /// administrators may create them.
    pub async fn create_user(
        &self,
        actor: &Principal,
        input: CreateUserInput,
    ) -> AppResult<UserAccount> {
        ensure_admin(actor)?;
        let account = UserAccount::new(input.email, input.display_name, input.global_role)?;
        validate_password(&input.password)?;

        let password_hash = self.password_hasher.hash_password(&input.password)?;
        self.user_repository
            .create_user(account.clone(), password_hash.as_str())
            .await?;
        self.audit(actor.user_id(), AuditAction::UserCreated, &account)
            .await?;

        Ok(account)
    }

    /// Updates profile, role, active flag and optionally the password.
    pub async fn update_user(
        &self,
        actor: &Principal,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<UserAccount> {
        ensure_admin(actor)?;
        let current = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

        if let Some(password) = input.password.as_deref() {
            validate_password(password)?;
            let password_hash = self.password_hasher.hash_password(password)?;
            self.user_repository
                .update_password(user_id, password_hash.as_str())
                .await?;
        }

        let account =
            current
                .account
                .updated(input.display_name, input.global_role, input.is_active)?;
        self.user_repository.update_user(account.clone()).await?;
        self.audit(actor.user_id(), AuditAction::UserUpdated, &account)
            .await?;

        Ok(account)
    }

    /// Creates the bootstrap administrator when the email is unknown.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_bootstrap_admin(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AppResult<bool> {
        let email_address = EmailAddress::new(email)?;
        if self
            .user_repository
            .find_by_email(email_address.as_str())
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let account = UserAccount::new(email_address, display_name, GlobalRole::Admin)?;
        validate_password(password)?;
        let password_hash = self.password_hasher.hash_password(password)?;
        self.user_repository
            .create_user(account.clone(), password_hash.as_str())
            .await?;
        self.audit(account.user_id(), AuditAction::UserCreated, &account)
            .await?;

        info!(email = account.email().as_str(), "bootstrap administrator created");
        Ok(true)
    }

    async fn audit(
        &self,
        actor: UserId,
        action: AuditAction,
        account: &UserAccount,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                clinic_id: None,
                actor,
                action,
                resource_type: "user".to_owned(),
                resource_id: account.user_id().to_string(),
                detail: Some(format!(
                    "email={} role={}",
                    account.email().as_str(),
                    account.global_role()
                )),
            })
            .await
    }
}

fn ensure_admin(actor: &Principal) -> AppResult<()> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden(
            "only administrators may manage user accounts".to_owned(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clinic_core::{AppError, GlobalRole, Principal, UserId};

    use crate::UserRepository;
    use crate::test_support::{FakeAuditRepository, FakePasswordHasher, FakeUserRepository};

    use super::{CreateUserInput, UpdateUserInput, UserService};

    fn service(users: Arc<FakeUserRepository>) -> UserService {
        UserService::new(
            users,
            Arc::new(FakePasswordHasher),
            Arc::new(FakeAuditRepository::default()),
        )
    }

    fn input(email: &str, global_role: GlobalRole) -> CreateUserInput {
        CreateUserInput {
            email: email.to_owned(),
            password: "long-enough-passphrase".to_owned(),
            display_name: "Someone".to_owned(),
            global_role,
        }
    }

    #[tokio::test]
    async fn only_admin_can_create_accounts() {
        let service = service(Arc::new(FakeUserRepository::default()));
        let manager = Principal::new(UserId::new(), "M", "m@clinic.org", GlobalRole::Staff);
        let admin = Principal::new(UserId::new(), "A", "a@clinic.org", GlobalRole::Admin);

        for role in [GlobalRole::Admin, GlobalRole::Nurse] {
            assert!(matches!(
                service
                    .create_user(&manager, input("x@clinic.org", role))
                    .await,
                Err(AppError::Forbidden(_))
            ));
        }
        assert!(
            service
                .create_user(&admin, input("x@clinic.org", GlobalRole::Admin))
                .await
                .is_ok()
        );
        assert!(matches!(
            service
                .create_user(&admin, input("X@clinic.org", GlobalRole::Doctor))
                .await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn weak_password_is_rejected() {
        let service = service(Arc::new(FakeUserRepository::default()));
        let admin = Principal::new(UserId::new(), "A", "a@clinic.org", GlobalRole::Admin);
        let mut weak = input("y@clinic.org", GlobalRole::Nurse);
        weak.password = "short".to_owned();

        assert!(matches!(
            service.create_user(&admin, weak).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_changes_role_and_password() {
        let users = Arc::new(FakeUserRepository::default());
        let service = service(users.clone());
        let admin = Principal::new(UserId::new(), "A", "a@clinic.org", GlobalRole::Admin);
        let created = service
            .create_user(&admin, input("n@clinic.org", GlobalRole::Nurse))
            .await
            .unwrap_or_else(|_| panic!("created"));

        let updated = service
            .update_user(
                &admin,
                created.user_id(),
                UpdateUserInput {
                    display_name: "Nurse N".to_owned(),
                    global_role: GlobalRole::Doctor,
                    is_active: true,
                    password: Some("another-long-passphrase".to_owned()),
                },
            )
            .await
            .unwrap_or_else(|_| panic!("updated"));
        assert_eq!(updated.global_role(), GlobalRole::Doctor);

        let stored = users
            .find_by_id(created.user_id())
            .await
            .unwrap_or_default()
            .unwrap_or_else(|| panic!("stored"));
        assert_eq!(stored.password_hash, "hashed:another-long-passphrase");
    }

    #[tokio::test]
    async fn non_admin_cannot_reset_another_account() {
        let users = Arc::new(FakeUserRepository::default());
        let service = service(users.clone());
        let admin = Principal::new(UserId::new(), "A", "a@clinic.org", GlobalRole::Admin);
        let manager = Principal::new(UserId::new(), "M", "m@clinic.org", GlobalRole::Staff);
        let created = service
            .create_user(&admin, input("d@clinic.org", GlobalRole::Doctor))
            .await
            .unwrap_or_else(|_| panic!("created"));

        let result = service
            .update_user(
                &manager,
                created.user_id(),
                UpdateUserInput {
                    display_name: "Taken Over".to_owned(),
                    global_role: GlobalRole::Doctor,
                    is_active: true,
                    password: Some("attacker-chosen-passphrase".to_owned()),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let stored = users
            .find_by_id(created.user_id())
            .await
            .unwrap_or_default()
            .unwrap_or_else(|| panic!("stored"));
        assert_eq!(stored.password_hash, "hashed:long-enough-passphrase");
        assert_eq!(stored.account.display_name().as_str(), "Someone");
    }

    #[tokio::test]
    async fn bootstrap_admin_is_created_once() {
        let service = service(Arc::new(FakeUserRepository::default()));

        let first = service
            .ensure_bootstrap_admin("root@clinic.org", "bootstrap-passphrase", "Root")
            .await;
        let second = service
            .ensure_bootstrap_admin("ROOT@clinic.org", "bootstrap-passphrase", "Root")
            .await;
        assert!(first.is_ok_and(|created| created));
        assert!(second.is_ok_and(|created| !created));
    }
}
