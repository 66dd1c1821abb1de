use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinic_core::{AppResult, ClinicId, UserId};
use clinic_domain::{Clinic, UserAccount};

/// User account together with its stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Account profile.
    pub account: UserAccount,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Repository port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by normalized email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Lists all accounts ordered by email.
    async fn list_users(&self) -> AppResult<Vec<UserAccount>>;

    /// Stores a new account. Fails with a conflict when the email is taken.
    async fn create_user(&self, account: UserAccount, password_hash: &str) -> AppResult<()>;

    /// Replaces profile fields of an existing account.
    async fn update_user(&self, account: UserAccount) -> AppResult<()>;

    /// Replaces the stored password hash.
    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()>;
}

/// Repository port for clinics.
#[async_trait]
pub trait ClinicRepository: Send + Sync {
    /// Lists all clinics ordered by name.
    async fn list_clinics(&self) -> AppResult<Vec<Clinic>>;

    /// Finds a clinic by identifier.
    async fn find_clinic(&self, clinic_id: ClinicId) -> AppResult<Option<Clinic>>;

    /// Stores a new clinic. Fails with a conflict when the code is taken.
    async fn create_clinic(&self, clinic: Clinic) -> AppResult<()>;

    /// Replaces an existing clinic.
    async fn update_clinic(&self, clinic: Clinic) -> AppResult<()>;
}

/// Port for password hashing. Keeps the application free of direct
/// cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Signed bearer token handed out at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token value.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Port for issuing and verifying bearer tokens.
pub trait TokenCodec: Send + Sync {
    /// Issues a token for the user.
    fn issue(&self, user_id: UserId) -> AppResult<IssuedToken>;

    /// Verifies signature and expiry and returns the token subject.
    fn verify(&self, token: &str) -> AppResult<UserId>;
}
