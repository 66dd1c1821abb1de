//! User account types and credential validation rules.

use clinic_core::{AppError, AppResult, GlobalRole, NonEmptyString, UserId};
use serde::{Deserialize, Serialize};

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs structural validation only: one `@`, non-empty local part and
    /// a domain containing at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let trimmed = value.into().trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@' and a local part".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Minimum password length (NIST SP800-63B, no second factor).
pub const PASSWORD_MIN_LENGTH: usize = 10;

/// Maximum password length; bounds argon2 work per login attempt.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password before hashing.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|entry| *entry == lowered) {
        return Err(AppError::Validation(
            "this password is too common and has appeared in data breaches".to_owned(),
        ));
    }

    Ok(())
}

static COMMON_PASSWORDS: &[&str] = &[
    "1234567890",
    "qwertyuiop",
    "password123",
    "password12",
    "iloveyou12",
    "letmein123",
    "welcome123",
    "admin12345",
    "clinic1234",
    "1q2w3e4r5t",
];

/// Platform user account without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    user_id: UserId,
    email: EmailAddress,
    display_name: NonEmptyString,
    global_role: GlobalRole,
    is_active: bool,
}

impl UserAccount {
    /// Creates a new active account.
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        global_role: GlobalRole,
    ) -> AppResult<Self> {
        Self::from_storage(UserId::new(), email, display_name, global_role, true)
    }

    /// Rebuilds an account loaded from storage.
    pub fn from_storage(
        user_id: UserId,
        email: impl Into<String>,
        display_name: impl Into<String>,
        global_role: GlobalRole,
        is_active: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            user_id,
            email: EmailAddress::new(email)?,
            display_name: NonEmptyString::new(display_name)?,
            global_role,
            is_active,
        })
    }

    /// Returns a copy with updated profile fields; the email is immutable.
    pub fn updated(
        mut self,
        display_name: impl Into<String>,
        global_role: GlobalRole,
        is_active: bool,
    ) -> AppResult<Self> {
        self.display_name = NonEmptyString::new(display_name)?;
        self.global_role = global_role;
        self.is_active = is_active;
        Ok(self)
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the login email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the platform-wide role.
    #[must_use]
    pub fn global_role(&self) -> GlobalRole {
        self.global_role
    }

    /// Returns whether the account may sign in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
