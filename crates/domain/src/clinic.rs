use clinic_core::{AppError, AppResult, ClinicId, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Unique, URL-safe clinic code such as `north-branch`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClinicCode(String);

impl ClinicCode {
    /// Validates and normalizes a clinic code to lower case.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_lowercase();
        let valid_chars = value
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '-');

        if !(2..=32).contains(&value.len())
            || !valid_chars
            || value.starts_with('-')
            || value.ends_with('-')
        {
            return Err(AppError::Validation(format!(
                "clinic code '{value}' must be 2-32 characters of letters, digits and inner hyphens"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Tenant boundary entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clinic {
    clinic_id: ClinicId,
    name: NonEmptyString,
    code: ClinicCode,
    is_active: bool,
}

impl Clinic {
    /// Creates a new active clinic.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            clinic_id: ClinicId::new(),
            name: NonEmptyString::new(name)?,
            code: ClinicCode::new(code)?,
            is_active: true,
        })
    }

    /// Rebuilds a clinic loaded from storage.
    pub fn from_storage(
        clinic_id: ClinicId,
        name: String,
        code: String,
        is_active: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            clinic_id,
            name: NonEmptyString::new(name)?,
            code: ClinicCode::new(code)?,
            is_active,
        })
    }

    /// Returns a copy with a new name and active flag; the code is immutable.
    pub fn updated(mut self, name: impl Into<String>, is_active: bool) -> AppResult<Self> {
        self.name = NonEmptyString::new(name)?;
        self.is_active = is_active;
        Ok(self)
    }

    /// Returns the clinic identifier.
    #[must_use]
    pub fn clinic_id(&self) -> ClinicId {
        self.clinic_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the unique code.
    #[must_use]
    pub fn code(&self) -> &ClinicCode {
        &self.code
    }

    /// Returns whether the clinic accepts activity.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::{Clinic, ClinicCode};

    #[test]
    fn clinic_code_is_normalized() {
        let code = ClinicCode::new(" North-Branch ");
        assert_eq!(code.map(|code| code.as_str().to_owned()).ok(), Some("north-branch".to_owned()));
    }

    #[test]
    fn clinic_code_rejects_edge_hyphens_and_symbols() {
        assert!(ClinicCode::new("-north").is_err());
        assert!(ClinicCode::new("north_branch").is_err());
        assert!(ClinicCode::new("n").is_err());
    }

    #[test]
    fn clinic_update_keeps_identity_and_code() {
        let clinic = Clinic::new("North", "north").unwrap_or_else(|_| panic!("valid clinic"));
        let clinic_id = clinic.clinic_id();
        let updated = clinic
            .updated("North Branch", false)
            .unwrap_or_else(|_| panic!("valid update"));
        assert_eq!(updated.clinic_id(), clinic_id);
        assert_eq!(updated.code().as_str(), "north");
        assert!(!updated.is_active());
    }
}
