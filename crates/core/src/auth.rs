use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult, ClinicId, UserId};

/// Platform-wide role carried by every user account.
///
/// The global role is independent from the role a user holds inside a
/// particular clinic. Only [`GlobalRole::Admin`] bypasses clinic permission
/// checks; `Doctor` and `Nurse` additionally narrow what patient data a user
/// sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
    /// Platform administrator.
    Admin,
    /// Treating physician.
    Doctor,
    /// Nursing staff.
    Nurse,
    /// Front-desk staff.
    Receptionist,
    /// Billing and payroll staff.
    Accountant,
    /// Laboratory and imaging staff.
    LabTechnician,
    /// Any other clinic employee.
    Staff,
}

impl GlobalRole {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
            Self::Receptionist => "receptionist",
            Self::Accountant => "accountant",
            Self::LabTechnician => "lab_technician",
            Self::Staff => "staff",
        }
    }

    /// Returns whether this is the reserved administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl FromStr for GlobalRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "doctor" => Ok(Self::Doctor),
            "nurse" => Ok(Self::Nurse),
            "receptionist" => Ok(Self::Receptionist),
            "accountant" => Ok(Self::Accountant),
            "lab_technician" => Ok(Self::LabTechnician),
            "staff" => Ok(Self::Staff),
            _ => Err(AppError::Validation(format!(
                "unknown global role '{value}'"
            ))),
        }
    }
}

impl Display for GlobalRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Request-scoped identity resolved by the authentication guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user_id: UserId,
    display_name: String,
    email: String,
    global_role: GlobalRole,
    clinic_id: Option<ClinicId>,
}

impl Principal {
    /// Creates a principal without clinic context.
    #[must_use]
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        email: impl Into<String>,
        global_role: GlobalRole,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email: email.into(),
            global_role,
            clinic_id: None,
        }
    }

    /// Returns the principal bound to the given clinic context.
    #[must_use]
    pub fn with_clinic(mut self, clinic_id: Option<ClinicId>) -> Self {
        self.clinic_id = clinic_id;
        self
    }

    /// Returns the authenticated user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the platform-wide role.
    #[must_use]
    pub fn global_role(&self) -> GlobalRole {
        self.global_role
    }

    /// Returns whether the principal is a platform administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.global_role.is_admin()
    }

    /// Returns the clinic taken from the request context, if any.
    #[must_use]
    pub fn clinic_id(&self) -> Option<ClinicId> {
        self.clinic_id
    }

    /// Returns the clinic context or fails when none was supplied.
    pub fn require_clinic(&self) -> AppResult<ClinicId> {
        self.clinic_id.ok_or(AppError::ClinicContextRequired)
    }
}
