use std::fmt::{Display, Formatter};
use std::str::FromStr;

use clinic_core::AppError;
use serde::{Deserialize, Serialize};

/// Resource families guarded by clinic permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Patient charts.
    Patients,
    /// Appointment bookings.
    Appointments,
    /// Prescriptions issued by doctors.
    Prescriptions,
    /// Billing invoices.
    Invoices,
    /// Payments recorded against invoices.
    Payments,
    /// Staff payroll entries.
    Payroll,
    /// Laboratory test orders and results.
    LabTests,
    /// X-ray analysis records.
    XrayAnalyses,
    /// Clinical and financial reports.
    Reports,
    /// Stock and consumables.
    Inventory,
    /// Clinic staff memberships.
    Staff,
    /// Role definitions.
    Roles,
    /// Clinic profiles.
    Clinics,
    /// Platform user accounts.
    Users,
    /// Platform settings.
    Settings,
}

impl Resource {
    /// Returns every resource in declaration order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Patients,
            Resource::Appointments,
            Resource::Prescriptions,
            Resource::Invoices,
            Resource::Payments,
            Resource::Payroll,
            Resource::LabTests,
            Resource::XrayAnalyses,
            Resource::Reports,
            Resource::Inventory,
            Resource::Staff,
            Resource::Roles,
            Resource::Clinics,
            Resource::Users,
            Resource::Settings,
        ];

        ALL
    }

    /// Returns the resources stored as generic clinic records.
    #[must_use]
    pub fn record_collections() -> &'static [Self] {
        &Self::all()[..10]
    }

    /// Returns the stable name used as permission prefix.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Appointments => "appointments",
            Self::Prescriptions => "prescriptions",
            Self::Invoices => "invoices",
            Self::Payments => "payments",
            Self::Payroll => "payroll",
            Self::LabTests => "lab_tests",
            Self::XrayAnalyses => "xray_analyses",
            Self::Reports => "reports",
            Self::Inventory => "inventory",
            Self::Staff => "staff",
            Self::Roles => "roles",
            Self::Clinics => "clinics",
            Self::Users => "users",
            Self::Settings => "settings",
        }
    }

    /// Returns the URL path segment that addresses this resource.
    #[must_use]
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::LabTests => "lab-tests",
            Self::XrayAnalyses => "xray-analyses",
            other => other.as_str(),
        }
    }

    /// Resolves a URL path segment back to its resource.
    #[must_use]
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.path_segment() == segment)
    }

    /// Returns whether data of this resource is partitioned by clinic.
    #[must_use]
    pub fn is_clinic_scoped(&self) -> bool {
        !matches!(self, Self::Users | Self::Settings)
    }

    /// Returns whether this resource is backed by the clinic record store.
    #[must_use]
    pub fn is_record_collection(&self) -> bool {
        Self::record_collections().contains(self)
    }

    /// Returns the actions that can be granted on this resource.
    #[must_use]
    pub fn supported_actions(&self) -> &'static [PermissionAction] {
        match self {
            Self::Settings => &[PermissionAction::View, PermissionAction::General],
            _ => &[
                PermissionAction::View,
                PermissionAction::Create,
                PermissionAction::Edit,
                PermissionAction::Delete,
            ],
        }
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource '{value}'")))
    }
}

/// Action half of a permission name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
    /// Read access.
    View,
    /// Create access.
    Create,
    /// Update access.
    Edit,
    /// Delete access.
    Delete,
    /// Coarse write access used by settings.
    General,
}

impl PermissionAction {
    /// Returns the stable action name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::General => "general",
        }
    }
}

impl FromStr for PermissionAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "view" => Ok(Self::View),
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "general" => Ok(Self::General),
            _ => Err(AppError::Validation(format!(
                "unknown permission action '{value}'"
            ))),
        }
    }
}

/// A recognized `<resource>.<action>` permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Permission {
    resource: Resource,
    action: PermissionAction,
}

impl Permission {
    /// Creates a permission, rejecting actions the resource does not support.
    pub fn new(resource: Resource, action: PermissionAction) -> Result<Self, AppError> {
        if !resource.supported_actions().contains(&action) {
            return Err(AppError::Validation(format!(
                "action '{}' is not defined for resource '{}'",
                action.as_str(),
                resource.as_str()
            )));
        }

        Ok(Self { resource, action })
    }

    /// Returns the permission that guards `action` on `resource`.
    ///
    /// Settings writes collapse into the single `settings.general` grant.
    #[must_use]
    pub fn required_for(resource: Resource, action: PermissionAction) -> Self {
        let action = match (resource, action) {
            (Resource::Settings, PermissionAction::View) => PermissionAction::View,
            (Resource::Settings, _) => PermissionAction::General,
            (_, PermissionAction::General) => PermissionAction::Edit,
            (_, action) => action,
        };

        Self { resource, action }
    }

    /// Returns every recognized permission.
    #[must_use]
    pub fn catalog() -> Vec<Self> {
        Resource::all()
            .iter()
            .flat_map(|resource| {
                resource
                    .supported_actions()
                    .iter()
                    .map(|action| Self {
                        resource: *resource,
                        action: *action,
                    })
            })
            .collect()
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }

    /// Returns the resource half.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the action half.
    #[must_use]
    pub fn action(&self) -> PermissionAction {
        self.action
    }

    /// Returns the dotted storage name.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}.{}", self.resource.as_str(), self.action.as_str())
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}.{}",
            self.resource.as_str(),
            self.action.as_str()
        )
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (resource, action) = value
            .split_once('.')
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))?;

        let resource = Resource::from_str(resource)
            .map_err(|_| AppError::Validation(format!("unknown permission value '{value}'")))?;
        let action = PermissionAction::from_str(action)
            .map_err(|_| AppError::Validation(format!("unknown permission value '{value}'")))?;

        Self::new(resource, action)
    }
}
