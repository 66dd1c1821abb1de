//! Domain entities and invariants of the clinic access-control core.

#![forbid(unsafe_code)]

mod audit;
mod clinic;
mod data_filter;
mod membership;
mod permission;
mod record;
mod role;
mod system_roles;
mod user;

pub use audit::AuditAction;
pub use clinic::{Clinic, ClinicCode};
pub use data_filter::{AssignmentField, DataFilter, PatientScope, role_based_filter};
pub use membership::ClinicMembership;
pub use permission::{Permission, PermissionAction, Resource};
pub use record::{CLINIC_REFERENCE_KEY, ClinicRecord, RecordPayload};
pub use role::{
    EffectivePermissions, PermissionGrant, ROLE_NAME_MAX_LENGTH, RoleDefinition, RoleGraph,
    validate_role_name,
};
pub use system_roles::{CLINIC_ADMIN_ROLE, STAFF_ROLE, system_roles};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserAccount, validate_password,
};
