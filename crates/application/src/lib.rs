//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod authentication_service;
mod authorization_service;
mod clinic_service;
mod directory_ports;
mod membership_service;
mod permission_input;
mod record_ports;
mod record_service;
mod role_service;
mod settings_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use access_ports::{AuditEvent, AuditRepository, MembershipRepository, RoleRepository};
pub use authentication_service::{AUTHENTICATION_REQUIRED, AuthenticationService, LoginOutcome};
pub use authorization_service::AuthorizationService;
pub use clinic_service::ClinicService;
pub use directory_ports::{
    ClinicRepository, IssuedToken, PasswordHasher, TokenCodec, UserRecord, UserRepository,
};
pub use membership_service::{MembershipService, StaffAssignmentInput, StaffMember};
pub use permission_input::{GrantInput, parse_grants, parse_permission_names};
pub use record_ports::{RecordRepository, SettingsRepository};
pub use record_service::{RecordService, RecordUpdateMode};
pub use role_service::{CreateRoleInput, RoleService, RoleView};
pub use settings_service::SettingsService;
pub use user_service::{CreateUserInput, UpdateUserInput, UserService};
