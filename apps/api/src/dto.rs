mod auth;
mod clinics;
mod common;
mod records;
mod roles;
mod session;
mod staff;
mod users;

pub use auth::{LoginRequest, LoginResponse};
pub use clinics::{ClinicResponse, CreateClinicRequest, UpdateClinicRequest};
pub use common::HealthResponse;
pub use records::RecordResponse;
pub use roles::{
    CreateRoleRequest, PermissionGrantDto, RoleResponse, UpdateRolePermissionsRequest,
};
pub use session::{PrincipalResponse, SelectClinicRequest, SessionClinicResponse, SessionResponse};
pub use staff::{AddStaffRequest, StaffMemberResponse, UpdateStaffRequest};
pub use users::{CreateUserRequest, UpdateUserRequest, UserResponse};
