use std::sync::Arc;

use clinic_application::{
    AuthenticationService, AuthorizationService, ClinicService, MembershipService, RecordService,
    RoleService, SettingsService, UserService,
};

use crate::access_map::AccessMap;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub authentication_service: AuthenticationService,
    pub role_service: RoleService,
    pub membership_service: MembershipService,
    pub clinic_service: ClinicService,
    pub user_service: UserService,
    pub settings_service: SettingsService,
    pub record_service: RecordService,
    pub access_map: Arc<AccessMap>,
}
