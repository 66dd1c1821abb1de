use std::sync::Arc;

use clinic_application::{
    AuditRepository, AuthenticationService, AuthorizationService, ClinicRepository,
    ClinicService, MembershipRepository, MembershipService, PasswordHasher, RecordRepository,
    RecordService, RoleRepository, RoleService, SettingsRepository, SettingsService,
    TokenCodec, UserRepository, UserService,
};
use clinic_infrastructure::{
    InMemoryStore, PostgresAuditRepository, PostgresClinicRepository,
    PostgresMembershipRepository, PostgresRecordRepository, PostgresRoleRepository,
    PostgresUserRepository,
};
use sqlx::PgPool;

use crate::access_map::AccessMap;
use crate::state::AppState;

/// Repository ports backing the services.
#[derive(Clone)]
pub struct RepositorySet {
    pub role_repository: Arc<dyn RoleRepository>,
    pub membership_repository: Arc<dyn MembershipRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub clinic_repository: Arc<dyn ClinicRepository>,
    pub record_repository: Arc<dyn RecordRepository>,
    pub settings_repository: Arc<dyn SettingsRepository>,
    pub audit_repository: Arc<dyn AuditRepository>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        let record_repository = Arc::new(PostgresRecordRepository::new(pool.clone()));

        Self {
            role_repository: Arc::new(PostgresRoleRepository::new(pool.clone())),
            membership_repository: Arc::new(PostgresMembershipRepository::new(pool.clone())),
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            clinic_repository: Arc::new(PostgresClinicRepository::new(pool.clone())),
            record_repository: record_repository.clone(),
            settings_repository: record_repository,
            audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        }
    }

    /// Every port served by one shared in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            role_repository: store.clone(),
            membership_repository: store.clone(),
            user_repository: store.clone(),
            clinic_repository: store.clone(),
            record_repository: store.clone(),
            settings_repository: store.clone(),
            audit_repository: store,
        }
    }
}

pub fn build_app_state(
    repositories: RepositorySet,
    password_hasher: Arc<dyn PasswordHasher>,
    token_codec: Arc<dyn TokenCodec>,
    access_map: AccessMap,
) -> AppState {
    let authorization_service = AuthorizationService::new(
        repositories.role_repository.clone(),
        repositories.membership_repository.clone(),
        repositories.clinic_repository.clone(),
    );

    AppState {
        authorization_service,
        authentication_service: AuthenticationService::new(
            repositories.user_repository.clone(),
            password_hasher.clone(),
            token_codec,
        ),
        role_service: RoleService::new(
            repositories.role_repository.clone(),
            repositories.membership_repository.clone(),
            repositories.audit_repository.clone(),
        ),
        membership_service: MembershipService::new(
            repositories.membership_repository.clone(),
            repositories.role_repository,
            repositories.user_repository.clone(),
            repositories.clinic_repository.clone(),
            repositories.audit_repository.clone(),
        ),
        clinic_service: ClinicService::new(
            repositories.clinic_repository,
            repositories.membership_repository,
            repositories.audit_repository.clone(),
        ),
        user_service: UserService::new(
            repositories.user_repository,
            password_hasher,
            repositories.audit_repository.clone(),
        ),
        settings_service: SettingsService::new(
            repositories.settings_repository,
            repositories.audit_repository,
        ),
        record_service: RecordService::new(repositories.record_repository),
        access_map: Arc::new(access_map),
    }
}
