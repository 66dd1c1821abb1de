use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use clinic_core::{AppError, AppResult, ClinicId, UserId};
use clinic_domain::{Clinic, ClinicMembership, ClinicRecord, Resource, RoleDefinition, UserAccount};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    AuditEvent, AuditRepository, ClinicRepository, IssuedToken, MembershipRepository,
    PasswordHasher, RecordRepository, RoleRepository, SettingsRepository, TokenCodec, UserRecord,
    UserRepository,
};

#[derive(Default)]
pub struct FakeAuditRepository {
    pub events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRoleRepository {
    pub roles: Mutex<Vec<RoleDefinition>>,
}

impl FakeRoleRepository {
    pub fn with_roles(roles: Vec<RoleDefinition>) -> Self {
        Self {
            roles: Mutex::new(roles),
        }
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        Ok(self.roles.lock().await.clone())
    }

    async fn find_role(&self, role_name: &str) -> AppResult<Option<RoleDefinition>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.name() == role_name)
            .cloned())
    }

    async fn create_role(&self, role: RoleDefinition) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        if roles.iter().any(|stored| stored.name() == role.name()) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }
        roles.push(role);
        Ok(())
    }

    async fn update_role(&self, role: RoleDefinition) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let stored = roles
            .iter_mut()
            .find(|stored| stored.name() == role.name())
            .ok_or_else(|| AppError::NotFound(format!("role '{}' was not found", role.name())))?;
        *stored = role;
        Ok(())
    }

    async fn delete_role(&self, role_name: &str) -> AppResult<()> {
        self.roles
            .lock()
            .await
            .retain(|role| role.name() != role_name);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMembershipRepository {
    pub memberships: Mutex<Vec<ClinicMembership>>,
}

impl FakeMembershipRepository {
    pub fn with_memberships(memberships: Vec<ClinicMembership>) -> Self {
        Self {
            memberships: Mutex::new(memberships),
        }
    }
}

#[async_trait]
impl MembershipRepository for FakeMembershipRepository {
    async fn find_membership(
        &self,
        user_id: UserId,
        clinic_id: ClinicId,
    ) -> AppResult<Option<ClinicMembership>> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .find(|membership| {
                membership.user_id() == user_id && membership.clinic_id() == clinic_id
            })
            .cloned())
    }

    async fn list_clinic_memberships(
        &self,
        clinic_id: ClinicId,
    ) -> AppResult<Vec<ClinicMembership>> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|membership| membership.clinic_id() == clinic_id)
            .cloned()
            .collect())
    }

    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<ClinicMembership>> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|membership| membership.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn save_membership(&self, membership: ClinicMembership) -> AppResult<()> {
        let mut memberships = self.memberships.lock().await;
        memberships.retain(|stored| {
            stored.user_id() != membership.user_id() || stored.clinic_id() != membership.clinic_id()
        });
        memberships.push(membership);
        Ok(())
    }

    async fn count_active_with_role(&self, role_name: &str) -> AppResult<u64> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|membership| membership.is_active() && membership.role_name() == role_name)
            .count() as u64)
    }
}

#[derive(Default)]
pub struct FakeUserRepository {
    pub users: Mutex<HashMap<UserId, UserRecord>>,
}

impl FakeUserRepository {
    pub fn with_users(users: Vec<(UserAccount, &str)>) -> Self {
        Self {
            users: Mutex::new(
                users
                    .into_iter()
                    .map(|(account, password)| {
                        (
                            account.user_id(),
                            UserRecord {
                                password_hash: format!("hashed:{password}"),
                                account,
                            },
                        )
                    })
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.account.email().as_str() == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<UserAccount>> {
        let mut accounts: Vec<UserAccount> = self
            .users
            .lock()
            .await
            .values()
            .map(|user| user.account.clone())
            .collect();
        accounts.sort_by(|left, right| left.email().as_str().cmp(right.email().as_str()));
        Ok(accounts)
    }

    async fn create_user(&self, account: UserAccount, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.lock().await;
        if users
            .values()
            .any(|user| user.account.email() == account.email())
        {
            return Err(AppError::Conflict("email already registered".to_owned()));
        }
        users.insert(
            account.user_id(),
            UserRecord {
                account,
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(())
    }

    async fn update_user(&self, account: UserAccount) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(&account.user_id())
            .ok_or_else(|| AppError::NotFound("user was not found".to_owned()))?;
        user.account = account;
        Ok(())
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound("user was not found".to_owned()))?;
        user.password_hash = password_hash.to_owned();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeClinicRepository {
    pub clinics: Mutex<Vec<Clinic>>,
}

impl FakeClinicRepository {
    pub fn with_clinics(clinics: Vec<Clinic>) -> Self {
        Self {
            clinics: Mutex::new(clinics),
        }
    }
}

#[async_trait]
impl ClinicRepository for FakeClinicRepository {
    async fn list_clinics(&self) -> AppResult<Vec<Clinic>> {
        Ok(self.clinics.lock().await.clone())
    }

    async fn find_clinic(&self, clinic_id: ClinicId) -> AppResult<Option<Clinic>> {
        Ok(self
            .clinics
            .lock()
            .await
            .iter()
            .find(|clinic| clinic.clinic_id() == clinic_id)
            .cloned())
    }

    async fn create_clinic(&self, clinic: Clinic) -> AppResult<()> {
        let mut clinics = self.clinics.lock().await;
        if clinics.iter().any(|stored| stored.code() == clinic.code()) {
            return Err(AppError::Conflict("clinic code already used".to_owned()));
        }
        clinics.push(clinic);
        Ok(())
    }

    async fn update_clinic(&self, clinic: Clinic) -> AppResult<()> {
        let mut clinics = self.clinics.lock().await;
        clinics.retain(|stored| stored.clinic_id() != clinic.clinic_id());
        clinics.push(clinic);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRecordRepository {
    pub records: Mutex<Vec<ClinicRecord>>,
}

#[async_trait]
impl RecordRepository for FakeRecordRepository {
    async fn list_records(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
    ) -> AppResult<Vec<ClinicRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| record.clinic_id() == clinic_id && record.resource() == resource)
            .cloned()
            .collect())
    }

    async fn find_record(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<Option<ClinicRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| {
                record.clinic_id() == clinic_id
                    && record.resource() == resource
                    && record.record_id() == record_id
            })
            .cloned())
    }

    async fn insert_record(&self, record: ClinicRecord) -> AppResult<()> {
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn update_record(&self, record: ClinicRecord) -> AppResult<()> {
        let mut records = self.records.lock().await;
        records.retain(|stored| stored.record_id() != record.record_id());
        records.push(record);
        Ok(())
    }

    async fn delete_record(
        &self,
        _clinic_id: ClinicId,
        _resource: Resource,
        record_id: Uuid,
    ) -> AppResult<()> {
        self.records
            .lock()
            .await
            .retain(|record| record.record_id() != record_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSettingsRepository {
    pub settings: Mutex<Option<Value>>,
}

#[async_trait]
impl SettingsRepository for FakeSettingsRepository {
    async fn load_settings(&self) -> AppResult<Value> {
        Ok(self
            .settings
            .lock()
            .await
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }

    async fn save_settings(&self, settings: Value) -> AppResult<()> {
        *self.settings.lock().await = Some(settings);
        Ok(())
    }
}

pub struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

pub struct FakeTokenCodec;

impl TokenCodec for FakeTokenCodec {
    fn issue(&self, user_id: UserId) -> AppResult<IssuedToken> {
        Ok(IssuedToken {
            token: format!("token:{user_id}"),
            expires_at: Utc::now() + Duration::minutes(60),
        })
    }

    fn verify(&self, token: &str) -> AppResult<UserId> {
        token
            .strip_prefix("token:")
            .ok_or_else(|| AppError::Unauthorized("malformed token".to_owned()))
            .and_then(UserId::parse)
            .map_err(|_| AppError::Unauthorized("invalid token".to_owned()))
    }
}
