use async_trait::async_trait;
use clinic_application::{ClinicRepository, UserRecord, UserRepository};
use clinic_core::{AppError, AppResult, ClinicId, UserId};
use clinic_domain::{Clinic, UserAccount};

use super::InMemoryStore;

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|record| record.account.email().as_str().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<UserAccount>> {
        let mut accounts: Vec<UserAccount> = self
            .users
            .read()
            .await
            .values()
            .map(|record| record.account.clone())
            .collect();
        accounts.sort_by(|left, right| left.email().as_str().cmp(right.email().as_str()));
        Ok(accounts)
    }

    async fn create_user(&self, account: UserAccount, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        let email_taken = users.values().any(|record| {
            record
                .account
                .email()
                .as_str()
                .eq_ignore_ascii_case(account.email().as_str())
        });
        if email_taken {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
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
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(&account.user_id()) else {
            return Err(AppError::NotFound(format!(
                "user '{}' was not found",
                account.user_id()
            )));
        };

        record.account = account;
        Ok(())
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        if let Some(record) = self.users.write().await.get_mut(&user_id) {
            record.password_hash = password_hash.to_owned();
        }
        Ok(())
    }
}

#[async_trait]
impl ClinicRepository for InMemoryStore {
    async fn list_clinics(&self) -> AppResult<Vec<Clinic>> {
        let mut clinics: Vec<Clinic> = self.clinics.read().await.values().cloned().collect();
        clinics.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(clinics)
    }

    async fn find_clinic(&self, clinic_id: ClinicId) -> AppResult<Option<Clinic>> {
        Ok(self.clinics.read().await.get(&clinic_id).cloned())
    }

    async fn create_clinic(&self, clinic: Clinic) -> AppResult<()> {
        let mut clinics = self.clinics.write().await;
        if clinics
            .values()
            .any(|existing| existing.code() == clinic.code())
        {
            return Err(AppError::Conflict(format!(
                "clinic code '{}' is already used",
                clinic.code().as_str()
            )));
        }

        clinics.insert(clinic.clinic_id(), clinic);
        Ok(())
    }

    async fn update_clinic(&self, clinic: Clinic) -> AppResult<()> {
        let mut clinics = self.clinics.write().await;
        let Some(stored) = clinics.get_mut(&clinic.clinic_id()) else {
            return Err(AppError::NotFound(format!(
                "clinic '{}' was not found",
                clinic.clinic_id()
            )));
        };

        *stored = clinic;
        Ok(())
    }
}
