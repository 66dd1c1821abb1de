use std::sync::Arc;

use clinic_core::{AppError, AppResult, Principal};
use clinic_domain::AuditAction;
use serde_json::Value;

use crate::{AuditEvent, AuditRepository, SettingsRepository};

/// Application service for the global settings document.
#[derive(Clone)]
pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SettingsService {
    /// Creates a new settings service.
    #[must_use]
    pub fn new(
        settings_repository: Arc<dyn SettingsRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            settings_repository,
            audit_repository,
        }
    }

    /// Returns the settings object.
    pub async fn get_settings(&self) -> AppResult<Value> {
        self.settings_repository.load_settings().await
    }

    /// Replaces the settings object.
    pub async fn replace_settings(&self, actor: &Principal, settings: Value) -> AppResult<Value> {
        if !settings.is_object() {
            return Err(AppError::Validation(
                "settings must be a JSON object".to_owned(),
            ));
        }

        self.settings_repository
            .save_settings(settings.clone())
            .await?;
        self.audit_repository
            .append_event(AuditEvent {
                clinic_id: None,
                actor: actor.user_id(),
                action: AuditAction::SettingsUpdated,
                resource_type: "settings".to_owned(),
                resource_id: "platform".to_owned(),
                detail: None,
            })
            .await?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clinic_core::{AppError, GlobalRole, Principal, UserId};
    use serde_json::json;

    use crate::test_support::{FakeAuditRepository, FakeSettingsRepository};

    use super::SettingsService;

    #[tokio::test]
    async fn settings_start_empty_and_must_stay_objects() {
        let service = SettingsService::new(
            Arc::new(FakeSettingsRepository::default()),
            Arc::new(FakeAuditRepository::default()),
        );
        let actor = Principal::new(UserId::new(), "A", "a@clinic.org", GlobalRole::Admin);

        assert_eq!(service.get_settings().await.ok(), Some(json!({})));
        assert!(matches!(
            service.replace_settings(&actor, json!("flat")).await,
            Err(AppError::Validation(_))
        ));

        let saved = service
            .replace_settings(&actor, json!({"currency": "EUR"}))
            .await;
        assert!(saved.is_ok());
        assert_eq!(
            service.get_settings().await.ok(),
            Some(json!({"currency": "EUR"}))
        );
    }
}
