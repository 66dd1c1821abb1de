use clinic_core::AppError;
use tracing::info;

use crate::api_config::BootstrapAdminConfig;
use crate::state::AppState;

/// Seeds the built-in roles and, when configured, the first administrator.
pub async fn bootstrap_access_control(
    state: &AppState,
    bootstrap_admin: Option<&BootstrapAdminConfig>,
) -> Result<(), AppError> {
    let seeded = state.role_service.seed_system_roles().await?;
    if seeded > 0 {
        info!(count = seeded, "seeded system roles");
    }

    if let Some(admin) = bootstrap_admin {
        let created = state
            .user_service
            .ensure_bootstrap_admin(
                admin.email.as_str(),
                admin.password.as_str(),
                admin.display_name.as_str(),
            )
            .await?;
        if created {
            info!(email = %admin.email, "created bootstrap administrator");
        }
    }

    Ok(())
}
