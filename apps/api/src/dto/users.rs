use clinic_domain::UserAccount;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for account creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub global_role: String,
}

/// Incoming payload for account updates. The email cannot change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    pub display_name: String,
    pub global_role: String,
    pub is_active: bool,
    #[serde(default)]
    #[ts(optional)]
    pub password: Option<String>,
}

/// API representation of a user account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub global_role: String,
    pub is_active: bool,
}

impl From<UserAccount> for UserResponse {
    fn from(value: UserAccount) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            email: value.email().as_str().to_owned(),
            display_name: value.display_name().as_str().to_owned(),
            global_role: value.global_role().as_str().to_owned(),
            is_active: value.is_active(),
        }
    }
}
