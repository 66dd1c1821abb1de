use clinic_application::LoginOutcome;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::PrincipalResponse;

/// Credentials submitted to the login endpoint.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token issued after a successful login.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-response.ts"
)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: PrincipalResponse,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(value: LoginOutcome) -> Self {
        Self {
            token: value.token.token,
            expires_at: value.token.expires_at.to_rfc3339(),
            user: PrincipalResponse::from(&value.principal),
        }
    }
}
