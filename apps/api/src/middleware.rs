//! Authentication and permission guard applied to every request.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use clinic_application::AUTHENTICATION_REQUIRED;
use clinic_core::{AppError, AppResult, ClinicId, Principal};
use clinic_domain::Resource;
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::access_map::{RouteAccess, UnmappedPathPolicy};
use crate::error::ApiResult;
use crate::state::AppState;

/// Session key holding the clinic the user selected.
pub const SESSION_CLINIC_KEY: &str = "clinic_id";

/// Header carrying the clinic context for a single request.
pub const CLINIC_HEADER: &str = "x-clinic-id";

/// Access decision attached to the request for handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAccess {
    pub access: RouteAccess,
}

impl ResolvedAccess {
    /// Returns the record collection addressed by the request path.
    pub fn record_collection(&self) -> AppResult<Resource> {
        self.access
            .resource()
            .filter(Resource::is_record_collection)
            .ok_or_else(|| {
                AppError::Internal("record route resolved without a record collection".to_owned())
            })
    }
}

pub async fn require_access(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let access = state
        .access_map
        .classify(request.method(), request.uri().path());

    let Some(token) = bearer_token(request.headers())? else {
        if access == RouteAccess::Public {
            return Ok(next.run(request).await);
        }
        return Err(unauthenticated().into());
    };

    let principal = state
        .authentication_service
        .authenticate(token)
        .await
        .map_err(|error| {
            match &error {
                AppError::Internal(message) => {
                    warn!(error = %message, "authentication failed on a store error");
                }
                other => debug!(error = %other, "authentication rejected"),
            }
            unauthenticated()
        })?;

    // Administrators pass without a clinic, so a bad header only drops the context.
    let clinic_id = match requested_clinic(request.headers(), &session).await {
        Ok(clinic_id) => clinic_id,
        Err(AppError::Validation(message)) if principal.is_admin() => {
            debug!(error = %message, "ignoring malformed clinic header for administrator");
            None
        }
        Err(error) => return Err(error.into()),
    };
    let principal = principal.with_clinic(clinic_id);

    authorize(&state, &principal, access).await?;

    request.extensions_mut().insert(ResolvedAccess { access });
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

async fn authorize(state: &AppState, principal: &Principal, access: RouteAccess) -> AppResult<()> {
    if principal.is_admin() {
        return Ok(());
    }

    match access {
        RouteAccess::Public | RouteAccess::SelfService => Ok(()),
        RouteAccess::Unmapped => match state.access_map.unmapped_policy() {
            UnmappedPathPolicy::Allow => Ok(()),
            UnmappedPathPolicy::Deny => {
                warn!(user_id = %principal.user_id(), "request to unmapped path denied");
                Err(AppError::Forbidden(
                    "this path is not available to your role".to_owned(),
                ))
            }
        },
        RouteAccess::Guarded(permission) => {
            state
                .authorization_service
                .authorize_request(principal, permission.resource(), permission.action())
                .await
        }
    }
}

/// Extracts a bearer credential. A malformed `Authorization` header counts
/// as a failed credential, not a missing one.
fn bearer_token(headers: &HeaderMap) -> AppResult<Option<&str>> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(unauthenticated)
}

async fn requested_clinic(headers: &HeaderMap, session: &Session) -> AppResult<Option<ClinicId>> {
    if let Some(value) = headers.get(CLINIC_HEADER) {
        let value = value
            .to_str()
            .map_err(|_| AppError::Validation("X-Clinic-Id must be a UUID".to_owned()))?;
        return ClinicId::parse(value).map(Some);
    }

    session
        .get::<ClinicId>(SESSION_CLINIC_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session clinic: {error}")))
}

fn unauthenticated() -> AppError {
    AppError::Unauthorized(AUTHENTICATION_REQUIRED.to_owned())
}
