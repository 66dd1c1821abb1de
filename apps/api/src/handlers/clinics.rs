use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use clinic_core::{ClinicId, Principal};

use crate::dto::{ClinicResponse, CreateClinicRequest, UpdateClinicRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_clinics_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<ClinicResponse>>> {
    let clinics = state
        .clinic_service
        .list_clinics(&principal)
        .await?
        .into_iter()
        .map(ClinicResponse::from)
        .collect();

    Ok(Json(clinics))
}

pub async fn create_clinic_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateClinicRequest>,
) -> ApiResult<(StatusCode, Json<ClinicResponse>)> {
    let clinic = state
        .clinic_service
        .create_clinic(&principal, payload.name.as_str(), payload.code.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(ClinicResponse::from(clinic))))
}

pub async fn update_clinic_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(clinic_id): Path<String>,
    Json(payload): Json<UpdateClinicRequest>,
) -> ApiResult<Json<ClinicResponse>> {
    let clinic_id = ClinicId::parse(clinic_id.as_str())?;
    let clinic = state
        .clinic_service
        .update_clinic(
            &principal,
            clinic_id,
            payload.name.as_str(),
            payload.is_active,
        )
        .await?;

    Ok(Json(ClinicResponse::from(clinic)))
}
