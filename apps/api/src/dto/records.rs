use clinic_domain::ClinicRecord;
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

/// API representation of a clinic-scoped record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/record-response.ts"
)]
pub struct RecordResponse {
    pub record_id: String,
    pub clinic_id: String,
    pub resource: String,
    #[ts(type = "Record<string, unknown>")]
    pub payload: Value,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ClinicRecord> for RecordResponse {
    fn from(value: ClinicRecord) -> Self {
        Self {
            record_id: value.record_id().to_string(),
            clinic_id: value.clinic_id().to_string(),
            resource: value.resource().as_str().to_owned(),
            payload: value.payload().to_value(),
            created_by: value.created_by().to_string(),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}
