use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    success: bool,
    message: String,
    /// Permission the caller lacks, as `<resource>.<action>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    required: Option<String>,
}

impl ErrorResponse {
    pub(super) fn new(message: String) -> Self {
        Self {
            success: false,
            message,
            required: None,
        }
    }

    pub(super) fn with_required(mut self, required: String) -> Self {
        self.required = Some(required);
        self
    }
}
