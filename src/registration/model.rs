use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Intern registration form as submitted by the applicant.
///
/// Field names follow the backend's JSON contract.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[schema(example = "Ravi Kumar")]
    pub full_name: String,
    #[schema(example = "ravi.kumar@example.com")]
    pub email: String,
    #[serde(rename = "mobileno")]
    #[schema(example = "9876543210")]
    pub mobileno: String,
    #[serde(rename = "altmobileno")]
    #[schema(example = "8765432109")]
    pub altmobileno: String,
    #[schema(example = "H.No 4-12, Ameerpet")]
    pub address: String,
    #[serde(rename = "batchno")]
    #[schema(example = "B12")]
    pub batchno: String,
    /// "Online" or "Offline"
    #[schema(example = "Online")]
    pub mode_of_internship: String,
    /// "Yes" or "No"
    #[schema(example = "No")]
    pub belonged_to_vasavi_foundation: String,
    #[schema(example = "Data Science")]
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    pub message: String,
    #[serde(rename = "internID", skip_serializing_if = "Option::is_none")]
    pub intern_id: Option<String>,
}
