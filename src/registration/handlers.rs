use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

use crate::backend::BackendError;
use crate::registration::model::{RegistrationReceipt, RegistrationRequest};
use crate::registration::validation::ValidationError;
use crate::{backend_unavailable, AppState, ErrorResponse};

/// Returned when local validation rejects a registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationFailedResponse {
    pub error: String,
    pub message: String,
    pub errors: Vec<ValidationError>,
}

#[utoipa::path(
    post,
    path = "/api/register/intern",
    tag = "Registration",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Intern registered", body = RegistrationReceipt),
        (status = 400, description = "Validation failed or backend rejected the form", body = ValidationFailedResponse),
        (status = 409, description = "Email or mobile number already registered", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn register_intern(
    state: web::Data<AppState>,
    item: web::Json<RegistrationRequest>,
) -> impl Responder {
    let request = item.into_inner();

    if let Err(errors) = request.validate(&state.positions) {
        log::info!("Registration rejected locally: {} error(s)", errors.len());
        return HttpResponse::BadRequest().json(ValidationFailedResponse {
            error: "ValidationFailed".to_string(),
            message: errors.summary(),
            errors: errors.errors().to_vec(),
        });
    }

    match state.registrations.submit(&request).await {
        Ok(receipt) => {
            log::info!(
                "Registered intern {}",
                receipt.intern_id.as_deref().unwrap_or("(id pending)")
            );
            HttpResponse::Created().json(receipt)
        }
        Err(BackendError::Duplicate) => HttpResponse::Conflict().json(ErrorResponse::conflict(
            "An intern with this email or mobile number is already registered",
        )),
        Err(BackendError::Rejected {
            message,
            suggestion,
        }) => {
            // The backend's wording reaches the user as-is.
            let message = match suggestion {
                Some(suggestion) => format!("{}. {}", message, suggestion),
                None => message,
            };
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
        Err(e) => backend_unavailable(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/register/intern").route(web::post().to(register_intern)));
}
