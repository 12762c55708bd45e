use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::backend::BackendError;
use crate::certificate::coordinator::IssuanceError;
use crate::certificate::model::{
    CertificateOrigin, CertificateRecord, InternshipRecord, ManualCertificateRequest,
};
use crate::certificate::unlock::LetterAvailability;
use crate::letters::{Generator, LetterError, LetterLayout};
use crate::{backend_unavailable, AppState, ErrorResponse};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AchievementsResponse {
    pub intern: InternshipRecord,
    pub availability: LetterAvailability,
    /// Present once the experience letter is unlocked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateRecord>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CertificateListQuery {
    /// Only list certificates of this origin
    pub origin: Option<CertificateOrigin>,
}

fn issuance_failure(e: IssuanceError) -> HttpResponse {
    match e {
        IssuanceError::InternNotFound(id) => HttpResponse::NotFound()
            .json(ErrorResponse::not_found(&format!("Intern {} not found", id))),
        IssuanceError::IncompleteIntern { .. } => HttpResponse::UnprocessableEntity()
            .json(ErrorResponse::new("IncompleteIntern", &e.to_string())),
        IssuanceError::Invalid(message) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
        IssuanceError::Cancelled => HttpResponse::Conflict().json(ErrorResponse::conflict(
            "A newer request for this intern superseded this one",
        )),
        IssuanceError::IdentifierCollision { .. } => backend_unavailable(&e),
        IssuanceError::Backend(BackendError::NotFound) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found("Certificate not found"))
        }
        IssuanceError::Backend(BackendError::Rejected { message, .. }) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message))
        }
        IssuanceError::Backend(BackendError::Duplicate) => HttpResponse::Conflict()
            .json(ErrorResponse::conflict("Certificate already exists")),
        IssuanceError::Backend(other) => backend_unavailable(&other),
    }
}

fn letter_failure(e: LetterError) -> HttpResponse {
    match e {
        LetterError::MissingField(field) => HttpResponse::UnprocessableEntity().json(
            ErrorResponse::new("IncompleteLetter", &format!("Letter is missing {}", field)),
        ),
        other => {
            log::error!("Failed to render letter: {}", other);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to render letter"))
        }
    }
}

async fn lookup_intern(state: &AppState, intern_id: &str) -> Result<InternshipRecord, HttpResponse> {
    match state.interns.get_intern(intern_id).await {
        Ok(intern) => Ok(intern),
        Err(BackendError::NotFound) => Err(HttpResponse::NotFound().json(
            ErrorResponse::not_found(&format!("Intern {} not found", intern_id)),
        )),
        Err(e) => Err(backend_unavailable(&e)),
    }
}

/// Rasterize on the blocking pool and wrap the PDF as an attachment.
async fn pdf_response(state: &AppState, layout: LetterLayout) -> HttpResponse {
    let exporter = state.exporter.clone();
    let exported = match web::block(move || exporter.export(&layout)).await {
        Ok(Ok(exported)) => exported,
        Ok(Err(e)) => return letter_failure(e),
        Err(e) => {
            log::error!("Letter export task failed: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to render letter"));
        }
    };

    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(exported.filename)],
        })
        .body(exported.pdf)
}

/// Certificate for an unlocked intern: cache first, then get-or-create.
async fn certificate_for(state: &AppState, intern_id: &str) -> Result<CertificateRecord, HttpResponse> {
    if let Some(record) = state.certificate_cache.get(intern_id).await {
        return Ok(record);
    }

    let guard = state.supersession.begin(intern_id);
    let result = state
        .coordinator
        .get_or_create_cancellable(intern_id, guard.token())
        .await;
    drop(guard);

    let record = result.map_err(issuance_failure)?;
    state
        .certificate_cache
        .insert(intern_id.to_string(), record.clone())
        .await;
    Ok(record)
}

#[utoipa::path(
    get,
    path = "/api/interns/{id}/achievements",
    tag = "Letters",
    params(
        ("id" = String, Path, description = "Intern ID")
    ),
    responses(
        (status = 200, description = "Letter availability, with the certificate once unlocked", body = AchievementsResponse),
        (status = 404, description = "Intern not found", body = ErrorResponse),
        (status = 409, description = "Superseded by a newer request", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn get_achievements(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let intern_id = path.into_inner();
    let intern = match lookup_intern(&state, &intern_id).await {
        Ok(intern) => intern,
        Err(response) => return response,
    };

    let availability = LetterAvailability::evaluate(intern.end_date, state.clock.today());
    let certificate = if availability.experience_letter {
        match certificate_for(&state, &intern_id).await {
            Ok(record) => Some(record),
            Err(response) => return response,
        }
    } else {
        None
    };

    HttpResponse::Ok().json(AchievementsResponse {
        intern,
        availability,
        certificate,
    })
}

#[utoipa::path(
    get,
    path = "/api/interns/{id}/experience-letter",
    tag = "Letters",
    params(
        ("id" = String, Path, description = "Intern ID")
    ),
    responses(
        (status = 200, description = "Experience letter PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 403, description = "Letter unlocks on the internship end date", body = ErrorResponse),
        (status = 404, description = "Intern not found", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn download_experience_letter(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let intern_id = path.into_inner();
    let intern = match lookup_intern(&state, &intern_id).await {
        Ok(intern) => intern,
        Err(response) => return response,
    };

    let availability = LetterAvailability::evaluate(intern.end_date, state.clock.today());
    if !availability.experience_letter {
        let message = match availability.experience_letter_unlocks_on {
            Some(date) => format!("Experience letter unlocks on {}", date),
            None => "Internship end date is not on record yet".to_string(),
        };
        return HttpResponse::Forbidden().json(ErrorResponse::new("Locked", &message));
    }

    let record = match certificate_for(&state, &intern_id).await {
        Ok(record) => record,
        Err(response) => return response,
    };

    match state.experience_letters.assemble(&record) {
        Ok(layout) => pdf_response(&state, layout).await,
        Err(e) => letter_failure(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/interns/{id}/offer-letter",
    tag = "Letters",
    params(
        ("id" = String, Path, description = "Intern ID")
    ),
    responses(
        (status = 200, description = "Offer letter PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Intern not found", body = ErrorResponse),
        (status = 422, description = "Intern has no acceptance date", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn download_offer_letter(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let intern_id = path.into_inner();
    let intern = match lookup_intern(&state, &intern_id).await {
        Ok(intern) => intern,
        Err(response) => return response,
    };

    match state.offer_letters.assemble(&intern) {
        Ok(layout) => pdf_response(&state, layout).await,
        Err(e) => letter_failure(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/certificates",
    tag = "Certificates",
    params(CertificateListQuery),
    responses(
        (status = 200, description = "Issued certificates", body = Vec<CertificateRecord>),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn list_certificates(
    state: web::Data<AppState>,
    query: web::Query<CertificateListQuery>,
) -> impl Responder {
    match state.store.list().await {
        Ok(records) => {
            let records: Vec<CertificateRecord> = match query.origin {
                Some(origin) => records
                    .into_iter()
                    .filter(|record| record.origin() == origin)
                    .collect(),
                None => records,
            };
            HttpResponse::Ok().json(records)
        }
        Err(e) => backend_unavailable(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/certificates",
    tag = "Certificates",
    request_body = ManualCertificateRequest,
    responses(
        (status = 201, description = "Certificate issued; body is the experience letter PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub async fn issue_manual_certificate(
    state: web::Data<AppState>,
    item: web::Json<ManualCertificateRequest>,
) -> impl Responder {
    let record = match state.coordinator.issue_manual(item.into_inner()).await {
        Ok(record) => record,
        Err(e) => return issuance_failure(e),
    };

    let layout = match state
        .experience_letters
        .assemble_issued_on(&record, state.clock.today())
    {
        Ok(layout) => layout,
        Err(e) => return letter_failure(e),
    };

    let mut response = pdf_response(&state, layout).await;
    if response.status().is_success() {
        *response.status_mut() = actix_web::http::StatusCode::CREATED;
    }
    response
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/interns/{id}/achievements").route(web::get().to(get_achievements)))
        .service(
            web::resource("/interns/{id}/experience-letter")
                .route(web::get().to(download_experience_letter)),
        )
        .service(
            web::resource("/interns/{id}/offer-letter").route(web::get().to(download_offer_letter)),
        )
        .service(
            web::resource("/certificates")
                .route(web::get().to(list_certificates))
                .route(web::post().to(issue_manual_certificate)),
        );
}
