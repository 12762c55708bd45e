use actix_cors::Cors;
use actix_web::middleware::{Compress, Logger};
use actix_web::{http::header, web, App, HttpResponse, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod backend;
pub mod certificate;
pub mod config;
pub mod letters;
pub mod registration;
pub mod state;

pub use crate::state::AppState;

use crate::config::AppConfig;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn conflict(message: &str) -> Self {
        Self::new("Conflict", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

/// Response for a backend failure the caller may retry.
///
/// Expected signals (not-found, duplicate, rejected) are handled by the
/// callers before they get here.
pub fn backend_unavailable(e: &impl std::fmt::Display) -> HttpResponse {
    log::error!("Backend call failed: {}", e);
    HttpResponse::BadGateway().json(ErrorResponse::new(
        "BackendUnavailable",
        "The internship service is unavailable. Please try again later.",
    ))
}

/// Register every `/api` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(certificate::handlers::config)
        .configure(registration::handlers::config);
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::certificate::handlers::get_achievements,
        crate::certificate::handlers::download_experience_letter,
        crate::certificate::handlers::download_offer_letter,
        crate::certificate::handlers::list_certificates,
        crate::certificate::handlers::issue_manual_certificate,
        crate::registration::handlers::register_intern,
    ),
    components(
        schemas(
            certificate::model::CertificateRecord,
            certificate::model::InternshipRecord,
            certificate::model::CertificateOrigin,
            certificate::model::ManualCertificateRequest,
            certificate::unlock::LetterAvailability,
            certificate::handlers::AchievementsResponse,
            registration::model::RegistrationRequest,
            registration::model::RegistrationReceipt,
            registration::validation::ValidationError,
            registration::handlers::ValidationFailedResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Letters", description = "Offer and experience letters for interns."),
        (name = "Certificates", description = "Administrative certificate endpoints."),
        (name = "Registration", description = "Intern registration intake.")
    )
)]
pub struct ApiDoc;

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    certificate::model::dates::set_local_offset(config.utc_offset);
    let app_state = web::Data::new(AppState::from_config(&config)?);

    let prometheus = PrometheusMetricsBuilder::new("intern_letters_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    log::info!(
        "Starting server at http://{}:{}",
        config.bind_address,
        config.port
    );

    let allowed_origins = config.allowed_origins.clone();
    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(Logger::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(web::scope("/api").configure(configure_api))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
