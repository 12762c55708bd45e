//! Shared application state handed to every handler.

use moka::future::Cache;
use std::sync::Arc;

use crate::backend::http::HttpBackend;
use crate::backend::memory::InMemoryBackend;
use crate::backend::{Backend, CertificateStore, InternDirectory, RegistrationGateway};
use crate::certificate::coordinator::{IssuanceCoordinator, Supersession};
use crate::certificate::model::CertificateRecord;
use crate::certificate::positions::PositionTable;
use crate::certificate::unlock::{Clock, SystemClock};
use crate::config::{AppConfig, BackendMode};
use crate::letters::{
    DocumentExporter, ExperienceLetterGenerator, LetterError, OfferLetterGenerator, Rasterizer,
    TypstRasterizer,
};

#[derive(Clone)]
pub struct AppState {
    pub coordinator: IssuanceCoordinator,
    pub store: Arc<dyn CertificateStore + Send + Sync>,
    pub interns: Arc<dyn InternDirectory + Send + Sync>,
    pub registrations: Arc<dyn RegistrationGateway + Send + Sync>,
    pub positions: Arc<PositionTable>,
    pub clock: Arc<dyn Clock>,
    /// Last record seen per intern, for re-downloads. Never consulted by the coordinator.
    pub certificate_cache: Cache<String, CertificateRecord>,
    pub supersession: Arc<Supersession>,
    pub experience_letters: Arc<ExperienceLetterGenerator>,
    pub offer_letters: Arc<OfferLetterGenerator>,
    pub exporter: DocumentExporter,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let rasterizer: Arc<dyn Rasterizer> = Arc::new(TypstRasterizer::new(config.typst_bin.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.utc_offset));

        match &config.backend {
            BackendMode::Http { base_url } => {
                let http_client = reqwest::Client::builder()
                    .timeout(config.backend_timeout)
                    .pool_idle_timeout(std::time::Duration::from_secs(900))
                    .user_agent(concat!("intern-letters-server/", env!("CARGO_PKG_VERSION")))
                    .build()?;
                let backend = Arc::new(HttpBackend::new(http_client, base_url)?);
                log::info!("Using internship backend at {}", base_url);
                Ok(Self::from_backend(backend, rasterizer, clock, config)?)
            }
            BackendMode::Memory => {
                log::warn!("Using in-memory backend; issued certificates are lost on restart");
                let backend = Arc::new(InMemoryBackend::new());
                Ok(Self::from_backend(backend, rasterizer, clock, config)?)
            }
        }
    }

    /// Wire every collaborator to one backend object.
    pub fn from_backend<B: Backend + 'static>(
        backend: Arc<B>,
        rasterizer: Arc<dyn Rasterizer>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Result<Self, LetterError> {
        let positions = Arc::new(PositionTable::default());

        let coordinator = IssuanceCoordinator::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            positions.clone(),
            clock.clone(),
        );

        let certificate_cache = Cache::builder()
            .time_to_live(config.certificate_cache_ttl)
            .max_capacity(1_000)
            .build();

        Ok(AppState {
            coordinator,
            store: backend.clone(),
            interns: backend.clone(),
            registrations: backend,
            positions,
            clock,
            certificate_cache,
            supersession: Arc::new(Supersession::new()),
            experience_letters: Arc::new(ExperienceLetterGenerator::new(config.issuer_name.clone())?),
            offer_letters: Arc::new(OfferLetterGenerator::new(config.issuer_name.clone())?),
            exporter: DocumentExporter::new(rasterizer),
        })
    }
}
