#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;

use intern_letters_server::backend::memory::InMemoryBackend;
use intern_letters_server::backend::{BackendError, CertificateStore};
use intern_letters_server::certificate::model::{CertificateRecord, InternshipRecord};
use intern_letters_server::certificate::unlock::FixedClock;
use intern_letters_server::config::AppConfig;
use intern_letters_server::letters::{LetterError, LetterLayout, Rasterizer};
use intern_letters_server::AppState;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Rasterizer that never shells out: a white A4-ish PNG at the requested scale.
pub struct BlankRasterizer;

impl Rasterizer for BlankRasterizer {
    fn rasterize(&self, _layout: &LetterLayout, scale: f32) -> Result<Vec<u8>, LetterError> {
        let bitmap = RgbImage::from_pixel(
            (794.0 * scale) as u32,
            (1123.0 * scale) as u32,
            Rgb([255, 255, 255]),
        );
        let mut png = Vec::new();
        bitmap
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| LetterError::DecodeBitmap(e.to_string()))?;
        Ok(png)
    }
}

pub fn intern(name: &str, domain: &str, accepted: Option<NaiveDate>, end: Option<NaiveDate>) -> InternshipRecord {
    InternshipRecord {
        full_name: name.to_string(),
        domain: domain.to_string(),
        date_accepted: accepted,
        end_date: end,
    }
}

/// Backend seeded with three interns:
/// - `RS001` finished on 2024-04-10
/// - `RS002` ends on 2024-06-30
/// - `RS003` has no dates yet
pub fn seeded_backend() -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_intern(
        "RS001",
        intern("ravi kumar", "Data Science", Some(date(2024, 1, 10)), Some(date(2024, 4, 10))),
    );
    backend.insert_intern(
        "RS002",
        intern("Anitha Reddy", "Java Full Stack", Some(date(2024, 3, 1)), Some(date(2024, 6, 30))),
    );
    backend.insert_intern("RS003", intern("Kiran Rao", "Testing Tools", None, None));
    backend
}

/// App state over `backend` with the clock pinned to `today`.
pub fn test_state(backend: Arc<InMemoryBackend>, today: NaiveDate) -> AppState {
    AppState::from_backend(
        backend,
        Arc::new(BlankRasterizer),
        Arc::new(FixedClock(today)),
        &AppConfig::default(),
    )
    .expect("letter templates should load")
}

/// Store whose first two lookups both miss and wait for each other, so two
/// issuances for the same intern are guaranteed to race into `create`.
pub struct RacingStore {
    inner: Arc<InMemoryBackend>,
    barrier: Barrier,
    lookups: AtomicUsize,
}

impl RacingStore {
    pub fn new(inner: Arc<InMemoryBackend>) -> Self {
        Self {
            inner,
            barrier: Barrier::new(2),
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CertificateStore for RacingStore {
    async fn find_by_intern(&self, intern_id: &str) -> Result<CertificateRecord, BackendError> {
        let result = self.inner.find_by_intern(intern_id).await;
        if self.lookups.fetch_add(1, Ordering::SeqCst) < 2 {
            self.barrier.wait().await;
        }
        result
    }

    async fn create(&self, record: &CertificateRecord) -> Result<CertificateRecord, BackendError> {
        self.inner.create(record).await
    }

    async fn list(&self) -> Result<Vec<CertificateRecord>, BackendError> {
        self.inner.list().await
    }
}
