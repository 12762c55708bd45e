//! Get-or-create issuance of experience-letter certificates.
//!
//! The remote store is the only source of truth. Identifiers always come from
//! the allocator so that two issuances never collide.

use chrono::{Datelike, NaiveDate};
use log::{error, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::model::{CertificateRecord, InternshipRecord, ManualCertificateRequest};
use super::positions::PositionTable;
use super::unlock::Clock;
use crate::backend::{BackendError, CertificateStore, IdentifierAllocator, InternDirectory};

#[derive(Debug, Error)]
pub enum IssuanceError {
    #[error("intern {0} not found")]
    InternNotFound(String),
    #[error("intern {intern_id} has no {field} on record")]
    IncompleteIntern { intern_id: String, field: &'static str },
    #[error("{0}")]
    Invalid(String),
    #[error("issuance superseded by a newer request")]
    Cancelled,
    /// Create was refused as a duplicate, yet no record exists for the intern:
    /// the allocated identifier is already taken by another certificate.
    #[error("certification id {certification_id} for intern {intern_id} collides with an existing certificate")]
    IdentifierCollision {
        intern_id: String,
        certification_id: String,
    },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Two-digit, zero-padded month of `date` ("01".."12").
pub fn month_code(date: NaiveDate) -> String {
    format!("{:02}", date.month())
}

/// Bridges record lookup and record issuance.
#[derive(Clone)]
pub struct IssuanceCoordinator {
    store: Arc<dyn CertificateStore + Send + Sync>,
    allocator: Arc<dyn IdentifierAllocator + Send + Sync>,
    interns: Arc<dyn InternDirectory + Send + Sync>,
    positions: Arc<PositionTable>,
    clock: Arc<dyn Clock>,
}

impl IssuanceCoordinator {
    pub fn new(
        store: Arc<dyn CertificateStore + Send + Sync>,
        allocator: Arc<dyn IdentifierAllocator + Send + Sync>,
        interns: Arc<dyn InternDirectory + Send + Sync>,
        positions: Arc<PositionTable>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            allocator,
            interns,
            positions,
            clock,
        }
    }

    pub fn positions(&self) -> &PositionTable {
        &self.positions
    }

    /// Return the intern's certificate, issuing one if the store has none.
    ///
    /// The lookup always resolves before any create is sent. A duplicate-key
    /// rejection on create means another request won the race, so the stored
    /// record is re-read and returned.
    pub async fn get_or_create(&self, intern_id: &str) -> Result<CertificateRecord, IssuanceError> {
        match self.store.find_by_intern(intern_id).await {
            Ok(record) => return Ok(record),
            Err(BackendError::NotFound) => {
                info!("No certificate for intern {}, issuing a new one", intern_id);
            }
            Err(e) => return Err(e.into()),
        }

        let intern = match self.interns.get_intern(intern_id).await {
            Ok(intern) => intern,
            Err(BackendError::NotFound) => {
                return Err(IssuanceError::InternNotFound(intern_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let certification_id = self
            .allocator
            .allocate(&intern.domain, &month_code(self.clock.today()))
            .await?;

        let record = self.build_record(intern_id, intern, certification_id)?;

        match self.store.create(&record).await {
            Ok(stored) => {
                info!(
                    "Issued certificate {} for intern {}",
                    stored.certification_id, intern_id
                );
                Ok(stored)
            }
            Err(BackendError::Duplicate) => match self.store.find_by_intern(intern_id).await {
                Ok(existing) => {
                    warn!(
                        "Concurrent issuance for intern {}: keeping {}, discarding {}",
                        intern_id, existing.certification_id, record.certification_id
                    );
                    Ok(existing)
                }
                Err(BackendError::NotFound) => {
                    error!(
                        "Certification id {} for intern {} is already in use",
                        record.certification_id, intern_id
                    );
                    Err(IssuanceError::IdentifierCollision {
                        intern_id: intern_id.to_string(),
                        certification_id: record.certification_id,
                    })
                }
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Same as `get_or_create`, but resolves to `Cancelled` once `token` fires.
    pub async fn get_or_create_cancellable(
        &self,
        intern_id: &str,
        token: &CancellationToken,
    ) -> Result<CertificateRecord, IssuanceError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(IssuanceError::Cancelled),
            result = self.get_or_create(intern_id) => {
                if token.is_cancelled() {
                    Err(IssuanceError::Cancelled)
                } else {
                    result
                }
            }
        }
    }

    /// Issue a certificate from the admin form. Manual records carry no intern id.
    pub async fn issue_manual(
        &self,
        request: ManualCertificateRequest,
    ) -> Result<CertificateRecord, IssuanceError> {
        let student_name = request.student_name.trim();
        let domain = request.domain.trim();
        let position = request.position.trim();
        if student_name.is_empty() || domain.is_empty() || position.is_empty() {
            return Err(IssuanceError::Invalid(
                "student name, domain and position are required".to_string(),
            ));
        }
        if request.end_date < request.start_date {
            return Err(IssuanceError::Invalid(
                "end date must not be before start date".to_string(),
            ));
        }

        let certification_id = self
            .allocator
            .allocate(domain, &month_code(self.clock.today()))
            .await?;

        let record = CertificateRecord {
            intern_id: None,
            student_name: student_name.to_string(),
            domain: domain.to_string(),
            position: Some(position.to_string()),
            certification_id,
            start_date: request.start_date,
            end_date: request.end_date,
        };

        let stored = self.store.create(&record).await?;
        info!("Issued manual certificate {}", stored.certification_id);
        Ok(stored)
    }

    fn build_record(
        &self,
        intern_id: &str,
        intern: InternshipRecord,
        certification_id: String,
    ) -> Result<CertificateRecord, IssuanceError> {
        let start_date = intern.date_accepted.ok_or_else(|| IssuanceError::IncompleteIntern {
            intern_id: intern_id.to_string(),
            field: "acceptance date",
        })?;
        let end_date = intern.end_date.ok_or_else(|| IssuanceError::IncompleteIntern {
            intern_id: intern_id.to_string(),
            field: "end date",
        })?;

        let position = self.positions.position_for(&intern.domain).map(str::to_string);
        if position.is_none() {
            warn!("Domain '{}' has no mapped position", intern.domain);
        }

        Ok(CertificateRecord {
            intern_id: Some(intern_id.to_string()),
            student_name: intern.full_name,
            domain: intern.domain,
            position,
            certification_id,
            start_date,
            end_date,
        })
    }
}

/// One live issuance per intern: starting a newer one cancels the older.
#[derive(Debug, Default)]
pub struct Supersession {
    inflight: Mutex<HashMap<String, CancellationToken>>,
}

impl Supersession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh token for `key`, cancelling whatever was there.
    ///
    /// The entry is released when the returned guard drops, including when the
    /// request future is dropped mid-flight.
    pub fn begin(&self, key: &str) -> SupersessionGuard<'_> {
        let token = CancellationToken::new();
        if let Some(previous) = self.inflight.lock().insert(key.to_string(), token.clone()) {
            previous.cancel();
        }
        SupersessionGuard {
            registry: self,
            key: key.to_string(),
            token,
        }
    }

    pub fn inflight(&self) -> usize {
        self.inflight.lock().len()
    }
}

/// Live registration returned by [`Supersession::begin`].
#[derive(Debug)]
pub struct SupersessionGuard<'a> {
    registry: &'a Supersession,
    key: String,
    token: CancellationToken,
}

impl SupersessionGuard<'_> {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for SupersessionGuard<'_> {
    fn drop(&mut self) {
        // A cancelled token has already been replaced by a newer entry.
        if !self.token.is_cancelled() {
            self.registry.inflight.lock().remove(&self.key);
        }
    }
}
