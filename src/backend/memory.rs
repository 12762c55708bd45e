//! In-process backend.
//!
//! Mirrors the remote API's contracts, including the unique intern key on
//! certificates and per-(domain, month) identifier sequences. Used when
//! `BACKEND_MODE=memory` and throughout the tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{
    BackendError, CertificateStore, IdentifierAllocator, InternDirectory, RegistrationGateway,
};
use crate::certificate::model::{CertificateRecord, InternshipRecord};
use crate::registration::model::{RegistrationReceipt, RegistrationRequest};

#[derive(Default)]
struct Inner {
    interns: HashMap<String, InternshipRecord>,
    certificates: Vec<CertificateRecord>,
    sequences: HashMap<(String, String), u32>,
    allocations: usize,
    registrations: Vec<RegistrationRequest>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_intern(&self, intern_id: &str, intern: InternshipRecord) {
        self.inner.lock().interns.insert(intern_id.to_string(), intern);
    }

    pub fn certificate_count(&self) -> usize {
        self.inner.lock().certificates.len()
    }

    /// Number of identifiers handed out so far.
    pub fn allocations(&self) -> usize {
        self.inner.lock().allocations
    }

    pub fn registration_count(&self) -> usize {
        self.inner.lock().registrations.len()
    }
}

/// Uppercase initials of the domain's words: "Data Science" -> "DS".
pub fn domain_code(domain: &str) -> String {
    domain
        .split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_ascii_alphanumeric()))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[async_trait]
impl IdentifierAllocator for InMemoryBackend {
    async fn allocate(&self, domain: &str, month_code: &str) -> Result<String, BackendError> {
        let code = domain_code(domain);
        if code.is_empty() || month_code.len() != 2 {
            return Err(BackendError::Rejected {
                message: format!("cannot allocate identifier for '{}'/'{}'", domain, month_code),
                suggestion: None,
            });
        }

        // Keyed on the printed prefix: "MERN Full Stack" and "Mern Full Stack" share one sequence.
        let mut inner = self.inner.lock();
        inner.allocations += 1;
        let sequence = inner
            .sequences
            .entry((code.clone(), month_code.to_string()))
            .or_insert(0);
        *sequence += 1;
        Ok(format!("{}{}{:03}", code, month_code, sequence))
    }
}

#[async_trait]
impl CertificateStore for InMemoryBackend {
    async fn find_by_intern(&self, intern_id: &str) -> Result<CertificateRecord, BackendError> {
        self.inner
            .lock()
            .certificates
            .iter()
            .find(|record| record.intern_id.as_deref() == Some(intern_id))
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    async fn create(&self, record: &CertificateRecord) -> Result<CertificateRecord, BackendError> {
        let mut inner = self.inner.lock();
        let clash = inner.certificates.iter().any(|existing| {
            existing.certification_id == record.certification_id
                || (record.intern_id.is_some() && existing.intern_id == record.intern_id)
        });
        if clash {
            return Err(BackendError::Duplicate);
        }
        inner.certificates.push(record.clone());
        Ok(record.clone())
    }

    async fn list(&self) -> Result<Vec<CertificateRecord>, BackendError> {
        Ok(self.inner.lock().certificates.clone())
    }
}

#[async_trait]
impl InternDirectory for InMemoryBackend {
    async fn get_intern(&self, intern_id: &str) -> Result<InternshipRecord, BackendError> {
        self.inner
            .lock()
            .interns
            .get(intern_id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }
}

#[async_trait]
impl RegistrationGateway for InMemoryBackend {
    async fn submit(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReceipt, BackendError> {
        let mut inner = self.inner.lock();
        let already_registered = inner.registrations.iter().any(|existing| {
            existing.email.eq_ignore_ascii_case(&request.email)
                || existing.mobileno == request.mobileno
        });
        if already_registered {
            return Err(BackendError::Duplicate);
        }

        inner.registrations.push(request.clone());
        let intern_id = format!("RS{:04}", inner.registrations.len());
        inner.interns.insert(
            intern_id.clone(),
            InternshipRecord {
                full_name: request.full_name.clone(),
                domain: request.domain.clone(),
                date_accepted: None,
                end_date: None,
            },
        );

        Ok(RegistrationReceipt {
            message: "Registered successfully".to_string(),
            intern_id: Some(intern_id),
        })
    }
}
