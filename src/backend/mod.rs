//! Backend collaborators - the remote services this server talks to.
//!
//! This module is split into submodules for better separation of concerns:
//! - `http` - reqwest client for the internship-management API
//! - `memory` - in-process implementation used for local runs and tests

pub mod http;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::certificate::model::{CertificateRecord, InternshipRecord};
use crate::registration::model::{RegistrationReceipt, RegistrationRequest};

/// Errors reported by a backend call.
///
/// `NotFound` and `Duplicate` are expected signals that callers branch on;
/// everything else is a failure to surface.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("resource not found")]
    NotFound,
    #[error("duplicate key rejected by backend")]
    Duplicate,
    #[error("{message}")]
    Rejected {
        message: String,
        suggestion: Option<String>,
    },
    #[error("backend transport failure: {0}")]
    Transport(String),
    #[error("backend responded with unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("failed to decode backend response: {0}")]
    Decode(String),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

/// Hands out certification identifiers, one sequence per (domain, month).
#[async_trait]
pub trait IdentifierAllocator {
    async fn allocate(&self, domain: &str, month_code: &str) -> Result<String, BackendError>;
}

/// Persistence for issued certificates.
///
/// `create` must reject a second record for the same intern id with
/// `BackendError::Duplicate`.
#[async_trait]
pub trait CertificateStore {
    async fn find_by_intern(&self, intern_id: &str) -> Result<CertificateRecord, BackendError>;
    async fn create(&self, record: &CertificateRecord) -> Result<CertificateRecord, BackendError>;
    async fn list(&self) -> Result<Vec<CertificateRecord>, BackendError>;
}

#[async_trait]
pub trait InternDirectory {
    async fn get_intern(&self, intern_id: &str) -> Result<InternshipRecord, BackendError>;
}

#[async_trait]
pub trait RegistrationGateway {
    async fn submit(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReceipt, BackendError>;
}

/// Everything the server needs from a backend, as one object.
pub trait Backend:
    IdentifierAllocator + CertificateStore + InternDirectory + RegistrationGateway + Send + Sync
{
}

impl<T> Backend for T where
    T: IdentifierAllocator + CertificateStore + InternDirectory + RegistrationGateway + Send + Sync
{
}
