//! reqwest client for the internship-management API.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{
    BackendError, CertificateStore, IdentifierAllocator, InternDirectory, RegistrationGateway,
};
use crate::certificate::model::{CertificateRecord, InternshipRecord};
use crate::registration::model::{RegistrationReceipt, RegistrationRequest};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllocatedIdentifier {
    new_certification_id: String,
}

#[derive(Deserialize)]
struct CertificateEnvelope {
    certificate: Option<CertificateRecord>,
}

#[derive(Deserialize, Default)]
struct RejectionBody {
    message: Option<String>,
    suggestion: Option<String>,
}

#[derive(Deserialize, Default)]
struct ReceiptBody {
    message: Option<String>,
    #[serde(rename = "internID", alias = "candidateID")]
    intern_id: Option<serde_json::Value>,
}

/// Client for the remote backend. Cheap to clone; shares the connection pool.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(client: Client, base_url: &str) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// Join percent-encoded path segments onto the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get(&self, segments: &[&str]) -> Result<Response, BackendError> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url);
        self.client.get(url).send().await.map_err(transport)
    }

    async fn post<T: serde::Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &T,
    ) -> Result<Response, BackendError> {
        let url = self.endpoint(segments)?;
        debug!("POST {}", url);
        self.client.post(url).json(body).send().await.map_err(transport)
    }
}

fn transport(e: reqwest::Error) -> BackendError {
    error!("Backend request failed: {}", e);
    BackendError::Transport(e.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

async fn rejection(response: Response) -> BackendError {
    let body: RejectionBody = response.json().await.unwrap_or_default();
    BackendError::Rejected {
        message: body
            .message
            .unwrap_or_else(|| "Request rejected by backend".to_string()),
        suggestion: body.suggestion,
    }
}

fn unexpected(status: StatusCode) -> BackendError {
    error!("Backend responded with unexpected status {}", status);
    BackendError::UnexpectedStatus(status.as_u16())
}

#[async_trait]
impl IdentifierAllocator for HttpBackend {
    async fn allocate(&self, domain: &str, month_code: &str) -> Result<String, BackendError> {
        let response = self
            .get(&["api", "generate-certificate-id", domain, month_code])
            .await?;
        match response.status() {
            status if status.is_success() => {
                let body: AllocatedIdentifier = decode(response).await?;
                Ok(body.new_certification_id)
            }
            StatusCode::BAD_REQUEST => Err(rejection(response).await),
            status => Err(unexpected(status)),
        }
    }
}

#[async_trait]
impl CertificateStore for HttpBackend {
    async fn find_by_intern(&self, intern_id: &str) -> Result<CertificateRecord, BackendError> {
        let response = self.get(&["api", "show_certificate", intern_id]).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(BackendError::NotFound),
            status if status.is_success() => {
                let body: CertificateEnvelope = decode(response).await?;
                body.certificate.ok_or(BackendError::NotFound)
            }
            status => Err(unexpected(status)),
        }
    }

    async fn create(&self, record: &CertificateRecord) -> Result<CertificateRecord, BackendError> {
        let response = self.post(&["api", "save_certificate_data"], record).await?;
        match response.status() {
            status if status.is_success() => Ok(record.clone()),
            StatusCode::CONFLICT => Err(BackendError::Duplicate),
            StatusCode::BAD_REQUEST => Err(rejection(response).await),
            status => Err(unexpected(status)),
        }
    }

    async fn list(&self) -> Result<Vec<CertificateRecord>, BackendError> {
        let response = self.get(&["api", "show_all_certificates"]).await?;
        match response.status() {
            status if status.is_success() => decode(response).await,
            status => Err(unexpected(status)),
        }
    }
}

#[async_trait]
impl InternDirectory for HttpBackend {
    async fn get_intern(&self, intern_id: &str) -> Result<InternshipRecord, BackendError> {
        let response = self.get(&["api", "intern_data", intern_id]).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(BackendError::NotFound),
            status if status.is_success() => {
                let interns: Vec<InternshipRecord> = decode(response).await?;
                interns.into_iter().next().ok_or(BackendError::NotFound)
            }
            status => Err(unexpected(status)),
        }
    }
}

#[async_trait]
impl RegistrationGateway for HttpBackend {
    async fn submit(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReceipt, BackendError> {
        let response = self.post(&["api", "register", "intern"], request).await?;
        match response.status() {
            status if status.is_success() => {
                let body: ReceiptBody = response.json().await.unwrap_or_default();
                Ok(RegistrationReceipt {
                    message: body
                        .message
                        .unwrap_or_else(|| "Registered successfully".to_string()),
                    intern_id: body.intern_id.map(|id| match id {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    }),
                })
            }
            StatusCode::CONFLICT => Err(BackendError::Duplicate),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Err(rejection(response).await),
            status => Err(unexpected(status)),
        }
    }
}
