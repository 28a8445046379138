//! fluxradar deliver: one JSON POST per cycle to the controller endpoint.
//!
//! Delivery never fails the caller. Every exchange ends in a [`DeliveryOutcome`] which the
//! scheduler logs; the next cycle is the only retry.

#![forbid(unsafe_code)]

use metrics::counter;
use radar_core::Snapshot;
use reqwest::{header::CONTENT_TYPE, Certificate, StatusCode, Url};
use tracing::{debug, info, warn};

/// Certificate validation mode for `https` endpoints. Plain `http` ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrustMode {
    /// Validate against the system trust store; abort the exchange if it cannot be loaded.
    #[default]
    Strict,
    /// Accept any certificate.
    Insecure,
}

impl TrustMode {
    pub fn from_skip_verify(skip: bool) -> Self {
        if skip { Self::Insecure } else { Self::Strict }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported endpoint scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("loading system root certificates: {0}")]
    TrustStore(#[source] std::io::Error),
    #[error("system trust store contains no usable root certificates")]
    EmptyTrustStore,
    #[error("building http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("encoding snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("sending payload: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Result of a single delivery attempt.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Endpoint answered 200.
    Delivered,
    /// Endpoint answered with any other status.
    Rejected { status: u16, body: String },
    /// The exchange never completed.
    Failed(DeliveryError),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool { matches!(self, Self::Delivered) }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Rejected { .. } => "rejected",
            Self::Failed(_) => "failed",
        }
    }

    /// Emit the log line for this outcome.
    pub fn log(&self, endpoint: &str) {
        match self {
            Self::Delivered => debug!(endpoint, "snapshot delivered"),
            Self::Rejected { status, body } => warn!(endpoint, status, body = %body, "controller rejected snapshot"),
            Self::Failed(e) => warn!(endpoint, error = %e, "snapshot delivery failed"),
        }
    }
}

/// Anything that can take a finished snapshot off the scheduler's hands.
#[async_trait::async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn deliver(&self, snapshot: &Snapshot) -> DeliveryOutcome;
}

#[async_trait::async_trait]
impl<T: SnapshotSink + ?Sized> SnapshotSink for std::sync::Arc<T> {
    async fn deliver(&self, snapshot: &Snapshot) -> DeliveryOutcome {
        (**self).deliver(snapshot).await
    }
}

/// HTTP(S) delivery to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    endpoint: String,
    trust: TrustMode,
}

impl DeliveryClient {
    pub fn new(endpoint: impl Into<String>, trust: TrustMode) -> Self {
        Self { endpoint: endpoint.into(), trust }
    }

    pub fn endpoint(&self) -> &str { &self.endpoint }
    pub fn trust(&self) -> TrustMode { self.trust }

    fn parse_endpoint(&self) -> Result<Url, DeliveryError> {
        Url::parse(&self.endpoint)
            .map_err(|e| DeliveryError::InvalidUrl { url: self.endpoint.clone(), reason: e.to_string() })
    }

    async fn exchange(&self, snapshot: &Snapshot) -> Result<(StatusCode, String), DeliveryError> {
        let url = self.parse_endpoint()?;
        let client = build_http_client(&url, self.trust)?;
        let body = serde_json::to_vec(snapshot)?;
        let resp = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(DeliveryError::Transport)?;
        let status = resp.status();
        // body is informational only
        let text = resp.text().await.unwrap_or_default();
        Ok((status, text))
    }
}

#[async_trait::async_trait]
impl SnapshotSink for DeliveryClient {
    async fn deliver(&self, snapshot: &Snapshot) -> DeliveryOutcome {
        let outcome = match self.exchange(snapshot).await {
            Ok((status, _)) if status == StatusCode::OK => DeliveryOutcome::Delivered,
            Ok((status, body)) => DeliveryOutcome::Rejected { status: status.as_u16(), body },
            Err(e) => DeliveryOutcome::Failed(e),
        };
        outcome.log(&self.endpoint);
        counter!("radar_deliveries_total", 1u64, "outcome" => outcome.label());
        outcome
    }
}

/// Client for one exchange with `url`, configured for the endpoint's scheme and `trust`.
pub fn build_http_client(url: &Url, trust: TrustMode) -> Result<reqwest::Client, DeliveryError> {
    let builder = reqwest::Client::builder().use_rustls_tls();
    let builder = match (url.scheme(), trust) {
        ("http", _) => builder,
        ("https", TrustMode::Insecure) => builder.danger_accept_invalid_certs(true),
        ("https", TrustMode::Strict) => system_roots()?
            .into_iter()
            .fold(builder.tls_built_in_root_certs(false), |b, cert| b.add_root_certificate(cert)),
        (other, _) => return Err(DeliveryError::UnsupportedScheme(other.to_string())),
    };
    builder.build().map_err(DeliveryError::Client)
}

fn system_roots() -> Result<Vec<Certificate>, DeliveryError> {
    let ders = rustls_native_certs::load_native_certs().map_err(DeliveryError::TrustStore)?;
    let total = ders.len();
    let roots: Vec<Certificate> = ders.iter().filter_map(|der| Certificate::from_der(der.as_ref()).ok()).collect();
    if roots.is_empty() {
        return Err(DeliveryError::EmptyTrustStore);
    }
    if roots.len() < total {
        info!(loaded = roots.len(), skipped = total - roots.len(), "some system root certificates were unusable");
    }
    Ok(roots)
}
