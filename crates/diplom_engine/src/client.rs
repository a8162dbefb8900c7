use std::pin::Pin;
use std::time::Duration;

use diplom_logging::diplom_debug;
use futures_util::{Stream, StreamExt};
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

use crate::decode::{decode_records, DecodeError, RecordDecoder};
use crate::{
    ClientError, DocumentPayload, DocumentRequest, FailureKind, ItemKind, ItemUpdate, MutationOp,
    StreamRecord,
};

/// Address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to mutation and document calls. The generation stream is only
    /// bounded by cancellation.
    pub request_timeout: Duration,
    pub max_document_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_document_bytes: 20 * 1024 * 1024,
        }
    }
}

pub type RecordStream = Pin<Box<dyn Stream<Item = Result<StreamRecord, DecodeError>> + Send>>;

/// Request/response contract of the remote generation service.
#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    /// Opens the generation stream for `topic`.
    async fn generate(&self, topic: &str) -> Result<RecordStream, ClientError>;

    async fn mutate(
        &self,
        op: MutationOp,
        id: &str,
        kind: ItemKind,
    ) -> Result<ItemUpdate, ClientError>;

    async fn build_document(
        &self,
        request: &DocumentRequest,
    ) -> Result<DocumentPayload, ClientError>;
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    topic: &'a str,
}

#[derive(Serialize)]
struct ItemBody {
    #[serde(rename = "type")]
    kind: ItemKind,
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    settings: ClientSettings,
    base: Url,
    http: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("{base} cannot carry endpoint paths"),
            ));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            http,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Appends path segments to the base address. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, ClientError> {
        diplom_debug!("POST {}", url);
        let mut request = self.http.post(url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl GenerationService for ReqwestClient {
    async fn generate(&self, topic: &str) -> Result<RecordStream, ClientError> {
        let url = self.endpoint(&["generate"])?;
        let response = self.post(url, &GenerateBody { topic }, None).await?;

        let decoder = RecordDecoder::for_content_type(header_value(&response, CONTENT_TYPE).as_deref());
        Ok(Box::pin(decode_records(response.bytes_stream(), decoder)))
    }

    async fn mutate(
        &self,
        op: MutationOp,
        id: &str,
        kind: ItemKind,
    ) -> Result<ItemUpdate, ClientError> {
        let url = self.endpoint(&["items", id, op.path_segment()])?;
        let response = self
            .post(url, &ItemBody { kind }, Some(self.settings.request_timeout))
            .await?;
        response.json::<ItemUpdate>().await.map_err(map_reqwest_error)
    }

    async fn build_document(
        &self,
        request: &DocumentRequest,
    ) -> Result<DocumentPayload, ClientError> {
        let url = self.endpoint(&["documents", "generate"])?;
        let response = self
            .post(url, request, Some(self.settings.request_timeout))
            .await?;

        let max_bytes = self.settings.max_document_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "document too large",
                ));
            }
        }

        let content_disposition = header_value(&response, CONTENT_DISPOSITION);
        let content_type = header_value(&response, CONTENT_TYPE);

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "document too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(DocumentPayload {
            bytes,
            content_disposition,
            content_type,
        })
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::MalformedRecord, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
