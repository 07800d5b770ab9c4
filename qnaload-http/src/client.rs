//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::QuestionRequest;
use qnaload_core::CapturedResponse;
use reqwest::{
    self,
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, Url,
};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, trace};

/// Sends one question to the answering endpoint and captures the response
#[async_trait::async_trait]
pub trait QuestionClient: Send + Sync {
    async fn ask(&self, request: &QuestionRequest) -> Result<CapturedResponse, HttpError>;
}

/// reqwest-backed client shared by every worker.
///
/// The inner `reqwest::Client` pools connections, so one instance serves the
/// whole run.
#[derive(Debug, Clone)]
pub struct HttpQuestionClient {
    client: Client,
    url: Url,
    headers: HeaderMap,
    timeout: Duration,
}

impl HttpQuestionClient {
    /// Build a client for `url` with extra per-request headers
    pub fn new(
        url: &str,
        headers: &BTreeMap<String, String>,
        config: &HttpConfig,
    ) -> Result<Self, HttpError> {
        let url = Url::parse(url).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!(
            "Creating HTTP client for {} with {}s timeout",
            url,
            config.timeout.as_secs_f64()
        );

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout);

        if let Some(ref proxy) = config.http_proxy {
            builder = builder.proxy(reqwest::Proxy::http(proxy.as_str())?);
        }
        if let Some(ref proxy) = config.https_proxy {
            builder = builder.proxy(reqwest::Proxy::https(proxy.as_str())?);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            url,
            headers: build_header_map(headers)?,
            timeout: config.timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn transport_error(&self, error: reqwest::Error) -> HttpError {
        if error.is_timeout() {
            HttpError::Timeout(self.timeout)
        } else {
            HttpError::NetworkError(error)
        }
    }
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HttpError> {
    let mut header_map = HeaderMap::new();
    header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (key, value) in headers {
        let header_name =
            HeaderName::from_str(key).map_err(|_| HttpError::InvalidHeaderName(key.to_string()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| HttpError::InvalidHeaderValue(key.to_string()))?;
        header_map.insert(header_name, header_value);
    }

    Ok(header_map)
}

#[async_trait::async_trait]
impl QuestionClient for HttpQuestionClient {
    async fn ask(&self, request: &QuestionRequest) -> Result<CapturedResponse, HttpError> {
        trace!("POST {} question={:?}", self.url, request.question);

        let body = serde_json::to_vec(request)?;
        let response = self
            .client
            .post(self.url.clone())
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        debug!("HTTP response received: {} ({} bytes)", status, body.len());

        Ok(CapturedResponse { status, body })
    }
}
