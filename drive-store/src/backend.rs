use async_trait::async_trait;
use drive_core::{BoxError, HttpMethod, Upstream, UpstreamReply, UpstreamRequest};
use reqwest::{header, Client, Method};
use std::time::Duration;
use tracing::debug;

/// HTTP transport to the booking backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Upstream for BackendClient {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamReply, BoxError> {
        let url = self.url(&request.path);
        debug!("{:?} {}", request.method, url);

        let mut builder = self
            .client
            .request(method_of(request.method), &url)
            .header(header::ACCEPT, "application/json");

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?.to_vec();

        debug!("{} {} -> {}", url, content_type.as_deref().unwrap_or("-"), status);

        Ok(UpstreamReply { status, content_type, body })
    }
}
