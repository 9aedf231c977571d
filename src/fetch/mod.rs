use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// User-Agent sent when neither the caller nor the request overrides it.
/// A realistic browser string; YouTube serves stripped-down pages to unknown
/// clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// HTTP method for a [`FetchRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

/// One outbound request as handed to an injected transport.
///
/// Constructed fresh per pipeline stage and never reused.
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    /// Attached only for non-GET methods.
    pub body: Option<String>,
    /// Explicit headers; these take precedence over the defaults the
    /// transport merges in.
    pub headers: Vec<(String, String)>,
    /// When set, the transport adds an `Accept-Language` header.
    pub lang: Option<String>,
    /// Overrides [`DEFAULT_USER_AGENT`].
    pub user_agent: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_lang(mut self, lang: Option<&str>) -> Self {
        self.lang = lang.map(str::to_string);
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<&str>) -> Self {
        self.user_agent = user_agent.map(str::to_string);
        self
    }
}

/// Buffered response handed back by a transport.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Transport-level failure, before any HTTP status could be classified.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Escape hatch for custom [`Fetcher`] implementations.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Injectable transport used at each of the three network call sites (watch
/// page, player endpoint, transcript payload).
///
/// Implementations must be safe to share across concurrent pipeline calls;
/// the core holds no other shared state.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

pub type SharedFetcher = Arc<dyn Fetcher>;

/// Default transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        // Explicit headers win over the merged defaults; reqwest appends
        // duplicate header values, so the defaults are skipped outright when
        // the request names them.
        let has_header = |name: &str| {
            request
                .headers
                .iter()
                .any(|(n, _)| n.eq_ignore_ascii_case(name))
        };
        if !has_header("user-agent") {
            builder = builder.header(
                "User-Agent",
                request.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
            );
        }
        if let Some(lang) = &request.lang {
            if !has_header("accept-language") {
                builder = builder.header("Accept-Language", lang.as_str());
            }
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method != Method::Get {
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }
        }

        tracing::trace!(url = %request.url, method = ?request.method, "issuing request");

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(FetchResponse { status, body })
    }
}
