use std::time::Duration;

use reqwest::RequestBuilder;
use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::USER_AGENT;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ComparisonBackend;
use crate::ComparisonRequest;
use crate::ComparisonResponse;
use crate::Error;
use crate::HealthStatus;
use crate::HistoryEntry;
use crate::Result;
use crate::SessionId;

const DEFAULT_USER_AGENT: &str = "truthbot-cli";

#[derive(Clone, Debug)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
    bearer_token: Option<String>,
    user_agent: Option<HeaderValue>,
    timeout: Option<Duration>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut base_url = base_url.into();
        // Trim trailing slashes for consistent URL building.
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Http(format!("failed to build http client: {e}")))?;
        Ok(Self {
            base_url,
            http,
            bearer_token: None,
            user_agent: None,
            timeout: None,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        if let Ok(hv) = HeaderValue::from_str(&ua.into()) {
            self.user_agent = Some(hv);
        }
        self
    }

    /// Deadline applied to every request; an expired deadline surfaces as
    /// [`Error::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(ua) = &self.user_agent {
            h.insert(USER_AGENT, ua.clone());
        } else {
            h.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        if let Some(token) = &self.bearer_token {
            let value = format!("Bearer {token}");
            if let Ok(hv) = HeaderValue::from_str(&value) {
                h.insert(AUTHORIZATION, hv);
            }
        }
        h
    }

    /// Joins `segments` onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Http(format!("invalid base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| Error::Http(format!("base url {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &'static str,
        url: &str,
        req: RequestBuilder,
    ) -> Result<T> {
        let req = req.headers(self.headers());
        let req = match self.timeout {
            Some(timeout) => req.timeout(timeout),
            None => req,
        };
        let res = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(url.to_string())
            } else {
                Error::Http(format!("{method} {url}: {e}"))
            }
        })?;
        let status = res.status();
        let ct = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = res.text().await.unwrap_or_default();
        debug!("{method} {url} -> {status}; content-type={ct}");
        if !status.is_success() {
            return Err(Error::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str::<T>(&body).map_err(|e| Error::Decode {
            url: url.to_string(),
            message: format!("{e}; content-type={ct}; body={body}"),
        })
    }
}

#[async_trait::async_trait]
impl ComparisonBackend for HttpClient {
    async fn compare(&self, request: ComparisonRequest) -> Result<ComparisonResponse> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(
            "compare: query_chars={} session={}",
            request.query.chars().count(),
            request
                .session_id
                .as_ref()
                .map_or("<none>", |sid| sid.0.as_str())
        );
        let req = self.http.post(&url).json(&request);
        self.send_json("POST", &url, req).await
    }

    async fn history(&self, session_id: &SessionId) -> Result<Vec<HistoryEntry>> {
        let url = self.endpoint(&["api", "history", session_id.0.as_str()])?;
        let req = self.http.get(url.clone());
        self.send_json("GET", url.as_str(), req).await
    }

    async fn health(&self) -> Result<String> {
        let url = format!("{}/health", self.base_url);
        let req = self.http.get(&url);
        let status: HealthStatus = self.send_json("GET", &url, req).await?;
        Ok(status.status)
    }
}
