use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use tracing::{debug, info};
use url::Url;

use crate::config::PortalConfig;
use crate::error::ClientError;

/// Name of the cookie the portal backend keeps its session in.
pub const SESSION_COOKIE: &str = "ubcse_autolab_portal_session";

/// The configured HTTP client shared by every loader.
///
/// Cloning is cheap: `reqwest::Client` is reference counted internally.
#[derive(Clone, Debug)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
    api_prefix: String,
}

impl PortalClient {
    pub fn new(config: &PortalConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|source| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers(config)?);
        if let Some(ms) = config.timeout_in_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        info!(
            "Creating portal client for '{}' (session token {})",
            base_url,
            if config.session_token.is_some() { "set" } else { "not set" }
        );
        Ok(PortalClient {
            http: builder.build()?,
            base_url,
            api_prefix: config.api_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Path of an API endpoint under the configured prefix, e.g.
    /// `api_path("userinfo/")` is `/portal/api/userinfo/`.
    pub fn api_path(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_prefix, endpoint.trim_start_matches('/'))
    }

    /// Turn an endpoint into a full URL. Absolute URLs are used as given;
    /// anything else is resolved against the base URL.
    pub fn resolve(&self, endpoint: &str) -> Result<Url, ClientError> {
        if let Ok(url) = Url::parse(endpoint) {
            return Ok(url);
        }
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|_| ClientError::InvalidEndpoint(endpoint.to_string()))?;
        debug!("Resolved endpoint '{}' to '{}'", endpoint, url);
        Ok(url)
    }
}

fn default_headers(config: &PortalConfig) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.default_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ClientError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ClientError::InvalidHeader(name.as_str().to_string()))?;
        headers.insert(name, value);
    }
    if let Some(token) = &config.session_token {
        let mut cookie = HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token))
            .map_err(|_| ClientError::InvalidHeader(COOKIE.as_str().to_string()))?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);
    }
    Ok(headers)
}
