use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the Portal API lives and how to authenticate against it.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct PortalConfig {
    /// Scheme and host the portal is served from, e.g. `https://autolab.example.edu`.
    pub base_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_userinfo_endpoint")]
    pub userinfo_endpoint: String,
    /// Value of the portal session cookie, sent with every request when set.
    #[serde(default)]
    pub session_token: Option<String>,
    /// Transport-level timeout. Unset means the HTTP client's default.
    #[serde(default)]
    pub timeout_in_ms: Option<u64>,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
}

impl PortalConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        PortalConfig {
            base_url: base_url.into(),
            api_prefix: default_api_prefix(),
            userinfo_endpoint: default_userinfo_endpoint(),
            session_token: None,
            timeout_in_ms: None,
            default_headers: BTreeMap::new(),
        }
    }
}

fn default_api_prefix() -> String {
    "/portal/api".to_string()
}

fn default_userinfo_endpoint() -> String {
    "/portal/api/userinfo/".to_string()
}
