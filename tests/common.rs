use std::sync::Arc;

use autolab_portal::config::{extract_config, ConfigV1};
use autolab_portal::state::Portal;
use figment::{
    providers::{Format, Yaml},
    Figment,
};

pub const SESSION_TOKEN: &str = "test-session-token";

/// A v1 config pointing at `base_url`, parsed the same way the binary does.
pub fn test_config(base_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
logging:
  level: "debug"
  format: "json"
portal:
  base_url: "{}"
  session_token: "{}"
  timeout_in_ms: 3000
  default_headers:
    X-Requested-With: "autolab-portal-tests"
"#,
        base_url, SESSION_TOKEN
    );
    extract_config(&Figment::new().merge(Yaml::string(&yaml))).expect("test config should parse")
}

pub fn build_portal(base_url: &str) -> Portal {
    Portal::new(Arc::new(test_config(base_url))).expect("portal should build")
}
