use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::portal::PortalConfig;

/// Environment variables with this prefix override file values;
/// `__` separates nested keys (`AUTOLAB_PORTAL_PORTAL__SESSION_TOKEN`).
pub const ENV_PREFIX: &str = "AUTOLAB_PORTAL_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub portal: PortalConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The figment used to load configuration: the YAML file, then environment
/// overrides.
pub fn figment(path: impl AsRef<Path>) -> Figment {
    Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extract a `ConfigV1` from any figment, unwrapping the version tag.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from a YAML file (usually `./config.yaml`) plus environment.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1, figment::Error> {
    extract_config(&figment(path))
}

/// The JSON schema for the configuration file.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version: "1.0.0"
portal:
  base_url: "https://autolab.example.edu"
"#;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = extract_config(&Figment::new().merge(Yaml::string(MINIMAL))).unwrap();
        assert_eq!(config.portal.api_prefix, "/portal/api");
        assert_eq!(config.portal.userinfo_endpoint, "/portal/api/userinfo/");
        assert_eq!(config.portal.session_token, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.service_name, "autolab-portal");
    }

    #[test]
    fn unknown_version_is_rejected() {
        let yaml = MINIMAL.replace("1.0.0", "9.9.9");
        assert!(extract_config(&Figment::new().merge(Yaml::string(&yaml))).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.yaml", MINIMAL)?;
            jail.set_env("AUTOLAB_PORTAL_PORTAL__SESSION_TOKEN", "abc123");
            jail.set_env("AUTOLAB_PORTAL_LOGGING__LEVEL", "debug");

            let config = load_config("config.yaml")?;
            assert_eq!(config.portal.session_token.as_deref(), Some("abc123"));
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn schema_mentions_portal_section() {
        let schema = config_schema().unwrap();
        assert!(schema.contains("base_url"));
    }
}
