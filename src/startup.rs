//! Command dispatch for the `autolab-portal` binary.
//!
//! Builds the shared [`Portal`] from configuration and runs one command
//! against it.

use std::sync::Arc;

use clap::Subcommand;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::config::{config_schema, ConfigV1};
use crate::loader::{FetchOptions, PortalApiDataLoader};
use crate::state::Portal;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Ask the backend who is logged in and print the session.
    Whoami,
    /// Resolve a front-end path through the route table.
    Route { path: String },
    /// List the route table in matching order.
    Routes,
    /// GET an API endpoint and print the loader's final state.
    Get { endpoint: String },
    /// POST to an API endpoint and print the loader's final state.
    Post {
        endpoint: String,
        /// JSON request body.
        #[arg(long, conflicts_with = "form")]
        body: Option<String>,
        /// Send a URL-encoded form instead, one `key=value` per flag.
        #[arg(long, value_parser = parse_pair)]
        form: Vec<(String, String)>,
    },
    /// Print the JSON schema of the configuration file.
    Schema,
}

/// What a command printed and whether it counts as success.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub json: Value,
    pub ok: bool,
}

impl CommandOutput {
    fn succeeded(json: Value) -> Self {
        CommandOutput { json, ok: true }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

/// Run one command and print its output as pretty JSON on stdout.
pub async fn run(
    config: Arc<ConfigV1>,
    command: Command,
) -> Result<bool, Box<dyn std::error::Error>> {
    let portal = Portal::new(config)?;
    let output = execute(&portal, command).await?;
    println!("{}", serde_json::to_string_pretty(&output.json)?);
    Ok(output.ok)
}

pub async fn execute(
    portal: &Portal,
    command: Command,
) -> Result<CommandOutput, Box<dyn std::error::Error>> {
    match command {
        Command::Whoami => {
            let state = portal.session.load_user_data().await;
            Ok(CommandOutput {
                ok: state.logged_in,
                json: serde_json::to_value(&state)?,
            })
        }
        Command::Route { path } => {
            let route = portal.routes.resolve(&path);
            Ok(CommandOutput::succeeded(serde_json::to_value(&route)?))
        }
        Command::Routes => {
            let routes: Vec<Value> = portal
                .routes
                .entries()
                .map(|(pattern, name, page)| {
                    json!({
                        "pattern": pattern.as_str(),
                        "name": name,
                        "page": page,
                        "params": pattern.param_names().collect::<Vec<_>>(),
                    })
                })
                .collect();
            Ok(CommandOutput::succeeded(Value::Array(routes)))
        }
        Command::Get { endpoint } => {
            call(portal, Method::GET, &endpoint, FetchOptions::new()).await
        }
        Command::Post {
            endpoint,
            body,
            form,
        } => {
            let options = match body {
                Some(body) => FetchOptions::json_body(&serde_json::from_str::<Value>(&body)?)?,
                None if !form.is_empty() => FetchOptions::form(form),
                None => FetchOptions::new(),
            };
            call(portal, Method::POST, &endpoint, options).await
        }
        Command::Schema => Ok(CommandOutput::succeeded(serde_json::from_str(&config_schema()?)?)),
    }
}

/// Endpoints that are not absolute paths or URLs live under the API prefix.
fn endpoint_path(portal: &Portal, endpoint: &str) -> String {
    if endpoint.starts_with('/') || endpoint.contains("://") {
        endpoint.to_string()
    } else {
        portal.client.api_path(endpoint)
    }
}

async fn call(
    portal: &Portal,
    method: Method,
    endpoint: &str,
    options: FetchOptions,
) -> Result<CommandOutput, Box<dyn std::error::Error>> {
    let loader: PortalApiDataLoader<Value> = PortalApiDataLoader::with_method(
        portal.client.clone(),
        endpoint_path(portal, endpoint),
        method,
    );
    let ok = match loader.fetch(options).await {
        Ok(_) => {
            info!(endpoint = loader.endpoint(), "request succeeded");
            true
        }
        Err(e) => {
            error!(endpoint = loader.endpoint(), "request failed: {}", e);
            false
        }
    };
    Ok(CommandOutput {
        json: serde_json::to_value(loader.state())?,
        ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfig;
    use mockito::{Matcher, Server};

    fn portal_for(url: String) -> Portal {
        let config = ConfigV1 {
            portal: PortalConfig::new(url),
            logging: Default::default(),
        };
        Portal::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn pairs_split_on_first_equals() {
        assert_eq!(
            parse_pair("q=a=b"),
            Ok(("q".to_string(), "a=b".to_string()))
        );
        assert!(parse_pair("novalue").is_err());
    }

    #[tokio::test]
    async fn route_command_reports_the_match() {
        let portal = portal_for("http://127.0.0.1:1".to_string());
        let output = execute(
            &portal,
            Command::Route {
                path: "/gat/cse116/assignments/7".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(output.ok);
        assert_eq!(output.json["page"], "GatAssignment");
        assert_eq!(output.json["params"]["assignmentId"], "7");
    }

    #[tokio::test]
    async fn routes_command_lists_patterns_and_params() {
        let portal = portal_for("http://127.0.0.1:1".to_string());
        let output = execute(&portal, Command::Routes).await.unwrap();

        let routes = output.json.as_array().unwrap();
        assert_eq!(routes.len(), portal.routes.len());
        let person = routes
            .iter()
            .find(|r| r["name"] == "grader-assignment-tool-person")
            .unwrap();
        assert_eq!(person["pattern"], "/gat/:courseName/people/:user/");
        assert_eq!(person["page"], "GatPerson");
        assert_eq!(person["params"], json!(["courseName", "user"]));
        assert_eq!(routes.last().unwrap()["page"], "NotFound");
    }

    #[tokio::test]
    async fn get_prefixes_relative_endpoints() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/portal/api/my-courses/jdoe/")
            .with_body(r#"{"success": true, "data": {"username": "jdoe", "courses": []}}"#)
            .create_async()
            .await;

        let portal = portal_for(server.url());
        let output = execute(
            &portal,
            Command::Get {
                endpoint: "my-courses/jdoe/".to_string(),
            },
        )
        .await
        .unwrap();
        m.assert_async().await;

        assert!(output.ok);
        assert_eq!(output.json["loaded"], true);
        assert_eq!(output.json["data"]["username"], "jdoe");
    }

    #[tokio::test]
    async fn failed_post_prints_the_error_state() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/portal/api/admin-update/")
            .match_body(Matcher::UrlEncoded("admin".into(), "true".into()))
            .with_status(403)
            .with_body(r#"{"success": false, "error": "Not allowed."}"#)
            .create_async()
            .await;

        let portal = portal_for(server.url());
        let output = execute(
            &portal,
            Command::Post {
                endpoint: "admin-update/".to_string(),
                body: None,
                form: vec![("admin".to_string(), "true".to_string())],
            },
        )
        .await
        .unwrap();
        m.assert_async().await;

        assert!(!output.ok);
        assert_eq!(output.json["error"], "Not allowed.");
        assert_eq!(output.json["loading"], false);
    }

    #[tokio::test]
    async fn schema_names_the_version_tag() {
        let portal = portal_for("http://127.0.0.1:1".to_string());
        let output = execute(&portal, Command::Schema).await.unwrap();
        assert!(output.json.to_string().contains("1.0.0"));
    }
}
