use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::utils::value::value_to_string;

const NO_MESSAGE: &str = "request failed without an error message";

/// The `{success, data, error}` wrapper every Portal API response uses.
///
/// Fields are pulled out of the raw JSON object by hand so that a field of an
/// unexpected type (say `"success": "yes"`) degrades to "absent" instead of
/// failing the whole response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiEnvelope {
    pub success: Option<bool>,
    pub data: Option<Value>,
    pub error: Option<Value>,
    pub errors: Vec<String>,
    /// Only sent by the userinfo endpoint.
    pub developer_mode: Option<bool>,
    /// Any other top-level fields (admin-update sends `isAdmin` and `message`).
    pub extra: Map<String, Value>,
}

impl ApiEnvelope {
    /// Parse a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, LoadError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| LoadError::Parse(e.to_string()))?;
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(LoadError::Parse(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let success = map.remove("success").and_then(|v| v.as_bool());
        let data = map.remove("data").filter(|v| !v.is_null());
        let error = map.remove("error").filter(|v| !v.is_null());
        let errors = match map.remove("errors") {
            Some(Value::Array(items)) => items.into_iter().map(value_to_string).collect(),
            _ => Vec::new(),
        };
        let developer_mode = map.remove("developerMode").and_then(|v| v.as_bool());
        ApiEnvelope {
            success,
            data,
            error,
            errors,
            developer_mode,
            extra: map,
        }
    }

    /// Only an explicit `success: false` counts as a failure; a missing flag
    /// is treated as success.
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }

    /// Strict check used where a missing flag must not count as success.
    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }

    /// The failure this envelope describes, built from `error` and `errors`.
    pub fn failure(&self) -> LoadError {
        let message = self
            .error
            .clone()
            .map(value_to_string)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| NO_MESSAGE.to_string());
        LoadError::Api {
            message,
            details: self.errors.clone(),
        }
    }

    /// Decode `data` into `T`; an absent `data` yields `None`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>, LoadError> {
        match &self.data {
            None => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| LoadError::Decode(e.to_string())),
        }
    }

    /// Turn the envelope into the loader's outcome.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<Option<T>, LoadError> {
        if self.is_failure() {
            return Err(self.failure());
        }
        self.data_as()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_data() {
        let envelope = ApiEnvelope::from_slice(br#"{"success": true, "data": [1, 2]}"#).unwrap();
        let data: Option<Vec<u8>> = envelope.into_result().unwrap();
        assert_eq!(data, Some(vec![1, 2]));
    }

    #[test]
    fn missing_success_flag_is_not_a_failure() {
        let envelope = ApiEnvelope::from_slice(br#"{"data": "x"}"#).unwrap();
        assert!(!envelope.is_failure());
        assert!(!envelope.is_success());
        assert_eq!(envelope.into_result::<String>().unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn explicit_failure_carries_message_and_details() {
        let envelope = ApiEnvelope::from_slice(
            br#"{"success": false, "error": "Bad sections", "errors": ["row 1: bad time", 7]}"#,
        )
        .unwrap();
        let err = envelope.into_result::<Value>().unwrap_err();
        assert_eq!(err.to_string(), "Bad sections");
        assert_eq!(
            err,
            LoadError::Api {
                message: "Bad sections".to_string(),
                details: vec!["row 1: bad time".to_string(), "7".to_string()],
            }
        );
    }

    #[test]
    fn failure_without_message_gets_a_readable_one() {
        let envelope = ApiEnvelope::from_slice(br#"{"success": false}"#).unwrap();
        assert_eq!(envelope.failure().to_string(), NO_MESSAGE);
    }

    #[test]
    fn keeps_developer_mode_and_extra_fields() {
        let envelope = ApiEnvelope::from_slice(
            br#"{"success": true, "developerMode": true, "isAdmin": false, "message": "ok"}"#,
        )
        .unwrap();
        assert_eq!(envelope.developer_mode, Some(true));
        assert_eq!(envelope.extra.get("message"), Some(&Value::from("ok")));
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn rejects_non_json_and_non_objects() {
        assert!(matches!(
            ApiEnvelope::from_slice(b"<html>502</html>"),
            Err(LoadError::Parse(_))
        ));
        let bodies: [&[u8]; 4] = [b"[1, 2]", b"null", b"\"ok\"", b"1"];
        for body in bodies {
            match ApiEnvelope::from_slice(body) {
                Err(LoadError::Parse(message)) => {
                    assert!(message.starts_with("expected a JSON object"), "{}", message)
                }
                other => panic!("expected a parse error, got {:?}", other),
            }
        }
    }

    #[test]
    fn mismatched_data_is_a_decode_error() {
        let envelope = ApiEnvelope::from_slice(br#"{"success": true, "data": "nope"}"#).unwrap();
        assert!(matches!(
            envelope.into_result::<Vec<u8>>(),
            Err(LoadError::Decode(_))
        ));
    }
}
