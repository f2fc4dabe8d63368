use serde_json::Value;

/// Render a JSON value as display text for error messages.
///
/// Strings are used as-is (no surrounding quotes), everything else in its
/// JSON form. Control characters are stripped so a hostile message cannot
/// forge extra log lines.
pub fn value_to_string(value: Value) -> String {
    let raw = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    strip_control_chars(&raw)
}

fn strip_control_chars(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}
