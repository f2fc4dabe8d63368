use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::LoggingError;

/// Collects an event's fields into a JSON map.
#[derive(Default)]
struct JsonFieldVisitor {
    fields: Map<String, Value>,
}

impl JsonFieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonFieldVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::from(format!("{:?}", value)));
    }
}

/// Writes one OpenTelemetry-shaped JSON log record per line.
#[derive(Clone)]
struct OtelJsonEventFormatter {
    service_name: String,
    service_version: String,
}

fn severity_number(level: &Level) -> u64 {
    match *level {
        Level::TRACE => 1,
        Level::DEBUG => 5,
        Level::INFO => 9,
        Level::WARN => 13,
        Level::ERROR => 17,
    }
}

impl OtelJsonEventFormatter {
    /// `resource` block shared by every record.
    fn resource(&self) -> Value {
        let mut resource = Map::new();
        resource.insert("service.name".to_string(), Value::from(self.service_name.as_str()));
        resource.insert(
            "service.version".to_string(),
            Value::from(self.service_version.as_str()),
        );
        Value::Object(resource)
    }
}

/// Turn collected event fields into OTel attributes. `event_name` and
/// `event_domain` become `event.name` and `event.domain`; the formatted
/// message is taken out and returned as the record body.
fn split_body(mut fields: Map<String, Value>, fallback: &str) -> (String, Map<String, Value>) {
    for (from, to) in [("event_name", "event.name"), ("event_domain", "event.domain")] {
        if let Some(v) = fields.remove(from) {
            fields.insert(to.to_string(), v);
        }
    }
    let body = match fields.remove("message") {
        Some(Value::String(message)) => message,
        Some(other) => other.to_string(),
        None => fallback.to_string(),
    };
    (body, fields)
}

impl<S, N> FormatEvent<S, N> for OtelJsonEventFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);
        let (body, mut attributes) = split_body(visitor.fields, metadata.name());

        // Enclosing spans, outermost first, e.g. ["session.refresh"].
        if let Some(scope) = ctx.event_scope() {
            let spans: Vec<Value> = scope.from_root().map(|span| Value::from(span.name())).collect();
            if !spans.is_empty() {
                attributes.insert("span.scope".to_string(), Value::Array(spans));
            }
        }
        if let Some(file) = metadata.file() {
            attributes.insert("code.filepath".to_string(), Value::from(file));
        }
        if let Some(line) = metadata.line() {
            attributes.insert("code.lineno".to_string(), Value::from(line));
        }
        attributes.insert("code.target".to_string(), Value::from(metadata.target()));

        let mut record = Map::new();
        record.insert(
            "timestamp".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        record.insert(
            "severity_text".to_string(),
            Value::from(metadata.level().as_str()),
        );
        record.insert(
            "severity_number".to_string(),
            Value::from(severity_number(metadata.level())),
        );
        record.insert("body".to_string(), Value::from(body));
        record.insert("resource".to_string(), self.resource());
        record.insert("attributes".to_string(), Value::Object(attributes));

        let line = serde_json::to_string(&record).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(LoggingError::InvalidLevel(level.to_string())),
    }
}

/// Install the global tracing subscriber described by `logging_config`.
///
/// Both formats write to stderr; stdout carries command output.
/// `RUST_LOG` directives, when set, are layered on top of the configured
/// level.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = parse_level(&logging_config.level)?;
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter_layer);
    let installed = match logging_config.format.trim().to_lowercase().as_str() {
        "json" => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .event_format(OtelJsonEventFormatter {
                        service_name: logging_config.service_name.clone(),
                        service_version: logging_config.service_version.clone(),
                    }),
            )
            .try_init(),
        "console" => registry
            .with(fmt::layer().with_writer(std::io::stderr).pretty())
            .try_init(),
        other => return Err(LoggingError::InvalidFormat(other.to_string())),
    };
    installed.map_err(|e| LoggingError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(parse_level(" Debug ").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::WARN);
        assert!(matches!(
            parse_level("verbose"),
            Err(LoggingError::InvalidLevel(_))
        ));
    }

    #[test]
    fn unknown_format_is_rejected_before_installing() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: "xml".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::InvalidFormat(_))
        ));
    }

    /// Collects everything the formatter writes.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn json_records_carry_event_fields_and_span_scope() {
        let capture = Capture::default();
        let make_writer = {
            let capture = capture.clone();
            move || capture.clone()
        };
        let formatter = OtelJsonEventFormatter {
            service_name: "autolab-portal".to_string(),
            service_version: "0.1.0".to_string(),
        };
        let subscriber = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(make_writer).event_format(formatter));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("session.refresh");
            let _entered = span.enter();
            tracing::warn!(
                event_name = "session.refresh.failed",
                endpoint = "/portal/api/userinfo/",
                "failed to load user info: {}",
                "timeout"
            );
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let record: Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(record["severity_text"], "WARN");
        assert_eq!(record["severity_number"], 13);
        assert_eq!(record["body"], "failed to load user info: timeout");
        assert_eq!(record["resource"]["service.name"], "autolab-portal");
        let attributes = &record["attributes"];
        assert_eq!(attributes["event.name"], "session.refresh.failed");
        assert_eq!(attributes["endpoint"], "/portal/api/userinfo/");
        assert_eq!(attributes["span.scope"], serde_json::json!(["session.refresh"]));
        assert!(attributes.get("message").is_none());
    }

    #[test]
    fn body_falls_back_to_event_name() {
        let mut fields = Map::new();
        fields.insert("event_domain".to_string(), Value::from("loader"));
        let (body, attributes) = split_body(fields, "event src/loader.rs:10");
        assert_eq!(body, "event src/loader.rs:10");
        assert_eq!(attributes["event.domain"], "loader");
    }

    #[test]
    fn severity_numbers_follow_otel() {
        assert_eq!(severity_number(&Level::INFO), 9);
        assert_eq!(severity_number(&Level::ERROR), 17);
    }
}
