use super::Format;
use crate::record::Entry;
use crate::types::TimeZone;
use chrono::SecondsFormat;
use serde_json::{Map, Value};

fn timestamp(entry: &Entry) -> Value {
    Value::String(entry.time().to_rfc3339_opts(SecondsFormat::Micros, false))
}

fn to_line(object: Map<String, Value>) -> String {
    Value::Object(object).to_string()
}

/// Formats records as JSON objects.
///
/// The object holds the configured builtin fields (only `message` by
/// default), every extra field and, optionally, a `timestamp`. Builtin
/// fields win over extra fields of the same name.
///
/// # Examples
///
/// ```
/// use daiquiri::format::JsonFormatter;
///
/// let formatter = JsonFormatter::new()
///     .fields(vec!["message", "levelname", "name"])
///     .timestamp(true);
/// # let _ = formatter;
/// ```
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    fields: Vec<String>,
    timestamp: bool,
}
impl JsonFormatter {
    /// Makes a formatter emitting `message` and the extra fields.
    pub fn new() -> Self {
        JsonFormatter {
            fields: vec!["message".to_owned()],
            timestamp: false,
        }
    }

    /// Sets the builtin fields to include.
    ///
    /// Names which are not builtin fields are ignored.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Whether to add a `timestamp` (RFC 3339, UTC, microseconds).
    pub fn timestamp(mut self, enabled: bool) -> Self {
        self.timestamp = enabled;
        self
    }
}
impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
impl Format for JsonFormatter {
    fn format(&self, entry: &Entry, _is_tty: bool) -> String {
        let mut object: Map<String, Value> = entry
            .extras()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for name in &self.fields {
            if let Some(value) = entry.builtin_field(name, TimeZone::Utc) {
                object.insert(name.clone(), value);
            }
        }
        if self.timestamp {
            object.insert("timestamp".to_owned(), timestamp(entry));
        }
        to_line(object)
    }
}

/// Formats records the way the Datadog agent ingests them.
///
/// The object holds `message`, every extra field, `timestamp`, `status`
/// (the lower-case level name) and `logger.name`.
#[derive(Debug, Clone, Default)]
pub struct DatadogFormatter {}
impl DatadogFormatter {
    /// Makes a new `DatadogFormatter`.
    pub fn new() -> Self {
        DatadogFormatter {}
    }
}
impl Format for DatadogFormatter {
    fn format(&self, entry: &Entry, _is_tty: bool) -> String {
        let mut object: Map<String, Value> = entry
            .extras()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        object.insert("message".to_owned(), Value::String(entry.message()));
        object.insert("timestamp".to_owned(), timestamp(entry));
        object.insert(
            "status".to_owned(),
            Value::String(entry.severity().name().to_ascii_lowercase()),
        );
        let mut logger = Map::new();
        logger.insert(
            "name".to_owned(),
            Value::String(entry.logger_name().to_owned()),
        );
        object.insert("logger".to_owned(), Value::Object(logger));
        to_line(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Extras;
    use crate::test_util::with_entry;
    use serde_json::json;
    use slog::{o, Level, OwnedKVList};

    fn format(formatter: &dyn Format, level: Level, extras: Extras) -> Value {
        let values: OwnedKVList = o!().into();
        let line = with_entry(level, "saymyname", "test message", &extras, &values, |e| {
            formatter.format(e, true)
        });
        serde_json::from_str(&line).unwrap()
    }

    #[test]
    fn message_and_extras() {
        let value = format(
            &JsonFormatter::new(),
            Level::Info,
            crate::extras! { "test" => "a", "count" => 3 },
        );
        assert_eq!(
            value,
            json!({"message": "test message", "test": "a", "count": 3})
        );
    }

    #[test]
    fn selected_builtin_fields() {
        let formatter = JsonFormatter::new().fields(vec!["message", "levelname", "name", "bogus"]);
        let value = format(&formatter, Level::Warning, Extras::new());
        assert_eq!(
            value,
            json!({"message": "test message", "levelname": "WARNING", "name": "saymyname"})
        );
    }

    #[test]
    fn optional_timestamp() {
        let value = format(&JsonFormatter::new().timestamp(true), Level::Info, Extras::new());
        let ts = value["timestamp"].as_str().unwrap();
        assert!(ts.ends_with("+00:00"), "{}", ts);
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn datadog_shape() {
        let value = format(
            &DatadogFormatter::new(),
            Level::Error,
            crate::extras! { "request_id" => 42 },
        );
        assert_eq!(value["message"], "test message");
        assert_eq!(value["status"], "error");
        assert_eq!(value["logger"], json!({"name": "saymyname"}));
        assert_eq!(value["request_id"], 42);
        assert!(value["timestamp"].is_string());
    }
}
