//! Log records as seen by outputs and formatters.
use crate::types::{Severity, TimeZone};
use chrono::{DateTime, Local, Utc};
use serde_json::{Number, Value};
use slog::{Key, OwnedKVList, Record, Serde, SerdeValue, Serializer, KV};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::io;
use std::thread;

/// The key under which the logger name travels with a record.
///
/// Records emitted through [`KeywordLogger`] carry the name as the record
/// tag instead; this key is used by loggers obtained from
/// [`KeywordLogger::to_slog`]. It never shows up among the extra fields,
/// so an extra field called `logger` is kept as any other.
///
/// [`KeywordLogger`]: ../logger/struct.KeywordLogger.html
/// [`KeywordLogger::to_slog`]: ../logger/struct.KeywordLogger.html#method.to_slog
pub const LOGGER_KEY: &str = "daiquiri.logger";

/// Extra fields attached to a log record, sorted by key.
///
/// # Examples
///
/// ```
/// use daiquiri::extras;
///
/// let extras = extras! { "mood" => "happy", "attempt" => 3 };
/// assert_eq!(extras.len(), 2);
/// assert_eq!(extras.get("mood").and_then(|v| v.as_str()), Some("happy"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extras(BTreeMap<String, Value>);
impl Extras {
    /// Makes an empty set of extra fields.
    pub fn new() -> Self {
        Extras::default()
    }

    /// Inserts a field, replacing any previous value for `key`.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the value of the field `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if there is a field named `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the fields in key order.
    pub fn iter(&self) -> btree_map::Iter<String, Value> {
        self.0.iter()
    }

    /// Copies every field of `other` into `self`, overriding existing keys.
    pub fn extend(&mut self, other: &Extras) {
        for (k, v) in other.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    fn insert_if_absent(&mut self, key: String, value: Value) {
        self.0.entry(key).or_insert(value);
    }
}
impl<'a> IntoIterator for &'a Extras {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Extras {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut extras = Extras::new();
        for (k, v) in iter {
            extras.insert(k, v);
        }
        extras
    }
}
impl KV for Extras {
    fn serialize(&self, record: &Record, serializer: &mut dyn Serializer) -> slog::Result {
        for (k, v) in &self.0 {
            let key = Key::from(k.clone());
            match *v {
                Value::Null => serializer.emit_none(key)?,
                Value::Bool(b) => serializer.emit_bool(key, b)?,
                Value::String(ref s) => serializer.emit_str(key, s)?,
                Value::Number(ref n) => {
                    if let Some(n) = n.as_u64() {
                        serializer.emit_u64(key, n)?
                    } else if let Some(n) = n.as_i64() {
                        serializer.emit_i64(key, n)?
                    } else {
                        serializer.emit_f64(key, n.as_f64().unwrap_or(f64::NAN))?
                    }
                }
                Value::Array(_) | Value::Object(_) => {
                    slog::Value::serialize(&Serde(v.clone()), record, key, serializer)?
                }
            }
        }
        Ok(())
    }
}

/// Makes an [`Extras`] from `key => value` pairs.
///
/// Values may be anything convertible into a `serde_json::Value`.
///
/// [`Extras`]: record/struct.Extras.html
#[macro_export]
macro_rules! extras {
    () => { $crate::record::Extras::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut extras = $crate::record::Extras::new();
        $(extras.insert($key, $value);)+
        extras
    }};
}

/// Collects slog key-value pairs into `Extras`, keeping the first value seen for a key.
struct Collector<'a> {
    extras: &'a mut Extras,
    logger: &'a mut Option<String>,
}
impl<'a> Collector<'a> {
    fn put(&mut self, key: Key, value: Value) -> slog::Result {
        let key = key.to_string();
        if key == LOGGER_KEY {
            if self.logger.is_none() {
                *self.logger = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
            }
        } else {
            self.extras.insert_if_absent(key, value);
        }
        Ok(())
    }
}
macro_rules! emit_number {
    ($name:ident, $t:ty) => {
        fn $name(&mut self, key: Key, val: $t) -> slog::Result {
            self.put(key, Value::from(val))
        }
    };
}
impl<'a> Serializer for Collector<'a> {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        self.put(key, Value::String(val.to_string()))
    }
    fn emit_str(&mut self, key: Key, val: &str) -> slog::Result {
        self.put(key, Value::String(val.to_owned()))
    }
    fn emit_bool(&mut self, key: Key, val: bool) -> slog::Result {
        self.put(key, Value::Bool(val))
    }
    fn emit_serde(&mut self, key: Key, val: &dyn SerdeValue) -> slog::Result {
        let value = serde_json::to_value(val.as_serde()).map_err(io::Error::from)?;
        self.put(key, value)
    }
    fn emit_none(&mut self, key: Key) -> slog::Result {
        self.put(key, Value::Null)
    }
    fn emit_unit(&mut self, key: Key) -> slog::Result {
        self.put(key, Value::Null)
    }
    fn emit_f64(&mut self, key: Key, val: f64) -> slog::Result {
        let value = Number::from_f64(val).map_or(Value::Null, Value::Number);
        self.put(key, value)
    }
    fn emit_f32(&mut self, key: Key, val: f32) -> slog::Result {
        self.emit_f64(key, f64::from(val))
    }
    emit_number!(emit_u8, u8);
    emit_number!(emit_u16, u16);
    emit_number!(emit_u32, u32);
    emit_number!(emit_u64, u64);
    emit_number!(emit_usize, usize);
    emit_number!(emit_i8, i8);
    emit_number!(emit_i16, i16);
    emit_number!(emit_i32, i32);
    emit_number!(emit_i64, i64);
    emit_number!(emit_isize, isize);
}

/// A log record together with everything outputs need to render it.
pub struct Entry<'a> {
    pub(crate) record: &'a Record<'a>,
    pub(crate) severity: Severity,
    pub(crate) logger: String,
    pub(crate) extras: Extras,
    pub(crate) time: DateTime<Utc>,
}
impl<'a> Entry<'a> {
    /// Collects `record` and the values of the logger that emitted it.
    ///
    /// Record fields take precedence over logger fields, and fields of a
    /// child logger over those of its parents.
    pub fn new(record: &'a Record<'a>, values: &OwnedKVList) -> slog::Result<Self> {
        let mut extras = Extras::new();
        let mut logger = None;
        {
            let mut collector = Collector {
                extras: &mut extras,
                logger: &mut logger,
            };
            record.kv().serialize(record, &mut collector)?;
            values.serialize(record, &mut collector)?;
        }
        let logger = logger.unwrap_or_else(|| {
            if record.tag().is_empty() {
                record.module().to_owned()
            } else {
                record.tag().to_owned()
            }
        });
        Ok(Entry {
            record,
            severity: Severity::from(record.level()),
            logger,
            extras,
            time: Utc::now(),
        })
    }

    /// The underlying slog record.
    pub fn record(&self) -> &Record<'a> {
        self.record
    }

    /// The severity of this record.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The name of the logger which emitted this record.
    pub fn logger_name(&self) -> &str {
        &self.logger
    }

    /// The extra fields of this record.
    pub fn extras(&self) -> &Extras {
        &self.extras
    }

    /// When the record was collected.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// The rendered message.
    pub fn message(&self) -> String {
        self.record.msg().to_string()
    }

    /// Looks a builtin field up by name.
    ///
    /// The names are `asctime`, `created`, `process`, `thread`, `levelname`,
    /// `levelno`, `name`, `message`, `module`, `file`, `line` and `function`.
    pub fn builtin_field(&self, name: &str, timezone: TimeZone) -> Option<Value> {
        let value = match name {
            "asctime" => Value::String(asctime(&self.time, timezone)),
            "created" => {
                let secs = self.time.timestamp() as f64
                    + f64::from(self.time.timestamp_subsec_micros()) / 1_000_000.0;
                Number::from_f64(secs).map_or(Value::Null, Value::Number)
            }
            "process" => Value::from(std::process::id()),
            "thread" => Value::String(
                thread::current()
                    .name()
                    .map(ToOwned::to_owned)
                    .unwrap_or_else(|| format!("{:?}", thread::current().id())),
            ),
            "levelname" => Value::String(self.severity.name().to_owned()),
            "levelno" => Value::from(self.severity.number()),
            "name" => Value::String(self.logger.clone()),
            "message" => Value::String(self.message()),
            "module" => Value::String(self.record.module().to_owned()),
            "file" => Value::String(self.record.file().to_owned()),
            "line" => Value::from(self.record.line()),
            "function" => Value::String(self.record.function().to_owned()),
            _ => return None,
        };
        Some(value)
    }
}

/// Returns `true` if `name` is a builtin field of [`Entry`](struct.Entry.html).
pub fn is_builtin_field(name: &str) -> bool {
    matches!(
        name,
        "asctime"
            | "created"
            | "process"
            | "thread"
            | "levelname"
            | "levelno"
            | "name"
            | "message"
            | "module"
            | "file"
            | "line"
            | "function"
    )
}

/// Renders a value the way text outputs show it: strings without quotes.
pub fn value_to_text(value: &Value) -> String {
    match *value {
        Value::String(ref s) => s.clone(),
        ref other => other.to_string(),
    }
}

/// Formats `time` like `2017-06-13 21:41:07,512`.
pub fn asctime(time: &DateTime<Utc>, timezone: TimeZone) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";
    match timezone {
        TimeZone::Utc => time.format(FORMAT).to_string(),
        TimeZone::Local => time.with_timezone(&Local).format(FORMAT).to_string(),
    }
}
