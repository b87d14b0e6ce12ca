//! Formatters turning collected records into lines of text.
//!
//! # Examples
//!
//! ```
//! use daiquiri::format::{FormatterConfig, JsonFormatter};
//!
//! let config: FormatterConfig = serdeconv::from_toml_str(r#"
//! type = "json"
//! fields = ["message", "levelname", "name"]
//! timestamp = true
//! "#).unwrap();
//! assert!(config.build().is_ok());
//!
//! let formatter = JsonFormatter::new().timestamp(true);
//! # let _ = formatter;
//! ```
use crate::record::Entry;
use crate::types::TimeZone;
use crate::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

pub use self::json::{DatadogFormatter, JsonFormatter};
pub use self::template::Template;
pub use self::text::{TextFormatter, DEFAULT_EXTRAS_FORMAT, DEFAULT_FORMAT};

mod json;
mod template;
mod text;

/// Converts a record into one line of output (without the trailing newline).
pub trait Format: Send + Sync + RefUnwindSafe + UnwindSafe + Debug {
    /// Renders `entry`.
    ///
    /// `is_tty` tells whether the destination is a terminal, which
    /// color-aware formatters use to decide whether to emit escapes.
    fn format(&self, entry: &Entry, is_tty: bool) -> String;
}
impl<F: Format + ?Sized> Format for Arc<F> {
    fn format(&self, entry: &Entry, is_tty: bool) -> String {
        (**self).format(entry, is_tty)
    }
}
impl<F: Format + ?Sized> Format for Box<F> {
    fn format(&self, entry: &Entry, is_tty: bool) -> String {
        (**self).format(entry, is_tty)
    }
}

/// When text formatters emit terminal color escapes.
///
/// # Examples
///
/// ```
/// use daiquiri::format::ColorMode;
///
/// assert_eq!(ColorMode::default(), ColorMode::Auto);
/// assert!(ColorMode::Auto.is_enabled(true));
/// assert!(!ColorMode::Auto.is_enabled(false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Only when writing to a terminal.
    Auto,

    /// Always.
    Always,

    /// Never.
    Never,
}
impl ColorMode {
    /// Returns `true` if colors should be emitted for a destination.
    pub fn is_enabled(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}
impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Auto
    }
}
impl FromStr for ColorMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            _ => track_panic!(ErrorKind::Invalid, "Undefined color mode: {:?}", s),
        }
    }
}

/// The configuration of a formatter.
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
pub enum FormatterConfig {
    Text(TextFormatterConfig),
    Json(JsonFormatterConfig),
    Datadog(DatadogFormatterConfig),
}
impl FormatterConfig {
    /// Builds the configured formatter.
    pub fn build(&self) -> Result<Arc<dyn Format>> {
        Ok(match *self {
            FormatterConfig::Text(ref c) => Arc::new(track!(c.build())?),
            FormatterConfig::Json(ref c) => Arc::new(c.build()),
            FormatterConfig::Datadog(ref c) => Arc::new(c.build()),
        })
    }
}

/// The configuration of `TextFormatter`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextFormatterConfig {
    pub format: String,
    pub keywords: Vec<String>,
    pub extras_template: String,
    pub extras_separator: String,
    pub extras_prefix: String,
    pub extras_suffix: String,
    pub color: ColorMode,
    pub timezone: TimeZone,
}
impl TextFormatterConfig {
    fn build(&self) -> Result<TextFormatter> {
        let formatter = track!(TextFormatter::with_format(&self.format))?
            .keywords_extend(self.keywords.iter().cloned());
        let formatter = track!(formatter.extras_template(&self.extras_template))?;
        Ok(formatter
            .extras_separator(self.extras_separator.clone())
            .extras_prefix(self.extras_prefix.clone())
            .extras_suffix(self.extras_suffix.clone())
            .color(self.color)
            .timezone(self.timezone))
    }
}
impl Default for TextFormatterConfig {
    fn default() -> Self {
        TextFormatterConfig {
            format: DEFAULT_EXTRAS_FORMAT.to_owned(),
            keywords: Vec::new(),
            extras_template: "[{key}: {value}]".to_owned(),
            extras_separator: " ".to_owned(),
            extras_prefix: " ".to_owned(),
            extras_suffix: String::new(),
            color: ColorMode::default(),
            timezone: TimeZone::default(),
        }
    }
}

/// The configuration of `JsonFormatter`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFormatterConfig {
    pub fields: Vec<String>,
    pub timestamp: bool,
}
impl JsonFormatterConfig {
    fn build(&self) -> JsonFormatter {
        JsonFormatter::new()
            .fields(self.fields.iter().cloned())
            .timestamp(self.timestamp)
    }
}
impl Default for JsonFormatterConfig {
    fn default() -> Self {
        JsonFormatterConfig {
            fields: vec!["message".to_owned()],
            timestamp: false,
        }
    }
}

/// The configuration of `DatadogFormatter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatadogFormatterConfig {}
impl DatadogFormatterConfig {
    fn build(&self) -> DatadogFormatter {
        DatadogFormatter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatter_configs() {
        let text: FormatterConfig = serdeconv::from_toml_str(
            r#"
type = "text"
format = "{name}: {message}"
color = "never"
"#,
        )
        .unwrap();
        match text {
            FormatterConfig::Text(ref c) => {
                assert_eq!(c.format, "{name}: {message}");
                assert_eq!(c.color, ColorMode::Never);
                assert_eq!(c.extras_template, "[{key}: {value}]");
                assert_eq!(c.extras_separator, " ");
                assert_eq!(c.extras_prefix, " ");
            }
            ref other => panic!("unexpected config: {:?}", other),
        }
        assert!(text.build().is_ok());

        let json: FormatterConfig = serdeconv::from_toml_str(r#"type = "json""#).unwrap();
        match json {
            FormatterConfig::Json(ref c) => assert_eq!(c.fields, ["message"]),
            ref other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn bad_template_is_invalid() {
        let config: FormatterConfig = serdeconv::from_toml_str(
            r#"
type = "text"
format = "{oops"
"#,
        )
        .unwrap();
        assert_eq!(*config.build().unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[test]
    fn color_mode_from_str() {
        assert_eq!("always".parse::<ColorMode>().unwrap(), ColorMode::Always);
        assert!("rainbow".parse::<ColorMode>().is_err());
    }
}
