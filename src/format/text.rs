use super::template::Template;
use super::{ColorMode, Format};
use crate::record::{is_builtin_field, value_to_text, Entry};
use crate::types::{Severity, TimeZone};
use crate::Result;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// The default format string, without extra fields.
pub const DEFAULT_FORMAT: &str =
    "{asctime} [{process}] {color}{levelname:<8.8} {name}: {message}{color_stop}";

/// The default format string, with the extra fields right after the logger name.
pub const DEFAULT_EXTRAS_FORMAT: &str =
    "{asctime} [{process}] {color}{levelname:<8.8} {name}{extras}: {message}{color_stop}";

const COLOR_STOP: &str = "\x1b[0m";

fn level_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Trace | Severity::Debug => "\x1b[00;32m",
        Severity::Info => "\x1b[00;36m",
        Severity::Warning => "\x1b[01;33m",
        Severity::Error | Severity::Critical => "\x1b[01;31m",
    }
}

/// Formats records as a line of text.
///
/// Besides the builtin fields of [`Entry`], templates may use:
///
/// - `{extras}`: the extra fields not otherwise referenced, rendered like
///   ` [key: value] [other: value]` (empty when there are none).
/// - `{color}` / `{color_stop}`: terminal color escapes for the record
///   level, empty unless colors are enabled.
/// - any other name: the extra field of that name (a *keyword*). Keywords
///   are left out of `{extras}`, and render empty when a record lacks them.
///
/// # Examples
///
/// ```
/// use daiquiri::format::{ColorMode, TextFormatter};
///
/// let formatter = TextFormatter::with_format("{levelname} {name} {mood}{extras}: {message}")
///     .unwrap()
///     .color(ColorMode::Never);
/// assert!(formatter.keywords().any(|k| k == "mood"));
/// ```
///
/// [`Entry`]: ../record/struct.Entry.html
#[derive(Debug, Clone)]
pub struct TextFormatter {
    template: Template,
    keywords: BTreeSet<String>,
    extras_template: Template,
    extras_separator: String,
    extras_prefix: String,
    extras_suffix: String,
    color: ColorMode,
    timezone: TimeZone,
}
impl TextFormatter {
    /// Makes a formatter using [`DEFAULT_EXTRAS_FORMAT`], colored on terminals.
    ///
    /// [`DEFAULT_EXTRAS_FORMAT`]: constant.DEFAULT_EXTRAS_FORMAT.html
    pub fn new() -> Self {
        Self::from_template(Template::parse(DEFAULT_EXTRAS_FORMAT).expect("never fails"))
    }

    /// Makes a formatter for the given format string.
    pub fn with_format(format: &str) -> Result<Self> {
        let template = track!(Template::parse(format))?;
        Ok(Self::from_template(template))
    }

    fn from_template(template: Template) -> Self {
        let keywords = template
            .fields()
            .filter(|f| !is_builtin_field(f) && !matches!(*f, "extras" | "color" | "color_stop"))
            .map(ToOwned::to_owned)
            .collect();
        TextFormatter {
            template,
            keywords,
            extras_template: Template::parse("[{key}: {value}]").expect("never fails"),
            extras_separator: " ".to_owned(),
            extras_prefix: " ".to_owned(),
            extras_suffix: String::new(),
            color: ColorMode::default(),
            timezone: TimeZone::default(),
        }
    }

    /// Declares additional keywords, which are left out of `{extras}`.
    ///
    /// Keywords referenced by the format string are declared implicitly.
    pub fn keywords_extend<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// Iterates the keywords of this formatter.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Sets how each extra field is rendered; it may use `{key}` and `{value}`.
    ///
    /// The default is `{key}: {value}`.
    pub fn extras_template(mut self, template: &str) -> Result<Self> {
        self.extras_template = track!(Template::parse(template))?;
        Ok(self)
    }

    /// Sets the string placed between extra fields (default `, `).
    pub fn extras_separator(mut self, separator: impl Into<String>) -> Self {
        self.extras_separator = separator.into();
        self
    }

    /// Sets the string placed before the extra fields (default ` [`).
    pub fn extras_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.extras_prefix = prefix.into();
        self
    }

    /// Sets the string placed after the extra fields (default `]`).
    pub fn extras_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.extras_suffix = suffix.into();
        self
    }

    /// Sets when to emit color escapes.
    pub fn color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    /// Sets the time zone of `{asctime}`.
    pub fn timezone(mut self, timezone: TimeZone) -> Self {
        self.timezone = timezone;
        self
    }

    fn render_extras(&self, entry: &Entry) -> String {
        let pairs = entry
            .extras()
            .iter()
            .filter(|(k, _)| !self.keywords.contains(k.as_str()))
            .map(|(k, v)| {
                self.extras_template.render(|field| match field {
                    "key" => Some(Cow::Borrowed(k.as_str())),
                    "value" => Some(Cow::Owned(value_to_text(v))),
                    _ => None,
                })
            })
            .collect::<Vec<_>>();
        if pairs.is_empty() {
            String::new()
        } else {
            format!(
                "{}{}{}",
                self.extras_prefix,
                pairs.join(&self.extras_separator),
                self.extras_suffix
            )
        }
    }
}
impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}
impl Format for TextFormatter {
    fn format(&self, entry: &Entry, is_tty: bool) -> String {
        let colored = self.color.is_enabled(is_tty);
        self.template.render(|field| match field {
            "extras" => Some(Cow::Owned(self.render_extras(entry))),
            "color" if colored => Some(Cow::Borrowed(level_color(entry.severity()))),
            "color_stop" if colored => Some(Cow::Borrowed(COLOR_STOP)),
            "color" | "color_stop" => None,
            _ => entry
                .builtin_field(field, self.timezone)
                .or_else(|| entry.extras().get(field).cloned())
                .map(|v| Cow::Owned(value_to_text(&v))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Extras;
    use crate::test_util::with_entry;
    use slog::{o, Level, OwnedKVList};

    fn format(formatter: &TextFormatter, extras: Extras, is_tty: bool) -> String {
        let values: OwnedKVList = o!().into();
        with_entry(Level::Info, "my_module", "test message", &extras, &values, |entry| {
            formatter.format(entry, is_tty)
        })
    }

    const FORMAT: &str = "{levelname} {name}{extras}: {message}";

    #[test]
    fn no_keywords() {
        let f = TextFormatter::with_format(FORMAT).unwrap();
        assert_eq!(format(&f, Extras::new(), false), "INFO my_module: test message");
    }

    #[test]
    fn no_keywords_with_extras() {
        let f = TextFormatter::with_format(FORMAT).unwrap();
        assert_eq!(
            format(&f, crate::extras! { "test" => "a" }, false),
            "INFO my_module [test: a]: test message"
        );
    }

    #[test]
    fn keywords_are_not_repeated_in_extras() {
        let f = TextFormatter::with_format("{levelname} {name} {test}{extras}: {message}").unwrap();
        assert_eq!(
            format(&f, crate::extras! { "test" => "a" }, false),
            "INFO my_module a: test message"
        );
        assert_eq!(
            format(&f, crate::extras! { "test" => "a", "test2" => "b" }, false),
            "INFO my_module a [test2: b]: test message"
        );
    }

    #[test]
    fn declared_keywords_are_hidden() {
        let f = TextFormatter::with_format(FORMAT)
            .unwrap()
            .keywords_extend(vec!["secret"]);
        assert_eq!(
            format(&f, crate::extras! { "secret" => 1, "b" => 2, "a" => 3 }, false),
            "INFO my_module [a: 3] [b: 2]: test message"
        );
    }

    #[test]
    fn missing_keyword_renders_empty() {
        let f = TextFormatter::with_format("{name} <{subsystem}>: {message}").unwrap();
        assert_eq!(format(&f, Extras::new(), false), "my_module <>: test message");
    }

    #[test]
    fn custom_extras_layout() {
        let f = TextFormatter::with_format(FORMAT)
            .unwrap()
            .extras_template("{key}={value}")
            .unwrap()
            .extras_separator(" ")
            .extras_prefix(" {")
            .extras_suffix("}");
        assert_eq!(
            format(&f, crate::extras! { "x" => 1, "y" => "z" }, false),
            "INFO my_module {x=1 y=z}: test message"
        );
    }

    #[test]
    fn colors_follow_the_tty_hint() {
        let f = TextFormatter::with_format("{color}{levelname}{color_stop}").unwrap();
        assert_eq!(format(&f, Extras::new(), false), "INFO");
        assert_eq!(format(&f, Extras::new(), true), "\x1b[00;36mINFO\x1b[0m");

        let never = f.clone().color(ColorMode::Never);
        assert_eq!(format(&never, Extras::new(), true), "INFO");
        let always = f.color(ColorMode::Always);
        assert_eq!(format(&always, Extras::new(), false), "\x1b[00;36mINFO\x1b[0m");
    }

    #[test]
    fn default_format_pads_the_level() {
        let f = TextFormatter::new().timezone(TimeZone::Utc);
        let line = format(&f, crate::extras! { "key" => "value" }, false);
        let expected_tail = format!(
            " [{}] INFO     my_module [key: value]: test message",
            std::process::id()
        );
        assert!(line.ends_with(&expected_tail), "{}", line);
    }
}
