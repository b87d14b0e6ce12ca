//! Outputs: a handler writing to a destination, paired with a formatter.
use crate::datadog::{DatadogBuilder, DatadogConfig};
#[cfg(not(unix))]
use crate::fake_syslog::UnixOnly;
use crate::file::{
    FileBuilder, FileConfig, RotatingFileBuilder, RotatingFileConfig, TimedRotatingFileBuilder,
    TimedRotatingFileConfig,
};
use crate::format::{Format, FormatterConfig, TextFormatter};
#[cfg(unix)]
use crate::journal::{JournalBuilder, JournalConfig};
use crate::record::Entry;
use crate::stream::{Destination, StreamBuilder, StreamConfig, StreamHandler};
#[cfg(unix)]
use crate::syslog::{SyslogBuilder, SyslogConfig};
use crate::types::Severity;
use crate::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::panic::{RefUnwindSafe, UnwindSafe};
use std::sync::Arc;

/// Writes formatted records to a destination.
///
/// Handlers are shared between threads, so implementations serialize
/// access to their destination themselves.
pub trait Handler: Send + Sync + RefUnwindSafe + UnwindSafe + fmt::Debug {
    /// Formats `entry` with `formatter` and writes it out.
    fn emit(&self, entry: &Entry, formatter: &dyn Format) -> io::Result<()>;

    /// Rotates the destination right away.
    ///
    /// Only rotating file handlers support this.
    fn do_rollover(&self) -> Result<()> {
        track_panic!(ErrorKind::Invalid, "This output does not support rollover")
    }
}

/// A handler, the formatter it renders records with and an optional
/// minimum severity of its own.
///
/// # Examples
///
/// ```
/// use daiquiri::format::JsonFormatter;
/// use daiquiri::types::Severity;
/// use daiquiri::Output;
///
/// let output = Output::stdout()
///     .with_formatter(JsonFormatter::new())
///     .with_level(Some(Severity::Info));
/// assert_eq!(output.level(), Some(Severity::Info));
///
/// assert!(Output::preconfigured("stderr").is_ok());
/// assert!(Output::preconfigured("foobar").is_err());
/// ```
#[derive(Clone)]
pub struct Output {
    handler: Arc<dyn Handler>,
    formatter: Arc<dyn Format>,
    level: Option<Severity>,
}
impl Output {
    /// Makes an output rendering records with the default `TextFormatter`.
    pub fn new<H: Handler + 'static>(handler: H) -> Self {
        Output {
            handler: Arc::new(handler),
            formatter: Arc::new(TextFormatter::new()),
            level: None,
        }
    }

    /// An output writing to the standard error.
    pub fn stderr() -> Self {
        Output::new(StreamHandler::new(Destination::Stderr))
    }

    /// An output writing to the standard output.
    pub fn stdout() -> Self {
        Output::new(StreamHandler::new(Destination::Stdout))
    }

    /// An output writing to any writer, which is never treated as a terminal.
    pub fn stream<W: io::Write + Send + 'static>(writer: W) -> Self {
        Output::new(StreamHandler::from_writer(writer))
    }

    /// Resolves a preconfigured output by name.
    ///
    /// The names are `stderr`, `stdout`, `syslog` and `journal` (the last two
    /// on Unix-like platforms only).
    ///
    /// # Errors
    ///
    /// `ErrorKind::Invalid` for an unknown name, `ErrorKind::Unavailable`
    /// when the backend cannot be used on this host.
    pub fn preconfigured(name: &str) -> Result<Self> {
        match name {
            "stderr" => Ok(Output::stderr()),
            "stdout" => Ok(Output::stdout()),
            #[cfg(unix)]
            "syslog" => track!(SyslogBuilder::new().build()),
            #[cfg(unix)]
            "journal" => track!(JournalBuilder::new().build()),
            #[cfg(not(unix))]
            "syslog" | "journal" => track_panic!(
                ErrorKind::Unavailable,
                "Output {} is not supported on this platform",
                name
            ),
            _ => track_panic!(ErrorKind::Invalid, "Output {} is not available", name),
        }
    }

    /// Replaces the formatter.
    pub fn with_formatter<F: Format + 'static>(self, formatter: F) -> Self {
        self.with_formatter_arc(Arc::new(formatter))
    }

    /// Replaces the formatter with a shared one.
    pub fn with_formatter_arc(mut self, formatter: Arc<dyn Format>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Sets the minimum severity of this output.
    ///
    /// `None` lets every record accepted by the logger through.
    pub fn with_level(mut self, level: Option<Severity>) -> Self {
        self.level = level;
        self
    }

    /// The minimum severity of this output.
    pub fn level(&self) -> Option<Severity> {
        self.level
    }

    /// The formatter of this output.
    pub fn formatter(&self) -> &Arc<dyn Format> {
        &self.formatter
    }

    /// The handler of this output.
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Rotates the destination right away.
    ///
    /// # Errors
    ///
    /// `ErrorKind::Invalid` if this is not a rotating file output.
    pub fn do_rollover(&self) -> Result<()> {
        track!(self.handler.do_rollover())
    }

    /// Returns `true` if this output takes records of `severity`.
    pub fn is_enabled(&self, severity: Severity) -> bool {
        self.level.map_or(true, |level| severity >= level)
    }

    pub(crate) fn emit(&self, entry: &Entry) -> io::Result<()> {
        if !self.is_enabled(entry.severity()) {
            return Ok(());
        }
        self.handler.emit(entry, &*self.formatter)
    }
}
impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Output")
            .field("handler", &self.handler)
            .field("formatter", &self.formatter)
            .field("level", &self.level)
            .finish()
    }
}

/// An output given to setup: either the name of a preconfigured output or
/// an output built by the application.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub enum OutputSpec {
    Name(String),
    Output(Output),
}
impl OutputSpec {
    /// Resolves this into an output.
    pub fn resolve(&self) -> Result<Output> {
        match *self {
            OutputSpec::Name(ref name) => track!(Output::preconfigured(name)),
            OutputSpec::Output(ref output) => Ok(output.clone()),
        }
    }
}
impl<'a> From<&'a str> for OutputSpec {
    fn from(f: &'a str) -> Self {
        OutputSpec::Name(f.to_owned())
    }
}
impl From<String> for OutputSpec {
    fn from(f: String) -> Self {
        OutputSpec::Name(f)
    }
}
impl From<Output> for OutputSpec {
    fn from(f: Output) -> Self {
        OutputSpec::Output(f)
    }
}

/// This trait allows to build an output instance.
pub trait Build {
    /// Builds an output.
    fn build(&self) -> Result<Output>;
}

/// Settings shared by every output builder.
#[derive(Debug, Clone, Default)]
pub(crate) struct BuilderCommon {
    pub level: Option<Severity>,
    pub formatter: Option<Arc<dyn Format>>,
}
impl BuilderCommon {
    pub fn configure(
        &mut self,
        level: Option<Severity>,
        formatter: Option<&FormatterConfig>,
    ) -> Result<()> {
        self.level = level;
        if let Some(formatter) = formatter {
            self.formatter = Some(track!(formatter.build())?);
        }
        Ok(())
    }

    pub fn finish<H: Handler + 'static>(&self, handler: H) -> Output {
        let output = Output::new(handler).with_level(self.level);
        match self.formatter {
            Some(ref formatter) => output.with_formatter_arc(formatter.clone()),
            None => output,
        }
    }
}

/// An output builder of any kind.
#[allow(missing_docs)]
#[derive(Debug)]
pub enum OutputBuilder {
    Stream(StreamBuilder),
    File(FileBuilder),
    RotatingFile(RotatingFileBuilder),
    TimedRotatingFile(TimedRotatingFileBuilder),
    #[cfg(unix)]
    Syslog(SyslogBuilder),
    #[cfg(unix)]
    Journal(JournalBuilder),
    Datadog(DatadogBuilder),
}
impl Build for OutputBuilder {
    fn build(&self) -> Result<Output> {
        match *self {
            OutputBuilder::Stream(ref b) => track!(b.build()),
            OutputBuilder::File(ref b) => track!(b.build()),
            OutputBuilder::RotatingFile(ref b) => track!(b.build()),
            OutputBuilder::TimedRotatingFile(ref b) => track!(b.build()),
            #[cfg(unix)]
            OutputBuilder::Syslog(ref b) => track!(b.build()),
            #[cfg(unix)]
            OutputBuilder::Journal(ref b) => track!(b.build()),
            OutputBuilder::Datadog(ref b) => track!(b.build()),
        }
    }
}

/// Configuration of an output builder.
pub trait Config {
    /// Output builder.
    type Builder: Build;

    /// Makes an output builder associated with this configuration.
    fn try_to_builder(&self) -> Result<Self::Builder>;

    /// Builds an output with this configuration.
    fn build_output(&self) -> Result<Output> {
        let builder = track!(self.try_to_builder())?;
        let output = track!(builder.build())?;
        Ok(output)
    }
}

/// The configuration of `OutputBuilder`.
///
/// # Examples
///
/// ```
/// use daiquiri::OutputConfig;
///
/// let toml = r#"
/// type = "rotating_file"
/// filename = "/var/log/app.log"
/// max_size_bytes = 1048576
/// backup_count = 3
/// level = "info"
///
/// [formatter]
/// type = "json"
/// "#;
/// let _config: OutputConfig = serdeconv::from_toml_str(toml).unwrap();
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum OutputConfig {
    Stream(StreamConfig),
    File(FileConfig),
    RotatingFile(RotatingFileConfig),
    TimedRotatingFile(TimedRotatingFileConfig),
    #[cfg(unix)]
    Syslog(SyslogConfig),
    #[cfg(not(unix))]
    #[doc(hidden)]
    Syslog(UnixOnly),
    #[cfg(unix)]
    Journal(JournalConfig),
    #[cfg(not(unix))]
    #[doc(hidden)]
    Journal(UnixOnly),
    Datadog(DatadogConfig),
}
impl Config for OutputConfig {
    type Builder = OutputBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        match *self {
            OutputConfig::Stream(ref c) => track!(c.try_to_builder()).map(OutputBuilder::Stream),
            OutputConfig::File(ref c) => track!(c.try_to_builder()).map(OutputBuilder::File),
            OutputConfig::RotatingFile(ref c) => {
                track!(c.try_to_builder()).map(OutputBuilder::RotatingFile)
            }
            OutputConfig::TimedRotatingFile(ref c) => {
                track!(c.try_to_builder()).map(OutputBuilder::TimedRotatingFile)
            }
            #[cfg(unix)]
            OutputConfig::Syslog(ref c) => track!(c.try_to_builder()).map(OutputBuilder::Syslog),
            #[cfg(unix)]
            OutputConfig::Journal(ref c) => {
                track!(c.try_to_builder()).map(OutputBuilder::Journal)
            }
            #[cfg(not(unix))]
            OutputConfig::Syslog(ref never) | OutputConfig::Journal(ref never) => match *never {},
            OutputConfig::Datadog(ref c) => track!(c.try_to_builder()).map(OutputBuilder::Datadog),
        }
    }
}

/// An output in a configuration file: a preconfigured output name or a
/// table describing the output.
///
/// # Examples
///
/// ```
/// use daiquiri::OutputSpecConfig;
///
/// #[derive(serde::Deserialize)]
/// struct Outputs {
///     outputs: Vec<OutputSpecConfig>,
/// }
///
/// let toml = r#"
/// outputs = ["stderr", { type = "file", filename = "app.log" }]
/// "#;
/// let outputs: Outputs = serdeconv::from_toml_str(toml).unwrap();
/// assert_eq!(outputs.outputs.len(), 2);
/// ```
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputSpecConfig {
    Name(String),
    Output(OutputConfig),
}
impl OutputSpecConfig {
    /// Resolves this into an output.
    pub fn build_output(&self) -> Result<Output> {
        match *self {
            OutputSpecConfig::Name(ref name) => track!(Output::preconfigured(name)),
            OutputSpecConfig::Output(ref config) => track!(config.build_output()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::JsonFormatter;
    use crate::test_util::{emit, SharedBuffer};
    use slog::Level;

    #[test]
    fn preconfigured_names() {
        assert!(Output::preconfigured("stderr").is_ok());
        assert!(Output::preconfigured("stdout").is_ok());
        let e = Output::preconfigured("foobar").unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::Invalid);
        assert!(e.to_string().contains("Output foobar is not available"));
    }

    #[test]
    fn output_level_filters_records() {
        let buffer = SharedBuffer::new();
        let output = Output::stream(buffer.clone())
            .with_formatter(TextFormatter::with_format("{levelname} {message}").unwrap())
            .with_level(Some(Severity::Error));
        emit(&output, Level::Warning, "quiet");
        emit(&output, Level::Error, "loud");
        assert_eq!(buffer.contents(), "ERROR loud\n");
    }

    #[test]
    fn stream_outputs_do_not_rotate() {
        let e = Output::stream(SharedBuffer::new()).do_rollover().unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn formatter_override() {
        let buffer = SharedBuffer::new();
        let output = Output::stream(buffer.clone()).with_formatter(JsonFormatter::new());
        emit(&output, Level::Info, "json please");
        assert_eq!(buffer.contents(), "{\"message\":\"json please\"}\n");
    }

    #[test]
    fn output_configs() {
        let config: OutputConfig = serdeconv::from_toml_str(
            r#"
type = "stream"
destination = "stdout"
level = "debug"
"#,
        )
        .unwrap();
        let output = config.build_output().unwrap();
        assert_eq!(output.level(), Some(Severity::Debug));

        let config: OutputSpecConfig = serdeconv::from_toml_str(
            r#"
type = "datadog"
port = 10999
"#,
        )
        .unwrap();
        match config {
            OutputSpecConfig::Output(OutputConfig::Datadog(ref c)) => assert_eq!(c.port, 10999),
            ref other => panic!("unexpected config: {:?}", other),
        }
    }
}
