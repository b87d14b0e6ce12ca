//! Outputs writing to the standard streams or to any writer.
use crate::format::{Format, FormatterConfig};
use crate::output::{Build, BuilderCommon, Config, Handler, Output};
use crate::record::Entry;
use crate::types::Severity;
use crate::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// A standard stream.
///
/// # Examples
///
/// ```
/// use daiquiri::stream::Destination;
///
/// assert_eq!(Destination::default(), Destination::Stderr);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Standard output.
    Stdout,

    /// Standard error.
    Stderr,
}
impl Destination {
    fn is_terminal(self) -> bool {
        match self {
            Destination::Stdout => io::stdout().is_terminal(),
            Destination::Stderr => io::stderr().is_terminal(),
        }
    }
}
impl Default for Destination {
    fn default() -> Self {
        Destination::Stderr
    }
}
impl FromStr for Destination {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stdout" => Ok(Destination::Stdout),
            "stderr" => Ok(Destination::Stderr),
            _ => track_panic!(ErrorKind::Invalid, "Undefined destination: {:?}", s),
        }
    }
}

enum Target {
    Std(Destination),
    Writer(Mutex<Box<dyn Write + Send>>),
}

/// A handler writing one line per record to a stream.
pub struct StreamHandler {
    target: Target,
    is_tty: bool,
}
impl StreamHandler {
    /// Makes a handler for a standard stream.
    ///
    /// Whether the stream is a terminal is detected once, here.
    pub fn new(destination: Destination) -> Self {
        StreamHandler {
            target: Target::Std(destination),
            is_tty: destination.is_terminal(),
        }
    }

    /// Makes a handler for an arbitrary writer, which is not a terminal.
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        StreamHandler {
            target: Target::Writer(Mutex::new(Box::new(writer))),
            is_tty: false,
        }
    }

    /// Returns `true` if records are written to a terminal.
    pub fn is_tty(&self) -> bool {
        self.is_tty
    }
}
impl Handler for StreamHandler {
    fn emit(&self, entry: &Entry, formatter: &dyn Format) -> io::Result<()> {
        let mut line = formatter.format(entry, self.is_tty);
        line.push('\n');
        match self.target {
            Target::Std(Destination::Stdout) => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
            Target::Std(Destination::Stderr) => {
                let mut out = io::stderr().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
            Target::Writer(ref writer) => {
                let mut writer = writer.lock().unwrap_or_else(|e| e.into_inner());
                writer.write_all(line.as_bytes())?;
                writer.flush()
            }
        }
    }
}
impl fmt::Debug for StreamHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let target = match self.target {
            Target::Std(Destination::Stdout) => "stdout",
            Target::Std(Destination::Stderr) => "stderr",
            Target::Writer(_) => "writer",
        };
        f.debug_struct("StreamHandler")
            .field("target", &target)
            .field("is_tty", &self.is_tty)
            .finish()
    }
}

/// A builder of outputs writing to a standard stream.
///
/// # Examples
///
/// ```
/// use daiquiri::stream::{Destination, StreamBuilder};
/// use daiquiri::types::Severity;
/// use daiquiri::Build;
///
/// let output = StreamBuilder::new()
///     .destination(Destination::Stdout)
///     .level(Severity::Info)
///     .build()
///     .unwrap();
/// assert_eq!(output.level(), Some(Severity::Info));
/// ```
#[derive(Debug)]
pub struct StreamBuilder {
    common: BuilderCommon,
    destination: Destination,
}
impl StreamBuilder {
    /// Makes a new `StreamBuilder` instance writing to the standard error.
    pub fn new() -> Self {
        StreamBuilder {
            common: BuilderCommon::default(),
            destination: Destination::default(),
        }
    }

    /// Sets the destination to which log records will be outputted.
    pub fn destination(&mut self, destination: Destination) -> &mut Self {
        self.destination = destination;
        self
    }

    /// Sets the minimum severity of this output.
    pub fn level(&mut self, severity: Severity) -> &mut Self {
        self.common.level = Some(severity);
        self
    }

    /// Sets the formatter of this output.
    pub fn formatter<F: Format + 'static>(&mut self, formatter: F) -> &mut Self {
        self.common.formatter = Some(Arc::new(formatter));
        self
    }
}
impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl Build for StreamBuilder {
    fn build(&self) -> Result<Output> {
        Ok(self.common.finish(StreamHandler::new(self.destination)))
    }
}

/// The configuration of `StreamBuilder`.
///
/// # Examples
///
/// ```
/// use daiquiri::stream::StreamConfig;
///
/// let toml = r#"
/// destination = "stdout"
/// level = "info"
/// "#;
/// let _config: StreamConfig = serdeconv::from_toml_str(toml).unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Standard stream to write to.
    pub destination: Destination,

    /// Minimum severity of this output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Severity>,

    /// Formatter of this output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<FormatterConfig>,
}
impl Config for StreamConfig {
    type Builder = StreamBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        let mut builder = StreamBuilder::new();
        builder.destination(self.destination);
        track!(builder
            .common
            .configure(self.level, self.formatter.as_ref()))?;
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TextFormatter;
    use crate::record::Extras;
    use crate::test_util::{with_entry, SharedBuffer};
    use slog::{o, Level, OwnedKVList};

    #[test]
    fn writer_handler_appends_lines() {
        let buffer = SharedBuffer::new();
        let handler = StreamHandler::from_writer(buffer.clone());
        assert!(!handler.is_tty());
        let formatter = TextFormatter::with_format("{color}{name}: {message}").unwrap();
        let values: OwnedKVList = o!().into();
        for msg in &["one", "two"] {
            with_entry(Level::Info, "stream", msg, &Extras::new(), &values, |e| {
                handler.emit(e, &formatter).unwrap()
            });
        }
        assert_eq!(buffer.contents(), "stream: one\nstream: two\n");
    }

    #[test]
    fn config_to_builder() {
        let config: StreamConfig = serdeconv::from_toml_str(
            r#"
destination = "stdout"

[formatter]
type = "json"
"#,
        )
        .unwrap();
        let builder = config.try_to_builder().unwrap();
        assert_eq!(builder.destination, Destination::Stdout);
        assert!(builder.common.formatter.is_some());
        assert!(builder.common.level.is_none());
    }
}
