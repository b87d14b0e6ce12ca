//! Output that sends records to the systemd journal. Unix-like platforms only.
//!
//! Records are written with journald's [native protocol]: one datagram per
//! record on the journal socket, carrying the formatted message and a set of
//! fields (`PRIORITY`, `CODE_FILE`, `LOGGER_NAME`, ... and every extra field,
//! upper-cased).
//!
//! [native protocol]: https://systemd.io/JOURNAL_NATIVE_PROTOCOL/
#![cfg(unix)]
use crate::format::{Format, FormatterConfig};
use crate::misc::program_name;
use crate::output::{Build, BuilderCommon, Config, Handler, Output};
use crate::record::{value_to_text, Entry};
use crate::types::{Severity, TimeZone};
use crate::{Error, ErrorKind, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where journald listens for native protocol datagrams.
pub const JOURNAL_SOCKET: &str = "/run/systemd/journal/socket";

const MAX_FIELD_NAME_LEN: usize = 64;

static INVALID_FIELD_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Z0-9_]").expect("never fails"));

/// Turns an extra field key into a valid journal field name.
///
/// Returns `None` when nothing usable is left.
fn field_name(key: &str) -> Option<String> {
    let upper = key.to_ascii_uppercase();
    let cleaned = INVALID_FIELD_CHARS.replace_all(&upper, "_");
    let trimmed = cleaned.trim_start_matches('_');
    if trimmed.is_empty() {
        return None;
    }
    let mut name = if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("X{}", trimmed)
    } else {
        trimmed.to_owned()
    };
    name.truncate(MAX_FIELD_NAME_LEN);
    Some(name)
}

/// Appends one field in the native protocol encoding.
fn encode_field(buf: &mut Vec<u8>, name: &str, value: &str) {
    buf.extend_from_slice(name.as_bytes());
    if value.contains('\n') {
        buf.push(b'\n');
        buf.extend_from_slice(&(value.len() as u64).to_le_bytes());
    } else {
        buf.push(b'=');
    }
    buf.extend_from_slice(value.as_bytes());
    buf.push(b'\n');
}

fn priority(severity: Severity) -> u8 {
    match severity {
        Severity::Critical => 2,
        Severity::Error => 3,
        Severity::Warning => 4,
        Severity::Info => 6,
        Severity::Debug | Severity::Trace => 7,
    }
}

/// A handler sending records to journald.
#[derive(Debug)]
pub struct JournalHandler {
    socket: UnixDatagram,
    socket_path: PathBuf,
    identifier: String,
}
impl JournalHandler {
    fn fields(&self, entry: &Entry, formatter: &dyn Format) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for (key, value) in entry.extras() {
            if let Some(name) = field_name(key) {
                fields.insert(name, value_to_text(value));
            }
        }
        let record = entry.record();
        let mut put = |name: &str, value: String| {
            fields.insert(name.to_owned(), value);
        };
        put("MESSAGE", formatter.format(entry, false));
        put("PRIORITY", priority(entry.severity()).to_string());
        put("CODE_FILE", record.file().to_owned());
        put("CODE_LINE", record.line().to_string());
        if !record.function().is_empty() {
            put("CODE_FUNC", record.function().to_owned());
        }
        if let Some(thread) = entry.builtin_field("thread", TimeZone::Utc) {
            put("THREAD_NAME", value_to_text(&thread));
        }
        put("LOGGER_NAME", entry.logger_name().to_owned());
        put("LOGGER_LEVEL", entry.severity().name().to_owned());
        put("SYSLOG_IDENTIFIER", self.identifier.clone());
        fields
    }
}
impl Handler for JournalHandler {
    fn emit(&self, entry: &Entry, formatter: &dyn Format) -> io::Result<()> {
        let mut buf = Vec::new();
        for (name, value) in &self.fields(entry, formatter) {
            encode_field(&mut buf, name, value);
        }
        self.socket.send_to(&buf, &self.socket_path)?;
        Ok(())
    }
}

/// A builder of outputs sending records to journald.
///
/// # Examples
///
/// ```no_run
/// use daiquiri::journal::JournalBuilder;
/// use daiquiri::Build;
///
/// let output = JournalBuilder::new().program_name("example-app").build().unwrap();
/// # drop(output);
/// ```
#[derive(Debug)]
pub struct JournalBuilder {
    common: BuilderCommon,
    program_name: Option<String>,
    socket_path: PathBuf,
}
impl JournalBuilder {
    /// Makes a new `JournalBuilder` instance.
    pub fn new() -> Self {
        JournalBuilder {
            common: BuilderCommon::default(),
            program_name: None,
            socket_path: PathBuf::from(JOURNAL_SOCKET),
        }
    }

    /// Sets the `SYSLOG_IDENTIFIER` of records (the program name by default).
    pub fn program_name(&mut self, name: &str) -> &mut Self {
        self.program_name = Some(name.to_owned());
        self
    }

    /// Sets the path of the journal socket.
    pub fn socket_path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.socket_path = path.as_ref().to_path_buf();
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
impl Default for JournalBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl Build for JournalBuilder {
    fn build(&self) -> Result<Output> {
        track_assert!(
            self.socket_path.exists(),
            ErrorKind::Unavailable,
            "journald socket {:?} not found",
            self.socket_path
        );
        let socket = track!(UnixDatagram::unbound().map_err(Error::from))?;
        let handler = JournalHandler {
            socket,
            socket_path: self.socket_path.clone(),
            identifier: self.program_name.clone().unwrap_or_else(program_name),
        };
        Ok(self.common.finish(handler))
    }
}

/// The configuration of `JournalBuilder`.
///
/// # Examples
///
/// ```
/// use daiquiri::journal::JournalConfig;
///
/// let toml = r#"
/// program_name = "example-app"
/// level = "info"
/// "#;
/// let _config: JournalConfig = serdeconv::from_toml_str(toml).unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// `SYSLOG_IDENTIFIER` of records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,

    /// Path of the journal socket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,

    /// Minimum severity of this output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Severity>,

    /// Formatter of this output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<FormatterConfig>,
}
impl Config for JournalConfig {
    type Builder = JournalBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        let mut builder = JournalBuilder::new();
        if let Some(ref name) = self.program_name {
            builder.program_name(name);
        }
        if let Some(ref path) = self.socket_path {
            builder.socket_path(path);
        }
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
    use crate::test_util::with_entry;
    use slog::{o, Level, OwnedKVList};

    fn parse(datagram: &[u8]) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        let mut rest = datagram;
        while !rest.is_empty() {
            let end = rest.iter().position(|&b| b == b'\n' || b == b'=').unwrap();
            let name = String::from_utf8(rest[..end].to_vec()).unwrap();
            if rest[end] == b'=' {
                let line_end = end + rest[end..].iter().position(|&b| b == b'\n').unwrap();
                let value = String::from_utf8(rest[end + 1..line_end].to_vec()).unwrap();
                fields.insert(name, value);
                rest = &rest[line_end + 1..];
            } else {
                let mut len = [0; 8];
                len.copy_from_slice(&rest[end + 1..end + 9]);
                let len = u64::from_le_bytes(len) as usize;
                let value = String::from_utf8(rest[end + 9..end + 9 + len].to_vec()).unwrap();
                fields.insert(name, value);
                rest = &rest[end + 9 + len + 1..];
            }
        }
        fields
    }

    #[test]
    fn sends_native_protocol_datagrams() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("journal.sock");
        let server = UnixDatagram::bind(&socket_path).unwrap();

        let output = JournalBuilder::new()
            .program_name("journal-test")
            .socket_path(&socket_path)
            .formatter(TextFormatter::with_format("{message}").unwrap())
            .build()
            .unwrap();
        let extras = crate::extras! { "request-id" => 42, "multi" => "line one\nline two" };
        let values: OwnedKVList = o!().into();
        with_entry(Level::Warning, "my.logger", "hello journal", &extras, &values, |e| {
            output.emit(e).unwrap()
        });

        let mut buf = vec![0; 65536];
        let len = server.recv(&mut buf).unwrap();
        let fields = parse(&buf[..len]);
        assert_eq!(fields["MESSAGE"], "hello journal");
        assert_eq!(fields["PRIORITY"], "4");
        assert_eq!(fields["LOGGER_NAME"], "my.logger");
        assert_eq!(fields["LOGGER_LEVEL"], "WARNING");
        assert_eq!(fields["SYSLOG_IDENTIFIER"], "journal-test");
        assert_eq!(fields["REQUEST_ID"], "42");
        assert_eq!(fields["MULTI"], "line one\nline two");
        assert!(fields["CODE_FILE"].ends_with("test_util.rs"));
        assert!(fields.contains_key("CODE_LINE"));
        assert!(fields.contains_key("THREAD_NAME"));
    }

    #[test]
    fn missing_socket_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let e = JournalBuilder::new()
            .socket_path(dir.path().join("absent.sock"))
            .build()
            .unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn field_names_are_sanitized() {
        assert_eq!(field_name("user_id").as_deref(), Some("USER_ID"));
        assert_eq!(field_name("__private").as_deref(), Some("PRIVATE"));
        assert_eq!(field_name("2fa").as_deref(), Some("X2FA"));
        assert_eq!(field_name("a.b-c").as_deref(), Some("A_B_C"));
        assert_eq!(field_name("__"), None);
        assert_eq!(field_name(&"k".repeat(100)).unwrap().len(), 64);
    }

    #[test]
    fn multiline_values_use_the_binary_form() {
        let mut buf = Vec::new();
        encode_field(&mut buf, "A", "x");
        encode_field(&mut buf, "B", "1\n2");
        let mut expected = b"A=x\nB\n".to_vec();
        expected.extend_from_slice(&3u64.to_le_bytes());
        expected.extend_from_slice(b"1\n2\n");
        assert_eq!(buf, expected);
    }
}
