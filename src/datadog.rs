//! Output that ships records to a Datadog agent listening on a TCP port.
//!
//! Each record is sent as one line of Datadog-flavored JSON (see
//! [`DatadogFormatter`](../format/struct.DatadogFormatter.html)). The
//! connection is opened on the first record. When connecting fails, records
//! are dropped until a retry delay has passed; the delay starts at one second
//! and doubles after each failed attempt, up to thirty seconds.
use crate::format::{DatadogFormatter, Format, FormatterConfig};
use crate::output::{Build, BuilderCommon, Config, Handler, Output};
use crate::record::Entry;
use crate::types::Severity;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// The default host of the Datadog agent.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default port of the Datadog agent's TCP log intake.
pub const DEFAULT_PORT: u16 = 10518;

const RETRY_START: Duration = Duration::from_secs(1);
const RETRY_MAX: Duration = Duration::from_secs(30);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Connection {
    stream: Option<TcpStream>,
    retry_at: Option<Instant>,
    retry_period: Option<Duration>,
}

/// A handler writing newline-terminated lines to a TCP socket.
#[derive(Debug)]
pub struct DatadogHandler {
    host: String,
    port: u16,
    conn: Mutex<Connection>,
}
impl DatadogHandler {
    fn new(host: &str, port: u16) -> Self {
        DatadogHandler {
            host: host.to_owned(),
            port,
            conn: Mutex::new(Connection::default()),
        }
    }

    fn connect(&self, conn: &mut Connection) {
        let now = Instant::now();
        if conn.retry_at.map_or(false, |at| now < at) {
            return;
        }
        let connected = TcpStream::connect((self.host.as_str(), self.port))
            .and_then(|s| s.set_write_timeout(Some(WRITE_TIMEOUT)).map(|()| s));
        match connected {
            Ok(stream) => {
                conn.stream = Some(stream);
                conn.retry_at = None;
                conn.retry_period = None;
            }
            Err(_) => {
                let period = match conn.retry_period {
                    None => RETRY_START,
                    Some(p) => (p * 2).min(RETRY_MAX),
                };
                conn.retry_period = Some(period);
                conn.retry_at = Some(now + period);
            }
        }
    }
}
impl Handler for DatadogHandler {
    fn emit(&self, entry: &Entry, formatter: &dyn Format) -> io::Result<()> {
        let mut line = formatter.format(entry, false);
        line.push('\n');

        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        if conn.stream.is_none() {
            self.connect(&mut conn);
        }
        let result = match conn.stream {
            Some(ref mut stream) => stream.write_all(line.as_bytes()),
            None => return Ok(()),
        };
        if result.is_err() {
            conn.stream = None;
        }
        result
    }
}

/// A builder of outputs sending records to a Datadog agent.
///
/// # Examples
///
/// ```no_run
/// use daiquiri::datadog::DatadogBuilder;
/// use daiquiri::Build;
///
/// let output = DatadogBuilder::new().host("agent.local").port(10518).build().unwrap();
/// # drop(output);
/// ```
#[derive(Debug)]
pub struct DatadogBuilder {
    common: BuilderCommon,
    host: String,
    port: u16,
}
impl DatadogBuilder {
    /// Makes a new `DatadogBuilder` instance.
    pub fn new() -> Self {
        DatadogBuilder {
            common: BuilderCommon {
                level: None,
                formatter: Some(Arc::new(DatadogFormatter::new())),
            },
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }

    /// Sets the host of the agent.
    pub fn host(&mut self, host: &str) -> &mut Self {
        self.host = host.to_owned();
        self
    }

    /// Sets the port of the agent.
    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = port;
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
impl Default for DatadogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl Build for DatadogBuilder {
    fn build(&self) -> Result<Output> {
        Ok(self
            .common
            .finish(DatadogHandler::new(&self.host, self.port)))
    }
}

/// The configuration of `DatadogBuilder`.
///
/// # Examples
///
/// ```
/// use daiquiri::datadog::DatadogConfig;
///
/// let config: DatadogConfig = serdeconv::from_toml_str(r#"port = 10600"#).unwrap();
/// assert_eq!(config.host, "127.0.0.1");
/// assert_eq!(config.port, 10600);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatadogConfig {
    /// Host of the agent.
    pub host: String,

    /// Port of the agent.
    pub port: u16,

    /// Minimum severity of this output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Severity>,

    /// Formatter of this output (Datadog JSON by default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<FormatterConfig>,
}
impl Default for DatadogConfig {
    fn default() -> Self {
        DatadogConfig {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            level: None,
            formatter: None,
        }
    }
}
impl Config for DatadogConfig {
    type Builder = DatadogBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        let mut builder = DatadogBuilder::new();
        builder.host(&self.host).port(self.port);
        track!(builder
            .common
            .configure(self.level, self.formatter.as_ref()))?;
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::emit;
    use slog::Level;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;

    #[test]
    fn sends_one_json_line_per_record() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let output = DatadogBuilder::new().port(port).build().unwrap();

        emit(&output, Level::Warning, "first");
        emit(&output, Level::Error, "second");

        let (socket, _) = listener.accept().unwrap();
        let mut lines = BufReader::new(socket).lines();
        let first: serde_json::Value =
            serde_json::from_str(&lines.next().unwrap().unwrap()).unwrap();
        assert_eq!(first["message"], "first");
        assert_eq!(first["status"], "warning");
        assert_eq!(first["logger"]["name"], "test");
        assert!(first["timestamp"].is_string());
        let second: serde_json::Value =
            serde_json::from_str(&lines.next().unwrap().unwrap()).unwrap();
        assert_eq!(second["message"], "second");
        assert_eq!(second["status"], "error");
    }

    #[test]
    fn failed_connections_back_off() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let handler = DatadogHandler::new("127.0.0.1", port);
        let formatter = DatadogFormatter::new();
        let emit_once = || {
            let values: slog::OwnedKVList = slog::o!().into();
            crate::test_util::with_entry(
                Level::Info,
                "test",
                "dropped",
                &crate::record::Extras::new(),
                &values,
                |e| handler.emit(e, &formatter).unwrap(),
            );
        };

        emit_once();
        assert_eq!(handler.conn.lock().unwrap().retry_period, Some(RETRY_START));

        // Still waiting: no new attempt.
        emit_once();
        assert_eq!(handler.conn.lock().unwrap().retry_period, Some(RETRY_START));

        for expected in [2, 4, 8, 16, 30, 30] {
            handler.conn.lock().unwrap().retry_at = Some(Instant::now());
            emit_once();
            assert_eq!(
                handler.conn.lock().unwrap().retry_period,
                Some(Duration::from_secs(expected))
            );
        }
    }

    #[test]
    fn config_keeps_datadog_formatter() {
        let config: DatadogConfig = serdeconv::from_toml_str(
            r#"
host = "localhost"
level = "info"
"#,
        )
        .unwrap();
        let builder = config.try_to_builder().unwrap();
        assert_eq!(builder.host, "localhost");
        assert_eq!(builder.port, DEFAULT_PORT);
        assert_eq!(builder.common.level, Some(Severity::Info));
        assert!(builder.common.formatter.is_some());
    }
}
