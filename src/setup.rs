//! Installing outputs as the process-wide logger.
use crate::levels;
use crate::logger::get_logger;
use crate::misc::program_name;
use crate::output::{Config, Output, OutputSpec, OutputSpecConfig};
use crate::record::Entry;
use crate::types::{OverflowStrategy, Severity};
use crate::{Error, ErrorKind, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use slog::{Drain, Logger, Never, OwnedKVList, Record};
use slog_async::{Async, AsyncGuard};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::BTreeMap;
use std::fmt;
use std::panic;
use std::path::Path;
use std::thread;

static STDLOG_BRIDGE: OnceCell<()> = OnceCell::new();

/// Sends every record to all outputs whose levels it passes.
#[derive(Debug)]
struct Dispatcher {
    outputs: Vec<Output>,
    level: Severity,
}
impl Drain for Dispatcher {
    type Ok = ();
    type Err = Never;
    fn log(&self, record: &Record, values: &OwnedKVList) -> std::result::Result<(), Never> {
        let entry = match Entry::new(record, values) {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("daiquiri: cannot collect the fields of a record: {}", e);
                return Ok(());
            }
        };
        let threshold = levels::effective_level(entry.logger_name()).unwrap_or(self.level);
        if entry.severity() < threshold {
            return Ok(());
        }
        for output in &self.outputs {
            if let Err(e) = output.emit(&entry) {
                eprintln!("daiquiri: cannot emit a record through {:?}: {}", output, e);
            }
        }
        Ok(())
    }
}

/// Flushes asynchronous outputs when dropped.
///
/// The installed logger itself stays in place until the next setup.
#[must_use]
pub struct LoggingGuard {
    _async_guard: Option<AsyncGuard>,
}
impl fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LoggingGuard")
            .field("asynchronous", &self._async_guard.is_some())
            .finish()
    }
}

/// Configures and installs the process-wide logger.
///
/// Every setup replaces the outputs installed by the previous one.
///
/// # Examples
///
/// ```
/// use daiquiri::types::Severity;
/// use daiquiri::{Output, SetupBuilder};
///
/// let _guard = SetupBuilder::new()
///     .level(Severity::Info)
///     .outputs(vec![Output::stdout()])
///     .setup()
///     .unwrap();
/// daiquiri::get_logger("app").info("It works!");
/// ```
#[derive(Debug, Clone)]
pub struct SetupBuilder {
    level: Severity,
    outputs: Vec<OutputSpec>,
    program_name: Option<String>,
    capture_log: bool,
    set_panic_hook: bool,
    skip_unavailable: bool,
    asynchronous: bool,
    channel_size: usize,
    overflow_strategy: OverflowStrategy,
}
impl SetupBuilder {
    /// Makes a new `SetupBuilder` instance.
    ///
    /// The defaults are the `warning` level, a single `stderr` output, a
    /// captured `log` crate and a panic hook.
    pub fn new() -> Self {
        SetupBuilder {
            level: Severity::default(),
            outputs: vec![OutputSpec::from("stderr")],
            program_name: None,
            capture_log: true,
            set_panic_hook: true,
            skip_unavailable: false,
            asynchronous: false,
            channel_size: 1024,
            overflow_strategy: OverflowStrategy::default(),
        }
    }

    /// Sets the root level.
    pub fn level(&mut self, severity: Severity) -> &mut Self {
        self.level = severity;
        self
    }

    /// Replaces the outputs.
    pub fn outputs<I, O>(&mut self, outputs: I) -> &mut Self
    where
        I: IntoIterator<Item = O>,
        O: Into<OutputSpec>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an output.
    pub fn output<O: Into<OutputSpec>>(&mut self, output: O) -> &mut Self {
        self.outputs.push(output.into());
        self
    }

    /// Sets the program name, used to name the logger of panic reports.
    pub fn program_name(&mut self, name: &str) -> &mut Self {
        self.program_name = Some(name.to_owned());
        self
    }

    /// Whether records of the `log` crate go through the installed logger.
    pub fn capture_log(&mut self, enabled: bool) -> &mut Self {
        self.capture_log = enabled;
        self
    }

    /// Whether panics are logged at the `critical` level.
    pub fn set_panic_hook(&mut self, enabled: bool) -> &mut Self {
        self.set_panic_hook = enabled;
        self
    }

    /// Whether outputs whose backend is missing (e.g., no journald) are
    /// left out instead of failing the setup.
    pub fn skip_unavailable(&mut self, enabled: bool) -> &mut Self {
        self.skip_unavailable = enabled;
        self
    }

    /// Whether outputs are fed from a background thread.
    pub fn asynchronous(&mut self, enabled: bool) -> &mut Self {
        self.asynchronous = enabled;
        self
    }

    /// Sets the size of the asynchronous channel.
    pub fn channel_size(&mut self, channel_size: usize) -> &mut Self {
        self.channel_size = channel_size;
        self
    }

    /// Sets what happens when the asynchronous channel is full.
    pub fn overflow_strategy(&mut self, overflow_strategy: OverflowStrategy) -> &mut Self {
        self.overflow_strategy = overflow_strategy;
        self
    }

    /// Builds the logger without installing it.
    ///
    /// The guard is present in asynchronous mode; dropping it flushes the
    /// channel.
    pub fn build_logger(&self) -> Result<(Logger, Option<AsyncGuard>)> {
        let mut outputs = Vec::with_capacity(self.outputs.len());
        for spec in &self.outputs {
            match spec.resolve() {
                Ok(output) => outputs.push(output),
                Err(ref e) if self.skips(e) => {}
                Err(e) => return Err(track!(e)),
            }
        }
        let dispatcher = Dispatcher {
            outputs,
            level: self.level,
        };
        if self.asynchronous {
            let (drain, guard) = Async::new(dispatcher)
                .chan_size(self.channel_size)
                .overflow_strategy(self.overflow_strategy.to_async_type())
                .build_with_guard();
            Ok((Logger::root(drain.ignore_res(), slog::o!()), Some(guard)))
        } else {
            Ok((Logger::root(dispatcher, slog::o!()), None))
        }
    }

    /// Installs the logger built by this builder as the global logger.
    pub fn setup(&self) -> Result<LoggingGuard> {
        let (logger, async_guard) = track!(self.build_logger())?;
        track!(capture_log_records(self.capture_log))?;
        slog_scope::set_global_logger(logger).cancel_reset();
        levels::set_root_level(self.level);
        if self.set_panic_hook {
            let name = self.program_name.clone().unwrap_or_else(program_name);
            install_panic_hook(name);
        }
        Ok(LoggingGuard {
            _async_guard: async_guard,
        })
    }

    fn skips(&self, e: &Error) -> bool {
        self.skip_unavailable && *e.kind() == ErrorKind::Unavailable
    }
}
impl Default for SetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn capture_log_records(enabled: bool) -> Result<()> {
    if enabled {
        track!(STDLOG_BRIDGE
            .get_or_try_init(slog_stdlog::init)
            .map_err(Error::from))?;
        log::set_max_level(log::LevelFilter::Trace);
    } else if STDLOG_BRIDGE.get().is_some() {
        log::set_max_level(log::LevelFilter::Off);
    }
    Ok(())
}

fn install_panic_hook(logger_name: String) {
    let logger = get_logger(&logger_name);
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("Box<dyn Any>");
        let mut report = format!(
            "thread '{}' panicked",
            thread::current().name().unwrap_or("<unnamed>")
        );
        if let Some(location) = info.location() {
            report.push_str(&format!(" at {}", location));
        }
        report.push_str(&format!(":\n{}", message));
        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            report.push_str(&format!("\n{}", backtrace));
        }
        logger.critical(report);
    }));
}

/// Installs `outputs` at `level` with the default settings of
/// [`SetupBuilder`](struct.SetupBuilder.html).
///
/// # Examples
///
/// ```
/// use daiquiri::types::Severity;
///
/// let _guard = daiquiri::setup(Severity::Info, vec!["stdout"]).unwrap();
/// daiquiri::get_logger("app").info("It works!");
///
/// assert!(daiquiri::setup(Severity::Info, vec!["foobar"]).is_err());
/// ```
pub fn setup<I, O>(level: Severity, outputs: I) -> Result<LoggingGuard>
where
    I: IntoIterator<Item = O>,
    O: Into<OutputSpec>,
{
    track!(SetupBuilder::new().level(level).outputs(outputs).setup())
}

/// The configuration of `SetupBuilder`, plus default per-logger levels.
///
/// # Examples
///
/// ```
/// use daiquiri::SetupConfig;
///
/// let config = SetupConfig::from_toml_str(r#"
/// level = "info"
/// outputs = ["stdout", { type = "file", filename = "app.log", formatter = { type = "json" } }]
///
/// [default_log_levels]
/// "hyper" = "warning"
/// "#).unwrap();
/// assert_eq!(config.outputs.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Root level.
    pub level: Severity,

    /// Outputs: preconfigured names or output tables.
    pub outputs: Vec<OutputSpecConfig>,

    /// Program name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,

    /// Whether records of the `log` crate go through the installed logger.
    pub capture_log: bool,

    /// Whether panics are logged.
    pub set_panic_hook: bool,

    /// Whether unavailable outputs are left out.
    pub skip_unavailable: bool,

    /// Whether outputs are fed from a background thread.
    pub asynchronous: bool,

    /// Asynchronous channel size.
    pub channel_size: usize,

    /// What happens when the asynchronous channel is full.
    pub overflow_strategy: OverflowStrategy,

    /// Levels of particular loggers.
    pub default_log_levels: BTreeMap<String, Severity>,
}
impl Default for SetupConfig {
    fn default() -> Self {
        SetupConfig {
            level: Severity::default(),
            outputs: vec![OutputSpecConfig::Name("stderr".to_owned())],
            program_name: None,
            capture_log: true,
            set_panic_hook: true,
            skip_unavailable: false,
            asynchronous: false,
            channel_size: 1024,
            overflow_strategy: OverflowStrategy::default(),
            default_log_levels: BTreeMap::new(),
        }
    }
}
impl SetupConfig {
    /// Reads a configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        track!(serdeconv::from_toml_file(path).map_err(Error::from), "path={:?}", path)
    }

    /// Reads a configuration from TOML text.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        track!(serdeconv::from_toml_str(toml).map_err(Error::from))
    }

    /// Makes a `SetupBuilder`, building the configured output tables.
    pub fn try_to_builder(&self) -> Result<SetupBuilder> {
        let mut builder = SetupBuilder::new();
        builder
            .level(self.level)
            .capture_log(self.capture_log)
            .set_panic_hook(self.set_panic_hook)
            .skip_unavailable(self.skip_unavailable)
            .asynchronous(self.asynchronous)
            .channel_size(self.channel_size)
            .overflow_strategy(self.overflow_strategy);
        if let Some(ref name) = self.program_name {
            builder.program_name(name);
        }
        let mut outputs = Vec::with_capacity(self.outputs.len());
        for spec in &self.outputs {
            match *spec {
                OutputSpecConfig::Name(ref name) => outputs.push(OutputSpec::from(name.as_str())),
                OutputSpecConfig::Output(ref config) => match config.build_output() {
                    Ok(output) => outputs.push(OutputSpec::from(output)),
                    Err(ref e) if builder.skips(e) => {}
                    Err(e) => return Err(track!(e)),
                },
            }
        }
        builder.outputs(outputs);
        Ok(builder)
    }

    /// Sets the default per-logger levels, then installs the configured logger.
    pub fn setup(&self) -> Result<LoggingGuard> {
        levels::set_default_log_levels(
            self.default_log_levels
                .iter()
                .map(|(name, severity)| (name, *severity)),
        );
        let builder = track!(self.try_to_builder())?;
        track!(builder.setup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TextFormatter;
    use crate::test_util::{lock_global, SharedBuffer};

    fn plain(buffer: &SharedBuffer) -> Output {
        Output::stream(buffer.clone())
            .with_formatter(TextFormatter::with_format("{levelname} {name}: {message}").unwrap())
    }

    fn quiet_builder() -> SetupBuilder {
        let mut builder = SetupBuilder::new();
        builder.set_panic_hook(false).capture_log(false);
        builder
    }

    #[test]
    fn setup_replaces_outputs() {
        let _lock = lock_global();
        levels::clear();
        let first = SharedBuffer::new();
        let second = SharedBuffer::new();

        let _guard = quiet_builder().outputs(vec![plain(&first)]).setup().unwrap();
        get_logger("replace").warning("one");
        let _guard = quiet_builder().outputs(vec![plain(&second)]).setup().unwrap();
        get_logger("replace").warning("two");

        assert_eq!(first.contents(), "WARNING replace: one\n");
        assert_eq!(second.contents(), "WARNING replace: two\n");
    }

    #[test]
    fn root_level_and_logger_levels() {
        let _lock = lock_global();
        levels::clear();
        let buffer = SharedBuffer::new();
        let _guard = quiet_builder()
            .level(Severity::Warning)
            .outputs(vec![plain(&buffer)])
            .setup()
            .unwrap();
        levels::set_default_log_levels(vec![("chatty", Severity::Debug)]);

        assert!(!get_logger("root").is_enabled_for(Severity::Info));
        assert!(get_logger("root").is_enabled_for(Severity::Warning));
        assert!(get_logger("chatty.sub").is_enabled_for(Severity::Debug));
        get_logger("root").info("filtered");
        get_logger("root").error("kept");
        get_logger("chatty.sub").debug("kept by its own level");

        assert_eq!(
            buffer.contents(),
            "ERROR root: kept\nDEBUG chatty.sub: kept by its own level\n"
        );
        levels::clear();
    }

    #[test]
    fn unknown_output_names_are_errors() {
        let _lock = lock_global();
        let e = quiet_builder().outputs(vec!["foobar"]).setup().unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::Invalid);
        assert!(e.to_string().contains("Output foobar is not available"));
    }

    #[cfg(unix)]
    #[test]
    fn unavailable_outputs_may_be_skipped() {
        let _lock = lock_global();
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            r#"
set_panic_hook = false
capture_log = false
outputs = [{{ type = "journal", socket_path = "{}" }}]
"#,
            dir.path().join("missing.sock").display()
        );
        let mut config = SetupConfig::from_toml_str(&toml).unwrap();
        let e = config.setup().unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::Unavailable);

        config.skip_unavailable = true;
        assert!(config.setup().is_ok());
    }

    #[test]
    fn asynchronous_outputs_are_flushed_by_the_guard() {
        let _lock = lock_global();
        levels::clear();
        let buffer = SharedBuffer::new();
        let guard = quiet_builder()
            .asynchronous(true)
            .overflow_strategy(OverflowStrategy::Block)
            .outputs(vec![plain(&buffer)])
            .setup()
            .unwrap();
        for i in 0..10 {
            get_logger("async").error(format!("record {}", i));
        }
        drop(guard);
        assert_eq!(buffer.contents().lines().count(), 10);
        assert!(buffer.contents().ends_with("ERROR async: record 9\n"));

        // The channel is closed now: further records are dropped silently.
        get_logger("async").error("lost");
        assert_eq!(buffer.contents().lines().count(), 10);
    }

    #[test]
    fn log_crate_records_are_captured() {
        let _lock = lock_global();
        levels::clear();
        let buffer = SharedBuffer::new();
        let _guard = SetupBuilder::new()
            .set_panic_hook(false)
            .outputs(vec![plain(&buffer)])
            .setup()
            .unwrap();
        log::warn!("through the log facade");

        let _guard = quiet_builder().outputs(vec![plain(&buffer)]).setup().unwrap();
        log::error!("not captured");

        assert_eq!(
            buffer.contents(),
            "WARNING daiquiri::setup::tests: through the log facade\n"
        );
    }

    #[test]
    fn panics_are_logged() {
        let _lock = lock_global();
        levels::clear();
        let buffer = SharedBuffer::new();
        let _guard = SetupBuilder::new()
            .capture_log(false)
            .program_name("panicky")
            .outputs(vec![plain(&buffer)])
            .setup()
            .unwrap();

        let result = panic::catch_unwind(|| panic!("boom"));
        let _ = panic::take_hook();

        assert!(result.is_err());
        let contents = buffer.contents();
        assert!(contents.starts_with("CRITICAL panicky: thread '"), "{}", contents);
        assert!(contents.contains("panicked at src/setup.rs:"));
        assert!(contents.contains(":\nboom\n"));
    }

    #[test]
    fn config_to_builder() {
        let _lock = lock_global();
        levels::clear();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configured.log");
        let toml = format!(
            r#"
level = "debug"
set_panic_hook = false
capture_log = false
outputs = [{{ type = "file", filename = "{}", formatter = {{ type = "text", format = "{{levelname}} {{message}}" }} }}]

[default_log_levels]
"noisy" = "error"
"#,
            path.display()
        );
        let config = SetupConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.level, Severity::Debug);
        assert_eq!(config.default_log_levels["noisy"], Severity::Error);

        let _guard = config.setup().unwrap();
        get_logger("noisy").warning("filtered");
        get_logger("app").debug("written");

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "DEBUG written\n");
        levels::clear();
    }

    #[test]
    fn defaults() {
        let config = SetupConfig::default();
        assert_eq!(config.level, Severity::Warning);
        assert_eq!(config.outputs.len(), 1);
        assert!(config.capture_log);
        assert!(config.set_panic_hook);

        let e = SetupConfig::from_toml_str("level = 3").unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::Invalid);
    }
}
