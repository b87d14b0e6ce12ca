//! Named loggers accepting extra fields at each call.
use crate::levels;
use crate::record::{Extras, LOGGER_KEY};
use crate::types::Severity;
use serde_json::Value;
use slog::{BorrowedKV, Logger, OwnedKV, Record, RecordLocation, RecordStatic};
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// Returns the logger called `name`.
///
/// Records are sent through the global logger installed by
/// [`setup`](fn.setup.html); before that they are discarded.
///
/// # Examples
///
/// ```
/// use daiquiri::extras;
///
/// let logger = daiquiri::get_logger("app.db").with("pool", "main");
/// logger.info("connected");
/// logger.warning_with("slow query", &extras! { "elapsed_ms" => 1250 });
/// ```
pub fn get_logger(name: &str) -> KeywordLogger {
    KeywordLogger {
        name: name.to_owned(),
        extras: Extras::new(),
    }
}

/// A named logger carrying extra fields of its own.
///
/// Fields given at a call override the logger's fields of the same name.
#[derive(Debug, Clone)]
pub struct KeywordLogger {
    name: String,
    extras: Extras,
}
impl KeywordLogger {
    /// The name of this logger.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fields attached to every record of this logger.
    pub fn extras(&self) -> &Extras {
        &self.extras
    }

    /// Returns this logger with one more field attached to all its records.
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.extras.insert(key, value);
        self
    }

    /// Sets the level of this logger and of its descendants which have no
    /// level of their own.
    pub fn set_level(&self, severity: Severity) {
        levels::set_level(&self.name, severity);
    }

    /// Returns `true` if records of `severity` pass this logger's level,
    /// or the root level when it has none.
    pub fn is_enabled_for(&self, severity: Severity) -> bool {
        let level = levels::effective_level(&self.name).unwrap_or_else(levels::root_level);
        severity >= level
    }

    /// Makes a `slog::Logger` emitting records under this logger's name and fields.
    ///
    /// # Examples
    ///
    /// ```
    /// let log = daiquiri::get_logger("worker").with("id", 7).to_slog();
    /// slog::info!(log, "started"; "queue" => "default");
    /// ```
    pub fn to_slog(&self) -> Logger {
        slog_scope::logger()
            .new(slog::o!(LOGGER_KEY => self.name.clone()))
            .new(OwnedKV(self.extras.clone()))
    }

    /// Logs `message` at `severity` with the extra fields `extras`.
    #[track_caller]
    pub fn log<M: fmt::Display>(&self, severity: Severity, message: M, extras: &Extras) {
        let caller = Location::caller();
        let module = Path::new(caller.file())
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let location = RecordLocation {
            file: caller.file(),
            line: caller.line(),
            column: caller.column(),
            function: "",
            module,
        };
        let rs = RecordStatic {
            location: &location,
            level: severity.as_level(),
            tag: &self.name,
        };
        let mut fields = self.extras.clone();
        fields.extend(extras);
        slog_scope::with_logger(|logger| {
            logger.log(&Record::new(
                &rs,
                &format_args!("{}", message),
                BorrowedKV(&fields),
            ))
        });
    }
}

macro_rules! severity_methods {
    ($($name:ident, $name_with:ident, $severity:ident;)*) => {
        impl KeywordLogger {
            $(
                #[doc = concat!("Logs `message` at the `", stringify!($name), "` level.")]
                #[track_caller]
                pub fn $name<M: fmt::Display>(&self, message: M) {
                    self.log(Severity::$severity, message, &Extras::new())
                }

                #[doc = concat!("Logs `message` at the `", stringify!($name), "` level with extra fields.")]
                #[track_caller]
                pub fn $name_with<M: fmt::Display>(&self, message: M, extras: &Extras) {
                    self.log(Severity::$severity, message, extras)
                }
            )*
        }
    };
}
severity_methods! {
    trace, trace_with, Trace;
    debug, debug_with, Debug;
    info, info_with, Info;
    warning, warning_with, Warning;
    error, error_with, Error;
    critical, critical_with, Critical;
}
