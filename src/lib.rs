//! This crate sets up [slog](https://github.com/slog-rs/slog) logging in one
//! call: outputs (console, files, syslog, journald, Datadog), formatters
//! (text, colored text, JSON) and named loggers accepting extra fields at
//! each call.
//!
//! # Examples
//!
//! Logs to the standard error and to a JSON file:
//!
//! ```no_run
//! use daiquiri::file::FileBuilder;
//! use daiquiri::format::JsonFormatter;
//! use daiquiri::types::Severity;
//! use daiquiri::{extras, Build, Output, SetupBuilder};
//!
//! # fn main() -> Result<(), daiquiri::Error> {
//! let json = FileBuilder::new()
//!     .filename("/var/log/app.json")
//!     .formatter(JsonFormatter::new())
//!     .build()?;
//! let _guard = SetupBuilder::new()
//!     .level(Severity::Info)
//!     .outputs(vec![Output::stderr(), json])
//!     .setup()?;
//!
//! let logger = daiquiri::get_logger("app").with("version", "1.2.0");
//! logger.info_with("request served", &extras! { "status" => 200, "path" => "/" });
//! # Ok(())
//! # }
//! ```
//!
//! Sets logging up from configuration text (TOML):
//!
//! ```
//! use daiquiri::SetupConfig;
//!
//! let config = SetupConfig::from_toml_str(r#"
//! level = "debug"
//! outputs = ["stdout", { type = "stream", destination = "stderr", level = "error" }]
//! "#).unwrap();
//! let _guard = config.setup().unwrap();
//! daiquiri::get_logger("app").debug("Hello World!");
//! ```
#![warn(missing_docs)]
#[macro_use]
extern crate trackable;

pub use error::{Error, ErrorKind};
pub use levels::{effective_level, parse_and_set_default_log_levels, set_default_log_levels};
pub use logger::{get_logger, KeywordLogger};
pub use output::{Build, Config, Output, OutputBuilder, OutputConfig, OutputSpec, OutputSpecConfig};
pub use record::Extras;
pub use setup::{setup, LoggingGuard, SetupBuilder, SetupConfig};

pub mod datadog;
pub mod file;
pub mod format;
pub mod journal;
pub mod output;
pub mod record;
pub mod stream;
pub mod syslog;
pub mod types;

mod error;
#[cfg(not(unix))]
mod fake_syslog;
mod levels;
mod logger;
mod misc;
mod permissions;
mod setup;
#[cfg(test)]
mod test_util;

/// A specialized `Result` type for this crate.
pub type Result<T> = ::std::result::Result<T, Error>;
