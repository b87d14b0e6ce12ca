use super::{Facility, SyslogHandler};
use crate::format::Format;
use crate::misc::program_name;
use crate::output::{Build, BuilderCommon, Output};
use crate::types::Severity;
use crate::{Error, ErrorKind, Result};
use std::ffi::CString;
use std::sync::Arc;
use trackable::error::ErrorKindExt;

/// A builder of outputs sending records to the local syslog daemon.
///
/// All settings have sensible defaults: the `user` facility and the program
/// name as ident (POSIX calls it the "tag").
///
/// # Example
///
/// ```
/// use daiquiri::syslog::{Facility, SyslogBuilder};
/// use daiquiri::types::Severity;
/// use daiquiri::Build;
///
/// # fn main() -> Result<(), daiquiri::Error> {
/// let output = SyslogBuilder::new()
///     .facility(Facility::Local0)
///     .level(Severity::Info)
///     .program_name("example-app")
///     .build()?;
/// # drop(output);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SyslogBuilder {
    pub(super) common: BuilderCommon,
    pub(super) facility: Facility,
    pub(super) program_name: Option<String>,
    pub(super) option: libc::c_int,
}

impl Default for SyslogBuilder {
    fn default() -> Self {
        SyslogBuilder {
            common: BuilderCommon::default(),
            facility: Facility::default(),
            program_name: None,
            option: 0,
        }
    }
}

impl SyslogBuilder {
    /// Makes a new `SyslogBuilder` instance.
    pub fn new() -> Self {
        SyslogBuilder::default()
    }

    /// Sets the syslog facility to send logs to.
    ///
    /// By default, this is the `user` facility.
    pub fn facility(&mut self, facility: Facility) -> &mut Self {
        self.facility = facility;
        self
    }

    /// Sets the name of this program, for inclusion with log messages.
    ///
    /// The name must not contain any zero (ASCII NUL) bytes. It defaults to
    /// the name of the running program.
    pub fn program_name(&mut self, name: &str) -> &mut Self {
        self.program_name = Some(name.to_owned());
        self
    }

    /// Include the process ID in log messages.
    #[inline]
    pub fn log_pid(&mut self) -> &mut Self {
        self.option |= libc::LOG_PID;
        self
    }

    /// Immediately open a connection to the syslog server, instead of waiting
    /// until the first log message is sent.
    ///
    /// `log_ndelay` and `log_odelay` are mutually exclusive, and one of them
    /// is the default, depending on the platform.
    #[inline]
    pub fn log_ndelay(&mut self) -> &mut Self {
        self.option = (self.option & !libc::LOG_ODELAY) | libc::LOG_NDELAY;
        self
    }

    /// *Don't* immediately open a connection to the syslog server. Wait until
    /// the first log message is sent before connecting.
    #[inline]
    pub fn log_odelay(&mut self) -> &mut Self {
        self.option = (self.option & !libc::LOG_NDELAY) | libc::LOG_ODELAY;
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

impl Build for SyslogBuilder {
    fn build(&self) -> Result<Output> {
        let name = self.program_name.clone().unwrap_or_else(program_name);
        let ident = track!(CString::new(name)
            .map_err(|e| Error::from(ErrorKind::Invalid.cause(e))))?;
        let handler = SyslogHandler::new(ident, self.option, self.facility.into());
        Ok(self.common.finish(handler))
    }
}
