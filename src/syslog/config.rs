use super::{Facility, SyslogBuilder};
use crate::format::FormatterConfig;
use crate::output::Config;
use crate::types::Severity;
use serde::{Deserialize, Serialize};

/// The configuration of `SyslogBuilder`.
///
/// # Examples
///
/// ```
/// use daiquiri::syslog::{Facility, SyslogConfig};
///
/// let toml = r#"
/// facility = "LOG_LOCAL3"
/// program_name = "example-app"
/// log_pid = true
/// "#;
/// let config: SyslogConfig = serdeconv::from_toml_str(toml).unwrap();
/// assert_eq!(config.facility, Facility::Local3);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SyslogConfig {
    /// The syslog facility to send logs to.
    pub facility: Facility,

    /// The name of this program, for inclusion with log messages.
    ///
    /// Defaults to the name of the running program.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,

    /// Include the process ID in log messages.
    pub log_pid: bool,

    /// Whether to wait for the first message before connecting to the
    /// syslog server. The default is platform-defined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_delay: Option<bool>,

    /// Minimum severity of this output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Severity>,

    /// Formatter of this output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<FormatterConfig>,
}

impl SyslogConfig {
    /// Creates a new `SyslogConfig` with default settings.
    pub fn new() -> Self {
        Default::default()
    }
}

impl Config for SyslogConfig {
    type Builder = SyslogBuilder;

    fn try_to_builder(&self) -> crate::Result<Self::Builder> {
        let mut b = SyslogBuilder::new();
        b.facility(self.facility);
        track!(b.common.configure(self.level, self.formatter.as_ref()))?;

        if let Some(ref name) = self.program_name {
            b.program_name(name);
        }

        if self.log_pid {
            b.log_pid();
        }

        if let Some(log_delay) = self.log_delay {
            if log_delay {
                b.log_odelay();
            } else {
                b.log_ndelay();
            }
        }

        Ok(b)
    }
}
