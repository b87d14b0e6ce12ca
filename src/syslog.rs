//! Output that sends records to the local syslog daemon. Unix-like platforms
//! only. Uses the [POSIX syslog API].
//!
//! [POSIX syslog API]: https://pubs.opengroup.org/onlinepubs/9699919799/functions/closelog.html
//!
//! # Concurrency issues
//!
//! POSIX doesn't support opening more than one connection to syslogd at a
//! time. Although it is safe to build more than one output using this
//! module at the same time, the settings of the syslog output built last win.
//!
//! For this reason:
//!
//! * Libraries should not use this module or otherwise call `openlog`
//!   unless specifically told to do so by the main application.
//! * An application should not keep more than one syslog output alive at a
//!   time, except while a new setup replaces an old one.
//!
//! Otherwise `closelog` may be called at the wrong time, which resets the
//! `openlog` settings (ident, facility and flags).

#![cfg(unix)]

mod builder;
pub use builder::*;

mod config;
pub use config::*;

mod facility;
pub use facility::*;

mod handler;
pub use handler::SyslogHandler;

#[cfg(test)]
mod mock;
