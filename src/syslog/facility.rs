use crate::error::{Error, ErrorKind};
use libc::c_int;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display};
use std::result::Result as StdResult;
use std::str::FromStr;

/// A syslog facility. Conversions are provided to `c_int`.
///
/// Names parse case-insensitively, with or without a `LOG_` prefix.
///
/// # Examples
///
/// ```
/// use daiquiri::syslog::Facility;
///
/// assert_eq!("user".parse::<Facility>().unwrap(), Facility::User);
/// assert_eq!("log_local1".parse::<Facility>().unwrap(), Facility::Local1);
/// assert_eq!("LOCaL4".parse::<Facility>().unwrap(), Facility::Local4);
/// assert!("foo".parse::<Facility>().is_err());
/// ```
#[allow(missing_docs)]
#[derive(Default, Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facility {
    Auth,

    /// Log messages containing sensitive information.
    ///
    /// On platforms without it: becomes `Auth`
    AuthPriv,

    /// Periodic task scheduling daemons like `cron`.
    ///
    /// On platforms without it: becomes `Daemon`
    Cron,

    Daemon,

    /// FTP server.
    ///
    /// On platforms without it: becomes `Daemon`
    Ftp,

    Kern,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
    Lpr,
    Mail,
    News,
    Syslog,
    #[default]
    User,
    Uucp,
}

impl Facility {
    /// Every facility, in name order.
    pub const ALL: [Facility; 20] = [
        Facility::Auth,
        Facility::AuthPriv,
        Facility::Cron,
        Facility::Daemon,
        Facility::Ftp,
        Facility::Kern,
        Facility::Local0,
        Facility::Local1,
        Facility::Local2,
        Facility::Local3,
        Facility::Local4,
        Facility::Local5,
        Facility::Local6,
        Facility::Local7,
        Facility::Lpr,
        Facility::Mail,
        Facility::News,
        Facility::Syslog,
        Facility::User,
        Facility::Uucp,
    ];

    /// Gets the name of this `Facility`, in lowercase.
    ///
    /// The `FromStr` implementation accepts the same names, but it is
    /// case-insensitive.
    pub fn name(self) -> &'static str {
        match self {
            Facility::Auth => "auth",
            Facility::AuthPriv => "authpriv",
            Facility::Cron => "cron",
            Facility::Daemon => "daemon",
            Facility::Ftp => "ftp",
            Facility::Kern => "kern",
            Facility::Local0 => "local0",
            Facility::Local1 => "local1",
            Facility::Local2 => "local2",
            Facility::Local3 => "local3",
            Facility::Local4 => "local4",
            Facility::Local5 => "local5",
            Facility::Local6 => "local6",
            Facility::Local7 => "local7",
            Facility::Lpr => "lpr",
            Facility::Mail => "mail",
            Facility::News => "news",
            Facility::Syslog => "syslog",
            Facility::User => "user",
            Facility::Uucp => "uucp",
        }
    }
}

impl Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Facility> for c_int {
    fn from(facility: Facility) -> Self {
        match facility {
            Facility::Auth => libc::LOG_AUTH,
            #[cfg(any(
                target_os = "linux",
                target_os = "android",
                target_os = "emscripten",
                target_os = "macos",
                target_os = "ios",
                target_os = "freebsd",
                target_os = "dragonfly",
                target_os = "openbsd",
                target_os = "netbsd",
                target_env = "uclibc"
            ))]
            Facility::AuthPriv => libc::LOG_AUTHPRIV,
            #[cfg(not(any(
                target_os = "linux",
                target_os = "android",
                target_os = "emscripten",
                target_os = "macos",
                target_os = "ios",
                target_os = "freebsd",
                target_os = "dragonfly",
                target_os = "openbsd",
                target_os = "netbsd",
                target_env = "uclibc"
            )))]
            Facility::AuthPriv => libc::LOG_AUTH,
            #[cfg(any(
                target_os = "linux",
                target_os = "android",
                target_os = "emscripten",
                target_os = "macos",
                target_os = "ios",
                target_os = "freebsd",
                target_os = "dragonfly",
                target_os = "openbsd",
                target_os = "netbsd",
                target_os = "solaris",
                target_os = "illumos",
                target_env = "uclibc"
            ))]
            Facility::Cron => libc::LOG_CRON,
            #[cfg(not(any(
                target_os = "linux",
                target_os = "android",
                target_os = "emscripten",
                target_os = "macos",
                target_os = "ios",
                target_os = "freebsd",
                target_os = "dragonfly",
                target_os = "openbsd",
                target_os = "netbsd",
                target_os = "solaris",
                target_os = "illumos",
                target_env = "uclibc"
            )))]
            Facility::Cron => libc::LOG_DAEMON,
            Facility::Daemon => libc::LOG_DAEMON,
            #[cfg(any(
                target_os = "linux",
                target_os = "android",
                target_os = "emscripten",
                target_os = "macos",
                target_os = "ios",
                target_os = "freebsd",
                target_os = "dragonfly",
                target_os = "openbsd",
                target_os = "netbsd",
                target_env = "uclibc"
            ))]
            Facility::Ftp => libc::LOG_FTP,
            #[cfg(not(any(
                target_os = "linux",
                target_os = "android",
                target_os = "emscripten",
                target_os = "macos",
                target_os = "ios",
                target_os = "freebsd",
                target_os = "dragonfly",
                target_os = "openbsd",
                target_os = "netbsd",
                target_env = "uclibc"
            )))]
            Facility::Ftp => libc::LOG_DAEMON,
            Facility::Kern => libc::LOG_KERN,
            Facility::Local0 => libc::LOG_LOCAL0,
            Facility::Local1 => libc::LOG_LOCAL1,
            Facility::Local2 => libc::LOG_LOCAL2,
            Facility::Local3 => libc::LOG_LOCAL3,
            Facility::Local4 => libc::LOG_LOCAL4,
            Facility::Local5 => libc::LOG_LOCAL5,
            Facility::Local6 => libc::LOG_LOCAL6,
            Facility::Local7 => libc::LOG_LOCAL7,
            Facility::Lpr => libc::LOG_LPR,
            Facility::Mail => libc::LOG_MAIL,
            Facility::News => libc::LOG_NEWS,
            Facility::Syslog => libc::LOG_SYSLOG,
            Facility::User => libc::LOG_USER,
            Facility::Uucp => libc::LOG_UUCP,
        }
    }
}

impl FromStr for Facility {
    type Err = Error;

    fn from_str(s: &str) -> StdResult<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let name = lower.strip_prefix("log_").unwrap_or(&lower);
        match Facility::ALL.iter().find(|f| f.name() == name) {
            Some(facility) => Ok(*facility),
            None => {
                let valid = Facility::ALL
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                track_panic!(
                    ErrorKind::Invalid,
                    "Invalid syslog facility {:?}, must be one of: {}",
                    s,
                    valid
                )
            }
        }
    }
}

impl<'de> Deserialize<'de> for Facility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facility_from_str() {
        assert_eq!(Facility::from_str("daemon").unwrap(), Facility::Daemon);
        assert_eq!(Facility::from_str("LOG_DAEMON").unwrap(), Facility::Daemon);
        assert_eq!(Facility::from_str("log_local1").unwrap(), Facility::Local1);
        assert_eq!(Facility::from_str("LOCaL4").unwrap(), Facility::Local4);

        let e = Facility::from_str("foo").unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::Invalid);
        assert!(e.to_string().contains("auth, authpriv, cron"), "{}", e);
    }

    #[test]
    fn every_name_round_trips() {
        for facility in &Facility::ALL {
            assert_eq!(facility.name().parse::<Facility>().unwrap(), *facility);
        }
        assert_eq!(c_int::from(Facility::Local0), libc::LOG_LOCAL0);
        assert_eq!(c_int::from(Facility::User), libc::LOG_USER);
    }
}
