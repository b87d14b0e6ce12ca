use crate::format::Format;
use crate::output::Handler;
use crate::record::Entry;
use crate::types::Severity;
use libc::{c_char, c_int};
use once_cell::sync::Lazy;
use std::ffi::{CStr, CString};
use std::fmt;
use std::io;
use std::ptr;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use super::mock::{self, closelog, openlog, syslog};
#[cfg(not(test))]
use libc::{closelog, openlog, syslog};

/// Keeps track of which `ident` string was most recently passed to `openlog`.
///
/// The mutex is to be locked while calling `openlog` or `closelog`. It
/// contains a possibly-null pointer to the `ident` string most recently passed
/// to `openlog`.
///
/// The pointer is stored as a `usize` because pointers are `!Send`. It is only
/// used for comparison, never dereferenced.
///
/// POSIX does not specify how long the `ident` string must live. Some libc
/// implementations keep the pointer itself in a global variable, so the string
/// must not be freed until either `closelog` is called or `openlog` is called
/// with a different, non-null `ident`. This mutex makes it possible to decide
/// whether `closelog` needs to be called before a given `ident` is dropped.
#[allow(clippy::mutex_atomic)]
static LAST_UNIQUE_IDENT: Lazy<Mutex<usize>> =
    Lazy::new(|| Mutex::new(ptr::null::<c_char>() as usize));

/// Maps a severity onto a syslog priority.
pub(super) fn priority(severity: Severity) -> c_int {
    match severity {
        Severity::Critical => libc::LOG_CRIT,
        Severity::Error => libc::LOG_ERR,
        Severity::Warning => libc::LOG_WARNING,
        Severity::Info => libc::LOG_INFO,
        Severity::Debug | Severity::Trace => libc::LOG_DEBUG,
    }
}

/// A handler submitting records through the POSIX `syslog` API.
pub struct SyslogHandler {
    /// The `ident` string passed to `openlog`.
    ///
    /// Kept so that it can be freed (and `closelog` called, if necessary)
    /// when this handler is dropped.
    ident: Option<Box<CStr>>,
}

impl SyslogHandler {
    pub(super) fn new(ident: CString, option: c_int, facility: c_int) -> Self {
        let ident = ident.into_boxed_c_str();
        {
            // `openlog` and `closelog` are only called while holding the mutex
            // around `last_unique_ident`.
            let mut last_unique_ident: MutexGuard<usize> =
                LAST_UNIQUE_IDENT.lock().unwrap_or_else(|e| e.into_inner());

            // This has to happen *before* freeing the previous `ident` string,
            // if applicable.
            unsafe {
                openlog(ident.as_ptr(), option, facility);
            }
            *last_unique_ident = ident.as_ptr() as usize;
        }
        SyslogHandler { ident: Some(ident) }
    }
}

impl Drop for SyslogHandler {
    fn drop(&mut self) {
        if let Some(my_ident) = self.ident.take() {
            let mut last_unique_ident: MutexGuard<usize> = match LAST_UNIQUE_IDENT.lock() {
                Ok(locked) => locked,

                // If the mutex was poisoned, a panic may have happened between
                // `openlog` and updating the pointer, so freeing the string
                // could be a use after free. Let it leak.
                Err(_) => {
                    Box::leak(my_ident);
                    return;
                }
            };

            if my_ident.as_ptr() as usize == *last_unique_ident {
                // The most recently used string is ours: `closelog` before it
                // is dropped. Subsequent `syslog` calls from elsewhere
                // implicitly reopen the connection with default settings.
                unsafe {
                    closelog();
                }
                *last_unique_ident = ptr::null::<c_char>() as usize;
            }

            // Recorded before the string is freed below.
            #[cfg(test)]
            mock::push(mock::Call::IdentFreed(
                my_ident.to_string_lossy().into_owned(),
            ));
        }
    }
}

impl Handler for SyslogHandler {
    fn emit(&self, entry: &Entry, formatter: &dyn Format) -> io::Result<()> {
        let msg = to_cstring_lossy(formatter.format(entry, false));
        unsafe {
            syslog(
                priority(entry.severity()),
                CStr::from_bytes_with_nul_unchecked(b"%s\0").as_ptr(),
                msg.as_ptr(),
            );
        }
        Ok(())
    }
}

impl fmt::Debug for SyslogHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SyslogHandler")
            .field("ident", &self.ident)
            .finish()
    }
}

/// Converts a `String` to a `CString`, stripping null bytes in the middle.
pub(super) fn to_cstring_lossy(s: String) -> CString {
    let mut s: Vec<u8> = s.into();
    s.retain(|b| *b != 0);

    // Sound because every null byte was just stripped.
    unsafe { CString::from_vec_unchecked(s) }
}
