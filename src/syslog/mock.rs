//! Stand-ins for `openlog`, `syslog` and `closelog` which record their calls.
//!
//! `syslog` is variadic in libc. The handler always passes a `%s` format and
//! one argument, so the stand-in takes exactly those.
use libc::{c_char, c_int};
use once_cell::sync::Lazy;
use std::ffi::CStr;
use std::mem;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open {
        ident: String,
        flags: c_int,
        facility: c_int,
    },
    Log {
        priority: c_int,
        format: String,
        message: String,
    },
    Close,
    IdentFreed(String),
}

static CALLS: Lazy<Mutex<Vec<Call>>> = Lazy::new(Default::default);
static SERIAL: Lazy<Mutex<()>> = Lazy::new(Default::default);

fn calls() -> MutexGuard<'static, Vec<Call>> {
    CALLS.lock().unwrap_or_else(|e| e.into_inner())
}

/// Runs `f` while no other recording is in progress and returns the calls it made.
pub fn record<T>(f: impl FnOnce() -> T) -> (T, Vec<Call>) {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    calls().clear();
    let value = f();
    (value, mem::take(&mut *calls()))
}

pub fn push(call: Call) {
    calls().push(call);
}

unsafe fn text(ptr: *const c_char) -> String {
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

pub unsafe extern "C" fn openlog(ident: *const c_char, flags: c_int, facility: c_int) {
    push(Call::Open {
        ident: text(ident),
        flags,
        facility,
    });
}

pub unsafe extern "C" fn syslog(priority: c_int, format: *const c_char, message: *const c_char) {
    push(Call::Log {
        priority,
        format: text(format),
        message: text(message),
    });
}

pub unsafe extern "C" fn closelog() {
    push(Call::Close);
}
