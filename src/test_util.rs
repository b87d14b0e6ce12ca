use crate::output::Output;
use crate::record::{Entry, Extras};
use once_cell::sync::Lazy;
use slog::{BorrowedKV, Level, OwnedKVList, Record, RecordLocation, RecordStatic};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

static GLOBAL: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Serializes tests which touch process-wide state (global logger, level registry, hooks).
pub fn lock_global() -> MutexGuard<'static, ()> {
    GLOBAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// Builds an `Entry` for a record with the given attributes and hands it to `f`.
pub fn with_entry<R>(
    level: Level,
    tag: &str,
    msg: &str,
    extras: &Extras,
    values: &OwnedKVList,
    f: impl FnOnce(&Entry) -> R,
) -> R {
    let location = RecordLocation {
        file: file!(),
        line: line!(),
        column: column!(),
        function: "with_entry",
        module: module_path!(),
    };
    let rs = RecordStatic {
        location: &location,
        level,
        tag,
    };
    f(&Entry::new(
        &Record::new(&rs, &format_args!("{}", msg), BorrowedKV(extras)),
        values,
    )
    .unwrap())
}

/// Emits a record without extra fields through `output`.
pub fn emit(output: &Output, level: Level, msg: &str) {
    let values: OwnedKVList = slog::o!().into();
    with_entry(level, "test", msg, &Extras::new(), &values, |e| {
        output.emit(e).unwrap()
    });
}

/// An in-memory writer whose contents can be read while an output owns a clone.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);
impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
