//! Runs in its own process: it installs a `log` logger before any setup.
use daiquiri::format::TextFormatter;
use daiquiri::{ErrorKind, Output, SetupBuilder};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

struct Silent;
impl log::Log for Silent {
    fn enabled(&self, _: &log::Metadata) -> bool {
        false
    }
    fn log(&self, _: &log::Record) {}
    fn flush(&self) {}
}
static SILENT: Silent = Silent;

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);
impl Buffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}
impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn plain(buffer: &Buffer) -> Output {
    Output::stream(buffer.clone())
        .with_formatter(TextFormatter::with_format("{name}: {message}").unwrap())
}

#[test]
fn failed_setup_keeps_the_installed_logger() {
    log::set_logger(&SILENT).unwrap();
    let old = Buffer::default();
    let new = Buffer::default();

    let _guard = SetupBuilder::new()
        .set_panic_hook(false)
        .capture_log(false)
        .outputs(vec![plain(&old)])
        .setup()
        .unwrap();

    let e = SetupBuilder::new()
        .set_panic_hook(false)
        .asynchronous(true)
        .outputs(vec![plain(&new)])
        .setup()
        .unwrap_err();
    assert_eq!(*e.kind(), ErrorKind::Other);

    daiquiri::get_logger("conflict").warning("still here");
    assert_eq!(old.contents(), "conflict: still here\n");
    assert_eq!(new.contents(), "");
}
