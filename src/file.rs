//! File outputs: a watched file, a size-rotated file and a time-rotated file.
use crate::format::{Format, FormatterConfig};
use crate::misc::program_name;
use crate::output::{Build, BuilderCommon, Config, Handler, Output};
use crate::permissions::restrict_file_permissions;
use crate::record::Entry;
use crate::types::{Severity, TimeZone};
use crate::{Error, ErrorKind, Result};
use chrono::{DateTime, Local, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

static BACKUP_TIME_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}(\.gz)?$").expect("never fails")
});

/// Works out where a log file goes.
///
/// - `filename` alone is used as is;
/// - `filename` and `directory` are joined;
/// - `directory` alone gives `directory/<program name><suffix>`, where the
///   program name defaults to the running program's.
///
/// # Errors
///
/// `ErrorKind::Invalid` when neither `filename` nor `directory` is given.
///
/// # Examples
///
/// ```
/// use daiquiri::file::log_file_path;
/// use std::path::{Path, PathBuf};
///
/// let path = log_file_path(None, Some(Path::new("/var/log")), Some("foobar"), ".log").unwrap();
/// assert_eq!(path, PathBuf::from("/var/log/foobar.log"));
///
/// assert!(log_file_path(None, None, None, ".log").is_err());
/// ```
pub fn log_file_path(
    filename: Option<&Path>,
    directory: Option<&Path>,
    program: Option<&str>,
    suffix: &str,
) -> Result<PathBuf> {
    match (filename, directory) {
        (Some(filename), None) => Ok(filename.to_path_buf()),
        (Some(filename), Some(directory)) => Ok(directory.join(filename)),
        (None, Some(directory)) => {
            let program = program.map_or_else(program_name, ToOwned::to_owned);
            Ok(directory.join(format!("{}{}", program, suffix)))
        }
        (None, None) => track_panic!(
            ErrorKind::Invalid,
            "Unable to determine log file destination: neither a filename nor a directory is set"
        ),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn open_file(path: &Path, restrict: bool) -> io::Result<File> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    if restrict {
        restrict_file_permissions(file)
    } else {
        Ok(file)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn rename_over(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)
}

/// Replaces `path` with a gzip-compressed copy named `path.gz`.
#[cfg(feature = "libflate")]
fn compress(path: &Path) -> io::Result<PathBuf> {
    let compressed = with_suffix(path, "gz");
    {
        let mut input = File::open(path)?;
        let output = File::create(&compressed)?;
        let mut encoder = libflate::gzip::Encoder::new(output)?;
        io::copy(&mut input, &mut encoder)?;
        encoder.finish().into_result()?;
    }
    fs::remove_file(path)?;
    Ok(compressed)
}

#[cfg(not(feature = "libflate"))]
fn compress(path: &Path) -> io::Result<PathBuf> {
    Ok(path.to_path_buf())
}

fn line(entry: &Entry, formatter: &dyn Format) -> String {
    let mut line = formatter.format(entry, false);
    line.push('\n');
    line
}

#[derive(Debug)]
struct WatchedFile {
    path: PathBuf,
    file: Option<File>,
    identity: Option<(u64, u64)>,
    restrict_permissions: bool,
}
impl WatchedFile {
    #[cfg(unix)]
    fn identity(metadata: &fs::Metadata) -> Option<(u64, u64)> {
        use std::os::unix::fs::MetadataExt;
        Some((metadata.dev(), metadata.ino()))
    }

    #[cfg(not(unix))]
    fn identity(_metadata: &fs::Metadata) -> Option<(u64, u64)> {
        None
    }

    fn is_stale(&self) -> bool {
        if self.file.is_none() {
            return true;
        }
        match fs::metadata(&self.path) {
            Err(_) => true,
            Ok(metadata) => {
                let current = Self::identity(&metadata);
                current.is_some() && current != self.identity
            }
        }
    }

    fn reopen(&mut self) -> io::Result<()> {
        self.file = None;
        let file = open_file(&self.path, self.restrict_permissions)?;
        self.identity = Self::identity(&file.metadata()?);
        self.file = Some(file);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.is_stale() {
            self.reopen()?;
        }
        match self.file {
            Some(ref mut file) => file.write_all(bytes),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Cannot open file: {:?}", self.path),
            )),
        }
    }
}

/// A handler appending to a file, reopening it when it is moved or deleted.
#[derive(Debug)]
pub struct FileHandler {
    inner: Mutex<WatchedFile>,
}
impl FileHandler {
    /// Opens (or creates) the file at `path`.
    pub fn new<P: AsRef<Path>>(path: P, restrict_permissions: bool) -> io::Result<Self> {
        let mut inner = WatchedFile {
            path: path.as_ref().to_path_buf(),
            file: None,
            identity: None,
            restrict_permissions,
        };
        inner.reopen()?;
        Ok(FileHandler {
            inner: Mutex::new(inner),
        })
    }
}
impl Handler for FileHandler {
    fn emit(&self, entry: &Entry, formatter: &dyn Format) -> io::Result<()> {
        let line = line(entry, formatter);
        lock(&self.inner).write(line.as_bytes())
    }
}

#[derive(Debug)]
struct SizeRotator {
    path: PathBuf,
    file: Option<File>,
    size: u64,
    max_bytes: u64,
    backup_count: usize,
    compress: bool,
    restrict_permissions: bool,
}
impl SizeRotator {
    fn backup_path(&self, index: usize) -> PathBuf {
        let path = with_suffix(&self.path, &index.to_string());
        if self.compress {
            with_suffix(&path, "gz")
        } else {
            path
        }
    }

    fn open(&mut self) -> io::Result<()> {
        let file = open_file(&self.path, self.restrict_permissions)?;
        self.size = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn rollover(&mut self) -> io::Result<()> {
        self.file = None;
        if self.backup_count == 0 {
            return self.open();
        }
        for i in (1..self.backup_count).rev() {
            let from = self.backup_path(i);
            if from.exists() {
                rename_over(&from, &self.backup_path(i + 1))?;
            }
        }
        if self.path.exists() {
            let first = with_suffix(&self.path, "1");
            rename_over(&self.path, &first)?;
            if self.compress {
                compress(&first)?;
            }
        }
        self.open()
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let len = bytes.len() as u64;
        let full = self.max_bytes > 0 && self.size + len >= self.max_bytes;
        if self.file.is_none() || (full && self.backup_count > 0) {
            if self.file.is_some() {
                self.rollover()?;
            } else {
                self.open()?;
            }
        }
        match self.file {
            Some(ref mut file) => {
                file.write_all(bytes)?;
                self.size += len;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Cannot open file: {:?}", self.path),
            )),
        }
    }
}

/// A handler rotating its file once it reaches a size.
///
/// Backups are named `<file>.1` (the newest) to `<file>.<backup_count>`.
#[derive(Debug)]
pub struct RotatingFileHandler {
    inner: Mutex<SizeRotator>,
}
impl Handler for RotatingFileHandler {
    fn emit(&self, entry: &Entry, formatter: &dyn Format) -> io::Result<()> {
        let line = line(entry, formatter);
        lock(&self.inner).write(line.as_bytes())
    }

    fn do_rollover(&self) -> Result<()> {
        track!(lock(&self.inner).rollover().map_err(Error::from))
    }
}

#[derive(Debug)]
struct TimedRotator {
    path: PathBuf,
    file: Option<File>,
    interval: Duration,
    backup_count: usize,
    rollover_at: SystemTime,
    timezone: TimeZone,
    compress: bool,
    restrict_permissions: bool,
}
impl TimedRotator {
    fn open(&mut self) -> io::Result<()> {
        self.file = Some(open_file(&self.path, self.restrict_permissions)?);
        Ok(())
    }

    fn backup_suffix(&self, time: SystemTime) -> String {
        let time = DateTime::<Utc>::from(time);
        match self.timezone {
            TimeZone::Utc => time.format(BACKUP_TIME_FORMAT).to_string(),
            TimeZone::Local => time
                .with_timezone(&Local)
                .format(BACKUP_TIME_FORMAT)
                .to_string(),
        }
    }

    fn expired_backups(&self) -> io::Result<Vec<PathBuf>> {
        let file_name = match self.path.file_name().and_then(|n| n.to_str()) {
            Some(name) => format!("{}.", name),
            None => return Ok(Vec::new()),
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut backups = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let suffix = name.to_str().and_then(|n| n.strip_prefix(&file_name));
            if suffix.map_or(false, |s| BACKUP_TIME_SUFFIX.is_match(s)) {
                backups.push(entry.path());
            }
        }
        backups.sort();
        let expired = backups.len().saturating_sub(self.backup_count);
        backups.truncate(expired);
        Ok(backups)
    }

    fn rollover(&mut self) -> io::Result<()> {
        self.file = None;
        let started = self
            .rollover_at
            .checked_sub(self.interval)
            .unwrap_or(self.rollover_at);
        let backup = with_suffix(&self.path, &self.backup_suffix(started));
        if self.path.exists() {
            rename_over(&self.path, &backup)?;
            if self.compress {
                compress(&backup)?;
            }
        }
        if self.backup_count > 0 {
            for expired in self.expired_backups()? {
                fs::remove_file(expired)?;
            }
        }
        self.rollover_at = rollover_time(SystemTime::now(), self.interval)?;
        self.open()
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if SystemTime::now() >= self.rollover_at {
            self.rollover()?;
        } else if self.file.is_none() {
            self.open()?;
        }
        match self.file {
            Some(ref mut file) => file.write_all(bytes),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("Cannot open file: {:?}", self.path),
            )),
        }
    }
}

/// A handler rotating its file at a fixed interval.
///
/// Backups are named `<file>.<%Y-%m-%d_%H-%M-%S>` after the start of the
/// interval they cover; only the newest `backup_count` are kept (all of them
/// when it is zero).
#[derive(Debug)]
pub struct TimedRotatingFileHandler {
    inner: Mutex<TimedRotator>,
}
impl Handler for TimedRotatingFileHandler {
    fn emit(&self, entry: &Entry, formatter: &dyn Format) -> io::Result<()> {
        let line = line(entry, formatter);
        lock(&self.inner).write(line.as_bytes())
    }

    fn do_rollover(&self) -> Result<()> {
        track!(lock(&self.inner).rollover().map_err(Error::from))
    }
}

#[derive(Debug, Clone)]
struct FileTarget {
    filename: Option<PathBuf>,
    directory: Option<PathBuf>,
    program_name: Option<String>,
    suffix: String,
    restrict_permissions: bool,
}
impl FileTarget {
    fn path(&self) -> Result<PathBuf> {
        track!(log_file_path(
            self.filename.as_deref(),
            self.directory.as_deref(),
            self.program_name.as_deref(),
            &self.suffix
        ))
    }
}
impl Default for FileTarget {
    fn default() -> Self {
        FileTarget {
            filename: None,
            directory: None,
            program_name: None,
            suffix: ".log".to_owned(),
            restrict_permissions: false,
        }
    }
}

macro_rules! file_target_setters {
    () => {
        /// Sets the file name (joined to the directory, if any).
        pub fn filename<P: AsRef<Path>>(&mut self, filename: P) -> &mut Self {
            self.target.filename = Some(filename.as_ref().to_path_buf());
            self
        }

        /// Sets the directory of the log file.
        ///
        /// Without a file name, the file is named after the program.
        pub fn directory<P: AsRef<Path>>(&mut self, directory: P) -> &mut Self {
            self.target.directory = Some(directory.as_ref().to_path_buf());
            self
        }

        /// Sets the program name used to name the file.
        pub fn program_name(&mut self, name: &str) -> &mut Self {
            self.target.program_name = Some(name.to_owned());
            self
        }

        /// Sets the suffix appended to the program name (default `.log`).
        pub fn suffix(&mut self, suffix: &str) -> &mut Self {
            self.target.suffix = suffix.to_owned();
            self
        }

        /// Makes the log file readable and writable by its owner only.
        pub fn restrict_permissions(&mut self, restrict: bool) -> &mut Self {
            self.target.restrict_permissions = restrict;
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
    };
}

/// A builder of outputs appending to a file.
///
/// # Examples
///
/// ```
/// use daiquiri::file::FileBuilder;
/// use daiquiri::Build;
///
/// let dir = tempfile::tempdir().unwrap();
/// let output = FileBuilder::new()
///     .directory(dir.path())
///     .program_name("foobar")
///     .build()
///     .unwrap();
/// assert!(dir.path().join("foobar.log").exists());
/// # drop(output);
/// ```
#[derive(Debug, Default)]
pub struct FileBuilder {
    common: BuilderCommon,
    target: FileTarget,
}
impl FileBuilder {
    /// Makes a new `FileBuilder` instance.
    pub fn new() -> Self {
        Self::default()
    }

    file_target_setters!();
}
impl Build for FileBuilder {
    fn build(&self) -> Result<Output> {
        let path = track!(self.target.path())?;
        let handler = track!(
            FileHandler::new(&path, self.target.restrict_permissions).map_err(Error::from),
            "path={:?}",
            path
        )?;
        Ok(self.common.finish(handler))
    }
}

/// A builder of outputs rotating their file by size.
#[derive(Debug, Default)]
pub struct RotatingFileBuilder {
    common: BuilderCommon,
    target: FileTarget,
    max_size_bytes: u64,
    backup_count: usize,
    compress: bool,
}
impl RotatingFileBuilder {
    /// Makes a new `RotatingFileBuilder` instance which never rotates.
    pub fn new() -> Self {
        Self::default()
    }

    file_target_setters!();

    /// Rolls over before a write would make the file reach this size.
    ///
    /// Zero (the default) disables rotation.
    pub fn max_size_bytes(&mut self, max_size_bytes: u64) -> &mut Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    /// Sets how many backups are kept.
    ///
    /// With zero (the default) the file is never rotated and grows without bounds.
    pub fn backup_count(&mut self, backup_count: usize) -> &mut Self {
        self.backup_count = backup_count;
        self
    }

    /// Compresses backups with gzip.
    #[cfg(feature = "libflate")]
    pub fn compress(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }
}
impl Build for RotatingFileBuilder {
    fn build(&self) -> Result<Output> {
        let path = track!(self.target.path())?;
        let mut rotator = SizeRotator {
            path,
            file: None,
            size: 0,
            max_bytes: self.max_size_bytes,
            backup_count: self.backup_count,
            compress: self.compress,
            restrict_permissions: self.target.restrict_permissions,
        };
        track!(
            rotator.open().map_err(Error::from),
            "path={:?}",
            rotator.path
        )?;
        Ok(self.common.finish(RotatingFileHandler {
            inner: Mutex::new(rotator),
        }))
    }
}

/// A builder of outputs rotating their file at a fixed interval.
#[derive(Debug)]
pub struct TimedRotatingFileBuilder {
    common: BuilderCommon,
    target: FileTarget,
    interval: Duration,
    backup_count: usize,
    timezone: TimeZone,
    compress: bool,
}
impl TimedRotatingFileBuilder {
    /// Makes a new `TimedRotatingFileBuilder` instance rotating every 24 hours.
    pub fn new() -> Self {
        TimedRotatingFileBuilder {
            common: BuilderCommon::default(),
            target: FileTarget::default(),
            interval: Duration::from_secs(24 * 60 * 60),
            backup_count: 0,
            timezone: TimeZone::default(),
            compress: false,
        }
    }

    file_target_setters!();

    /// Sets the rotation interval, which must not be zero.
    pub fn interval(&mut self, interval: Duration) -> &mut Self {
        self.interval = interval;
        self
    }

    /// Sets how many backups are kept; zero (the default) keeps them all.
    pub fn backup_count(&mut self, backup_count: usize) -> &mut Self {
        self.backup_count = backup_count;
        self
    }

    /// Sets the time zone of backup names.
    pub fn timezone(&mut self, timezone: TimeZone) -> &mut Self {
        self.timezone = timezone;
        self
    }

    /// Compresses backups with gzip.
    #[cfg(feature = "libflate")]
    pub fn compress(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }
}
impl Default for TimedRotatingFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl Build for TimedRotatingFileBuilder {
    fn build(&self) -> Result<Output> {
        track_assert!(
            self.interval > Duration::from_secs(0),
            ErrorKind::Invalid,
            "The rotation interval must be positive"
        );
        let path = track!(self.target.path())?;
        let started = fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|_| SystemTime::now());
        let rollover_at = track_assert_some!(
            started.checked_add(self.interval),
            ErrorKind::Invalid,
            "The rotation interval is too long: {:?}",
            self.interval
        );
        let mut rotator = TimedRotator {
            path,
            file: None,
            interval: self.interval,
            backup_count: self.backup_count,
            rollover_at,
            timezone: self.timezone,
            compress: self.compress,
            restrict_permissions: self.target.restrict_permissions,
        };
        track!(
            rotator.open().map_err(Error::from),
            "path={:?}",
            rotator.path
        )?;
        Ok(self.common.finish(TimedRotatingFileHandler {
            inner: Mutex::new(rotator),
        }))
    }
}

fn rollover_time(from: SystemTime, interval: Duration) -> io::Result<SystemTime> {
    from.checked_add(interval)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Rotation interval overflow"))
}

fn default_suffix() -> String {
    ".log".to_owned()
}

fn default_interval() -> f64 {
    24.0 * 60.0 * 60.0
}

/// The configuration of `FileBuilder`.
///
/// # Examples
///
/// ```
/// use daiquiri::file::FileConfig;
///
/// let toml = r#"
/// directory = "/var/log"
/// program_name = "foobar"
/// restrict_permissions = true
/// "#;
/// let _config: FileConfig = serdeconv::from_toml_str(toml).unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Log file name.
    #[serde(default)]
    pub filename: Option<PathBuf>,

    /// Directory of the log file.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Program name used to name the file when only a directory is set.
    #[serde(default)]
    pub program_name: Option<String>,

    /// Suffix appended to the program name.
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Makes the log file readable and writable by its owner only.
    #[serde(default)]
    pub restrict_permissions: bool,

    /// Minimum severity of this output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Severity>,

    /// Formatter of this output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<FormatterConfig>,
}
impl FileConfig {
    fn apply(&self, target: &mut FileTarget, common: &mut BuilderCommon) -> Result<()> {
        target.filename = self.filename.clone();
        target.directory = self.directory.clone();
        target.program_name = self.program_name.clone();
        target.suffix = self.suffix.clone();
        target.restrict_permissions = self.restrict_permissions;
        track!(common.configure(self.level, self.formatter.as_ref()))
    }
}
impl Config for FileConfig {
    type Builder = FileBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        let mut builder = FileBuilder::new();
        track!(self.apply(&mut builder.target, &mut builder.common))?;
        Ok(builder)
    }
}

fn check_compress(compress: bool) -> Result<()> {
    track_assert!(
        !compress || cfg!(feature = "libflate"),
        ErrorKind::Invalid,
        "Compression requires the `libflate` feature"
    );
    Ok(())
}

/// The configuration of `RotatingFileBuilder`.
///
/// # Examples
///
/// ```
/// use daiquiri::file::RotatingFileConfig;
///
/// let toml = r#"
/// filename = "/var/log/foobar.log"
/// max_size_bytes = 1048576
/// backup_count = 5
/// compress = true
/// "#;
/// let _config: RotatingFileConfig = serdeconv::from_toml_str(toml).unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotatingFileConfig {
    /// Where the file goes and who may read it.
    #[serde(flatten)]
    pub file: FileConfig,

    /// Size at which the file rolls over; zero disables rotation.
    #[serde(default)]
    pub max_size_bytes: u64,

    /// Number of backups kept; zero disables rotation.
    #[serde(default)]
    pub backup_count: usize,

    /// Whether to gzip backups.
    #[serde(default)]
    pub compress: bool,
}
impl Config for RotatingFileConfig {
    type Builder = RotatingFileBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        track!(check_compress(self.compress))?;
        let mut builder = RotatingFileBuilder::new();
        track!(self.file.apply(&mut builder.target, &mut builder.common))?;
        builder.max_size_bytes = self.max_size_bytes;
        builder.backup_count = self.backup_count;
        builder.compress = self.compress;
        Ok(builder)
    }
}

/// The configuration of `TimedRotatingFileBuilder`.
///
/// `interval` is a number of seconds, integral or not.
///
/// # Examples
///
/// ```
/// use daiquiri::file::TimedRotatingFileConfig;
///
/// let toml = r#"
/// filename = "/var/log/foobar.log"
/// interval = 3600
/// backup_count = 24
/// timezone = "utc"
/// "#;
/// let config: TimedRotatingFileConfig = serdeconv::from_toml_str(toml).unwrap();
/// assert_eq!(config.interval, 3600.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedRotatingFileConfig {
    /// Where the file goes and who may read it.
    #[serde(flatten)]
    pub file: FileConfig,

    /// Rotation interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: f64,

    /// Number of backups kept; zero keeps them all.
    #[serde(default)]
    pub backup_count: usize,

    /// Time zone of backup names.
    #[serde(default)]
    pub timezone: TimeZone,

    /// Whether to gzip backups.
    #[serde(default)]
    pub compress: bool,
}
impl Default for TimedRotatingFileConfig {
    fn default() -> Self {
        TimedRotatingFileConfig {
            file: FileConfig::default(),
            interval: default_interval(),
            backup_count: 0,
            timezone: TimeZone::default(),
            compress: false,
        }
    }
}
impl Config for TimedRotatingFileConfig {
    type Builder = TimedRotatingFileBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        track!(check_compress(self.compress))?;
        track_assert!(
            self.interval.is_finite() && self.interval > 0.0,
            ErrorKind::Invalid,
            "The rotation interval must be a positive number of seconds: {}",
            self.interval
        );
        let mut builder = TimedRotatingFileBuilder::new();
        track!(self.file.apply(&mut builder.target, &mut builder.common))?;
        builder.interval = track_assert_some!(
            Duration::try_from_secs_f64(self.interval).ok(),
            ErrorKind::Invalid,
            "The rotation interval is too long: {}",
            self.interval
        );
        builder.backup_count = self.backup_count;
        builder.timezone = self.timezone;
        builder.compress = self.compress;
        Ok(builder)
    }
}
