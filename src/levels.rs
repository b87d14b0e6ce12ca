//! Process-wide registry of per-logger levels.
//!
//! Logger names are hierarchical: an entry for `app` also covers `app.db`
//! and `app::db`. When several entries cover a logger, the most specific one
//! applies. Loggers without any entry use the level `setup` gave the root.
use crate::types::Severity;
use crate::{ErrorKind, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::RwLock;

static LEVELS: Lazy<RwLock<HashMap<String, Severity>>> = Lazy::new(Default::default);
static ROOT_LEVEL: Lazy<RwLock<Severity>> = Lazy::new(Default::default);

fn covers(entry: &str, name: &str) -> bool {
    match name.strip_prefix(entry) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with("::"),
        None => false,
    }
}

/// Sets the level of the logger `name` (and of its descendants without a
/// more specific entry).
pub(crate) fn set_level(name: &str, severity: Severity) {
    let mut levels = LEVELS.write().unwrap_or_else(|e| e.into_inner());
    levels.insert(name.to_owned(), severity);
}

pub(crate) fn set_root_level(severity: Severity) {
    *ROOT_LEVEL.write().unwrap_or_else(|e| e.into_inner()) = severity;
}

/// The level of the last installed root logger (`warning` before any setup).
pub(crate) fn root_level() -> Severity {
    *ROOT_LEVEL.read().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
pub(crate) fn clear() {
    LEVELS.write().unwrap_or_else(|e| e.into_inner()).clear();
}

/// Returns the level configured for the logger `name`, if any entry covers it.
///
/// # Examples
///
/// ```
/// use daiquiri::types::Severity;
///
/// daiquiri::set_default_log_levels(vec![("amqp", Severity::Error)]);
/// assert_eq!(daiquiri::effective_level("amqp.channel"), Some(Severity::Error));
/// assert_eq!(daiquiri::effective_level("amqplib"), None);
/// ```
pub fn effective_level(name: &str) -> Option<Severity> {
    let levels = LEVELS.read().unwrap_or_else(|e| e.into_inner());
    levels
        .iter()
        .filter(|(entry, _)| covers(entry, name))
        .max_by_key(|(entry, _)| entry.len())
        .map(|(_, severity)| *severity)
}

/// Sets the levels of several loggers at once.
pub fn set_default_log_levels<I, S>(levels: I)
where
    I: IntoIterator<Item = (S, Severity)>,
    S: AsRef<str>,
{
    for (name, severity) in levels {
        set_level(name.as_ref(), severity);
    }
}

/// Parses `name<separator>level` strings and sets the levels they describe.
///
/// Nothing is set unless every string parses.
///
/// # Examples
///
/// ```
/// use daiquiri::types::Severity;
///
/// daiquiri::parse_and_set_default_log_levels(&["iso8601=info", "kazoo=ERROR"], "=").unwrap();
/// assert_eq!(daiquiri::effective_level("kazoo"), Some(Severity::Error));
///
/// assert!(daiquiri::parse_and_set_default_log_levels(&["kazoo"], "=").is_err());
/// ```
pub fn parse_and_set_default_log_levels<I, S>(levels: I, separator: &str) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = Vec::new();
    for pair in levels {
        let pair = pair.as_ref();
        let (name, level) = match pair.split_once(separator) {
            Some(split) => split,
            None => track_panic!(ErrorKind::Invalid, "Wrong log level format: {:?}", pair),
        };
        let severity: Severity = track!(level.parse())?;
        parsed.push((name.to_owned(), severity));
    }
    set_default_log_levels(parsed);
    Ok(())
}
