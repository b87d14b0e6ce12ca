use crate::{ErrorKind, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use trackable::error::ErrorKindExt;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)(?::([<>^])?([0-9]+)?(?:\.([0-9]+))?)?\}")
        .expect("never fails")
});

/// A parsed format string such as `{levelname:<8.8} {name}: {message}`.
///
/// A placeholder names a field and may carry an alignment (`<`, `>` or
/// `^`), a minimum width and a maximum width (after the dot), like Rust's
/// own string formatting. `{{` and `}}` stand for literal braces.
///
/// # Examples
///
/// ```
/// use daiquiri::format::Template;
///
/// let template: Template = "{levelname:<8.8}|{name}".parse().unwrap();
/// let rendered = template.render(|field| match field {
///     "levelname" => Some("CRITICAL_ERROR".into()),
///     "name" => Some("app".into()),
///     _ => None,
/// });
/// assert_eq!(rendered, "CRITICAL|app");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}
impl Template {
    /// Parses a format string.
    pub fn parse(source: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(source) {
            let whole = caps.get(0).expect("never fails");
            track!(push_literal(&mut literal, &source[last..whole.start()]))?;
            last = whole.end();
            match whole.as_str() {
                "{{" => literal.push('{'),
                "}}" => literal.push('}'),
                _ => {
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    let align = match caps.get(2).map(|m| m.as_str()) {
                        Some(">") => Align::Right,
                        Some("^") => Align::Center,
                        _ => Align::Left,
                    };
                    let width = track!(parse_number(caps.get(3).map(|m| m.as_str())))?;
                    let precision = track!(parse_number(caps.get(4).map(|m| m.as_str())))?;
                    pieces.push(Piece::Field(Placeholder {
                        name: caps[1].to_owned(),
                        align,
                        width,
                        precision,
                    }));
                }
            }
        }
        track!(push_literal(&mut literal, &source[last..]))?;
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Template {
            source: source.to_owned(),
            pieces,
        })
    }

    /// The format string this template was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Iterates the names of the fields referenced by this template.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match *p {
            Piece::Field(ref f) => Some(f.name.as_str()),
            Piece::Literal(_) => None,
        })
    }

    /// Renders this template, asking `lookup` for the value of each field.
    ///
    /// Fields for which `lookup` returns `None` render as empty strings.
    pub fn render<'a, F>(&self, mut lookup: F) -> String
    where
        F: FnMut(&str) -> Option<Cow<'a, str>>,
    {
        let mut out = String::new();
        for piece in &self.pieces {
            match *piece {
                Piece::Literal(ref s) => out.push_str(s),
                Piece::Field(ref f) => {
                    let value = lookup(&f.name).unwrap_or(Cow::Borrowed(""));
                    f.write_padded(&mut out, &value);
                }
            }
        }
        out
    }
}
impl FromStr for Template {
    type Err = crate::Error;
    fn from_str(s: &str) -> Result<Self> {
        Template::parse(s)
    }
}
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field(Placeholder),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
    name: String,
    align: Align,
    width: Option<usize>,
    precision: Option<usize>,
}
impl Placeholder {
    fn write_padded(&self, out: &mut String, value: &str) {
        let value: Cow<str> = match self.precision {
            Some(max) if value.chars().count() > max => Cow::Owned(value.chars().take(max).collect()),
            _ => Cow::Borrowed(value),
        };
        let len = value.chars().count();
        let pad = self.width.map_or(0, |w| w.saturating_sub(len));
        let (before, after) = match self.align {
            Align::Left => (0, pad),
            Align::Right => (pad, 0),
            Align::Center => (pad / 2, pad - pad / 2),
        };
        out.extend(std::iter::repeat(' ').take(before));
        out.push_str(&value);
        out.extend(std::iter::repeat(' ').take(after));
    }
}

fn push_literal(literal: &mut String, text: &str) -> Result<()> {
    track_assert!(
        !text.contains(|c| c == '{' || c == '}'),
        ErrorKind::Invalid,
        "Unmatched brace or malformed placeholder in format string: {:?}",
        text
    );
    literal.push_str(text);
    Ok(())
}

fn parse_number(s: Option<&str>) -> Result<Option<usize>> {
    match s {
        None => Ok(None),
        Some(s) => {
            let n = track!(s
                .parse::<usize>()
                .map_err(|e| ErrorKind::Invalid.cause(e)))?;
            Ok(Some(n))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(template: &str, fields: &[(&str, &str)]) -> String {
        let template = Template::parse(template).unwrap();
        template.render(|name| {
            fields
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| Cow::Owned(v.to_string()))
        })
    }

    #[test]
    fn pads_and_truncates_like_rust_format() {
        assert_eq!(render("{l:<8.8}|", &[("l", "INFO")]), "INFO    |");
        assert_eq!(render("{l:<8.8}|", &[("l", "CRITICALLY")]), "CRITICAL|");
        assert_eq!(render("{l:>6}|", &[("l", "ab")]), "    ab|");
        assert_eq!(render("{l:^6}|", &[("l", "ab")]), "  ab  |");
        assert_eq!(render("{l:.3}", &[("l", "abcdef")]), "abc");
    }

    #[test]
    fn escapes_and_missing_fields() {
        assert_eq!(render("{{{a}}}", &[("a", "x")]), "{x}");
        assert_eq!(render("[{missing}]", &[]), "[]");
    }

    #[test]
    fn lists_fields_in_order() {
        let template = Template::parse("{asctime} {name}{extras}: {message}").unwrap();
        let fields: Vec<_> = template.fields().collect();
        assert_eq!(fields, ["asctime", "name", "extras", "message"]);
        assert_eq!(template.to_string(), "{asctime} {name}{extras}: {message}");
    }

    #[test]
    fn rejects_malformed_placeholders() {
        for bad in &["{", "}", "{name", "{9lives}", "{name:x}", "a } b"] {
            let e = Template::parse(bad).unwrap_err();
            assert_eq!(*e.kind(), ErrorKind::Invalid, "{:?}", bad);
        }
    }
}
