//! Level description codec
//!
//! A level is a list of `<kind> <json-object>` records separated by `;`.
//! Surrounding whitespace is ignored and so are blank records:
//!
//! ```text
//! player {"x": 0, "y": 0};
//! wall {"x": -50, "y": 40, "w": 200, "h": 20};
//! platform {"x": 200, "y": 0, "w": 80, "h": 10, "type": "loop", "path": [[0, 0], [100, 0]]};
//! ```
//!
//! Parsing is strict: property objects are JSON, never evaluated code.

use serde_json::Value;
use thiserror::Error;

use crate::settings::Settings;
use crate::sim::spawn::{EntitySpec, SpawnError, SpawnKind, spawn_checked};

/// Why one record was rejected
#[derive(Debug, Error)]
pub enum LevelErrorKind {
    #[error("record has no property object")]
    MissingProperties,
    #[error("unknown entity kind `{0}`")]
    UnknownKind(String),
    #[error("invalid JSON at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("properties must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Invalid(#[from] SpawnError),
}

/// A rejected record and where it was found
#[derive(Debug, Error)]
#[error("level record {record} (byte {offset}): {kind}")]
pub struct LevelError {
    /// Zero-based index among the `;`-separated records, blanks included
    pub record: usize,
    /// Byte offset of the record's first non-blank character
    pub offset: usize,
    pub kind: LevelErrorKind,
}

/// Result of parsing a whole level: good records plus the rejected ones
#[derive(Debug, Default)]
pub struct ParsedLevel {
    pub specs: Vec<EntitySpec>,
    pub errors: Vec<LevelError>,
}

struct Record<'a> {
    index: usize,
    offset: usize,
    text: &'a str,
}

fn records(source: &str) -> impl Iterator<Item = Record<'_>> {
    let mut start = 0;
    source.split(';').enumerate().filter_map(move |(index, raw)| {
        let raw_start = start;
        start += raw.len() + 1;

        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        let lead = raw.len() - raw.trim_start().len();
        Some(Record {
            index,
            offset: raw_start + lead,
            text,
        })
    })
}

fn parse_record(text: &str) -> Result<EntitySpec, LevelErrorKind> {
    let split = text
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(text.len());
    let (name, rest) = text.split_at(split);
    let rest = rest.trim();

    let kind = SpawnKind::from_name(name).ok_or_else(|| LevelErrorKind::UnknownKind(name.to_string()))?;
    if rest.is_empty() {
        return Err(LevelErrorKind::MissingProperties);
    }

    let value: Value = serde_json::from_str(rest).map_err(|err| LevelErrorKind::Syntax {
        line: err.line(),
        column: err.column(),
        message: err.to_string(),
    })?;
    match value {
        Value::Object(props) => Ok(EntitySpec::new(kind, props)),
        _ => Err(LevelErrorKind::NotAnObject),
    }
}

/// Parse a level description
///
/// Bad records are collected in `errors` and otherwise skipped; parsing
/// never stops early.
pub fn parse(source: &str) -> ParsedLevel {
    let mut level = ParsedLevel::default();
    for record in records(source) {
        match parse_record(record.text) {
            Ok(spec) => level.specs.push(spec),
            Err(kind) => level.errors.push(LevelError {
                record: record.index,
                offset: record.offset,
                kind,
            }),
        }
    }
    level
}

/// Parse and also reject records whose properties do not fit their kind
pub fn parse_checked(source: &str, settings: &Settings) -> ParsedLevel {
    let mut level = ParsedLevel::default();
    for record in records(source) {
        let checked = parse_record(record.text)
            .and_then(|spec| spawn_checked(&spec, 0, settings).map(|_| spec).map_err(LevelErrorKind::from));
        match checked {
            Ok(spec) => level.specs.push(spec),
            Err(kind) => level.errors.push(LevelError {
                record: record.index,
                offset: record.offset,
                kind,
            }),
        }
    }
    level
}

/// Serialize one record, including the trailing `;`
pub fn record_string(spec: &EntitySpec) -> String {
    format!("{} {};\n", spec.kind.as_str(), Value::Object(spec.props.clone()))
}

/// Serialize specs into a level description `parse` reads back unchanged
pub fn to_level_string(specs: &[EntitySpec]) -> String {
    specs.iter().map(record_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"
        player {"x": 0, "y": 0};
        wall {"x": -50, "y": 40, "w": 200, "h": 20};

        ;
        platform {"x": 10, "y": 5, "w": 30, "h": 5, "type": "loop", "frames": 60, "path": [[0, 0], [40, 0, 20]]};
    "#;

    #[test]
    fn test_parse_records() {
        let level = parse(LEVEL);
        assert!(level.errors.is_empty());
        let kinds: Vec<_> = level.specs.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SpawnKind::Player, SpawnKind::Wall, SpawnKind::Platform]);
        assert_eq!(level.specs[1].number("w"), Some(200.0));
    }

    #[test]
    fn test_parse_without_space_before_object() {
        let level = parse(r#"player{"x": 1, "y": 2}"#);
        assert_eq!(level.specs.len(), 1);
        assert_eq!(level.specs[0].number("y"), Some(2.0));
    }

    #[test]
    fn test_unknown_kind_keeps_going() {
        let source = r#"player {"x": 0, "y": 0}; dragon {"x": 5}; wall {"x": 0, "y": 0, "w": 1, "h": 1}"#;
        let level = parse(source);
        assert_eq!(level.specs.len(), 2);
        assert_eq!(level.errors.len(), 1);

        let err = &level.errors[0];
        assert_eq!(err.record, 1);
        assert_eq!(&source[err.offset..err.offset + 6], "dragon");
        assert!(matches!(&err.kind, LevelErrorKind::UnknownKind(name) if name == "dragon"));
    }

    #[test]
    fn test_syntax_error_has_position() {
        let level = parse("player {\"x\": 0,\n \"y\": }");
        let err = &level.errors[0];
        match &err.kind {
            LevelErrorKind::Syntax { line, column, .. } => {
                assert_eq!(*line, 2);
                assert!(*column > 0);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
        assert!(err.to_string().contains("level record 0"));
    }

    #[test]
    fn test_missing_and_non_object_properties() {
        let level = parse("player; wall [1, 2]");
        assert!(matches!(level.errors[0].kind, LevelErrorKind::MissingProperties));
        assert!(matches!(level.errors[1].kind, LevelErrorKind::NotAnObject));
    }

    #[test]
    fn test_checked_rejects_bad_mode() {
        let source = r#"
            player {"x": 0, "y": 0};
            platform {"x": 0, "y": 0, "w": 1, "h": 1, "type": "zigzag", "path": [[0, 0]]};
        "#;
        let level = parse_checked(source, &Settings::default());
        assert_eq!(level.specs.len(), 1);
        assert!(matches!(level.errors[0].kind, LevelErrorKind::Invalid(_)));
        assert_eq!(level.errors[0].record, 1);
    }

    #[test]
    fn test_round_trip() {
        let first = parse(LEVEL);
        let text = to_level_string(&first.specs);
        let second = parse(&text);
        assert!(second.errors.is_empty());
        assert_eq!(first.specs, second.specs);
        assert!(text.starts_with("player {"));
        assert!(text.ends_with(";\n"));
    }
}
