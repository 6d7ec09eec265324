//! Log records and their encoders.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use super::fields::Fields;
use super::level::Level;

const TIME_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory]:[offset_minute]"
);

/// Keys written by the encoder itself.
const RESERVED_KEYS: [&str; 3] = ["time", "level", "msg"];

/// One emitted log record.
#[derive(Debug)]
pub struct Record<'a> {
    pub time: OffsetDateTime,
    pub level: Level,
    pub message: &'a str,
    pub fields: &'a Fields,
}

impl<'a> Record<'a> {
    /// Record stamped with the current local time (UTC when the offset is unknown).
    pub fn now(level: Level, message: &'a str, fields: &'a Fields) -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        Self {
            time: OffsetDateTime::now_utc().to_offset(offset),
            level,
            message,
            fields,
        }
    }

    pub fn timestamp(&self) -> String {
        self.time
            .format(TIME_FORMAT)
            .unwrap_or_else(|_| self.time.unix_timestamp().to_string())
    }
}

/// Record encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// One JSON object per line
    #[default]
    Json,
    /// `key=value` line
    Text,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(format!("unknown log format '{s}'")),
        }
    }
}

impl Format {
    /// Encode `record` as a single newline-terminated line.
    pub fn encode(&self, record: &Record<'_>) -> Vec<u8> {
        match self {
            Self::Json => encode_json(record),
            Self::Text => encode_text(record).into_bytes(),
        }
    }
}

fn field_key(key: &str) -> std::borrow::Cow<'_, str> {
    if RESERVED_KEYS.contains(&key) {
        format!("fields.{key}").into()
    } else {
        key.into()
    }
}

struct JsonRecord<'r, 'a>(&'r Record<'a>);

impl Serialize for JsonRecord<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.0;
        let fields = record.fields.resolve();
        let mut map = serializer.serialize_map(Some(3 + fields.len()))?;
        map.serialize_entry("time", &record.timestamp())?;
        map.serialize_entry("level", &record.level)?;
        map.serialize_entry("msg", record.message)?;
        for (key, value) in fields {
            map.serialize_entry(field_key(key).as_ref(), value)?;
        }
        map.end()
    }
}

fn encode_json(record: &Record<'_>) -> Vec<u8> {
    let mut buf = serde_json::to_vec(&JsonRecord(record)).unwrap_or_else(|e| {
        format!(r#"{{"level":"ERROR","msg":"unencodable log record: {e}"}}"#).into_bytes()
    });
    buf.push(b'\n');
    buf
}

fn encode_text(record: &Record<'_>) -> String {
    let mut line = String::with_capacity(64 + record.message.len());
    let _ = write!(
        line,
        "time={} level={} msg={}",
        record.timestamp(),
        record.level,
        quote(record.message)
    );
    for (key, value) in record.fields.resolve() {
        let rendered = match value {
            Value::String(s) => quote(s),
            other => quote(&other.to_string()),
        };
        let _ = write!(line, " {}={}", field_key(key), rendered);
    }
    line.push('\n');
    line
}

/// Quote a text value when it would otherwise be ambiguous.
fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '"' || c.is_control());
    if needs_quotes {
        Value::String(value.to_string()).to_string()
    } else {
        value.to_string()
    }
}
