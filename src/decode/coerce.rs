//! Cell coercion
//!
//! Every ISS cell arrives as attribute text. The column's declared type
//! decides what it becomes.

use crate::schema::TypeTag;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Formats accepted for `datetime` columns. `%.f` also matches no fraction.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Output format for timestamps
const DATETIME_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A coerced scalar value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing or unparseable source value
    Null,
    /// `int64` column value
    Int64(i64),
    /// `int32` column value
    Int32(i32),
    /// `double` column value
    Double(f64),
    /// `string` column value
    Text(String),
    /// `date` column value, kept as the source text
    Date(String),
    /// `datetime` column value
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Check if the cell is null
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Get the text of a string or date cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) | Cell::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value of an integer cell
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int64(v) => Some(*v),
            Cell::Int32(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Get the value of a numeric cell as a float
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Double(v) => Some(*v),
            Cell::Int64(v) => Some(*v as f64),
            Cell::Int32(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Get the value of a datetime cell
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Render a non-null cell as text
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Text(s) | Cell::Date(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Int64(v) => write!(f, "{v}"),
            Cell::Int32(v) => write!(f, "{v}"),
            Cell::Double(v) => write!(f, "{v}"),
            Cell::Text(s) | Cell::Date(s) => f.write_str(s),
            Cell::DateTime(dt) => f.write_str(&format_datetime(dt)),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Int64(v) => serializer.serialize_i64(*v),
            Cell::Int32(v) => serializer.serialize_i32(*v),
            Cell::Double(v) if v.is_finite() => serializer.serialize_f64(*v),
            Cell::Double(_) => serializer.serialize_none(),
            Cell::Text(s) | Cell::Date(s) => serializer.serialize_str(s),
            Cell::DateTime(dt) => serializer.serialize_str(&format_datetime(dt)),
        }
    }
}

/// Coerce raw attribute text into a cell of the declared type
///
/// Never fails: text that does not parse as the declared type becomes
/// [`Cell::Null`]. Absent text is always null; empty text is null for
/// everything except `string` and `date`, which keep it as `""`.
pub fn coerce(raw: Option<&str>, tag: TypeTag) -> Cell {
    let Some(raw) = raw else {
        return Cell::Null;
    };

    match tag {
        TypeTag::String => Cell::Text(raw.to_string()),
        TypeTag::Date => Cell::Date(raw.to_string()),
        TypeTag::Int64 => raw.trim().parse().map_or(Cell::Null, Cell::Int64),
        TypeTag::Int32 => raw.trim().parse().map_or(Cell::Null, Cell::Int32),
        TypeTag::Double => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map_or(Cell::Null, Cell::Double),
        TypeTag::DateTime => parse_datetime(raw).map_or(Cell::Null, Cell::DateTime),
    }
}

/// Parse ISS datetime text
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the `T`-separated form, optional
/// fractional seconds, and a bare date (midnight).
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Format a timestamp as ISO-8601 text
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_OUTPUT_FORMAT).to_string()
}
