//! Schema types

use serde::{Deserialize, Serialize};

/// Declared type of an ISS column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Int64,
    Int32,
    String,
    DateTime,
    Double,
    Date,
}

impl TypeTag {
    /// Every supported declared type
    pub const ALL: [TypeTag; 6] = [
        TypeTag::Int64,
        TypeTag::Int32,
        TypeTag::String,
        TypeTag::DateTime,
        TypeTag::Double,
        TypeTag::Date,
    ];

    /// Resolve a wire token (case-insensitive)
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(token.trim()))
    }

    /// Wire token for this type
    pub const fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Int64 => "int64",
            TypeTag::Int32 => "int32",
            TypeTag::String => "string",
            TypeTag::DateTime => "datetime",
            TypeTag::Double => "double",
            TypeTag::Date => "date",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Lower-cased column name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub declared_type: TypeTag,
}

impl ColumnSchema {
    /// Create a column, lower-casing its name
    pub fn new(name: impl AsRef<str>, declared_type: TypeTag) -> Self {
        Self {
            name: name.as_ref().to_lowercase(),
            declared_type,
        }
    }
}
