//! Common types used throughout the crate
//!
//! Mode selectors shared by the pipeline, the endpoint layer and the CLI.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// Query parameters in the order they are sent
pub type QueryParams = Vec<(String, String)>;

// ============================================================================
// Output Mode
// ============================================================================

/// External representation of a decoded table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// In-memory `TypedTable`
    Tabular,
    /// JSON array with one object per row
    #[default]
    #[serde(alias = "json", alias = "records")]
    RecordJson,
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Tabular => write!(f, "tabular"),
            OutputMode::RecordJson => write!(f, "record_json"),
        }
    }
}

// ============================================================================
// Transform Mode
// ============================================================================

/// Reshape applied to a decoded table before rendering
///
/// Chosen by the endpoint that issued the request, never inferred from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformMode {
    /// Table passes through unchanged
    #[default]
    Default,
    /// Name/value rows become one wide row
    EntityPivot,
}

// ============================================================================
// Parquet Compression
// ============================================================================

/// Column compression of written Parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ParquetCompression {
    None,
    #[default]
    Snappy,
    Gzip,
    Zstd,
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
