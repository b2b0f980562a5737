// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # moex-iss
//!
//! Typed tables from Moscow Exchange ISS XML responses.
//!
//! ## Features
//!
//! - **Schema-driven decoding**: Column names and types come from the payload's own metadata
//! - **Typed cells**: int64, int32, double, string, date and datetime values, with nulls
//! - **Entity pivot**: Name/value description blocks become a single wide record
//! - **Two output modes**: An in-memory table or a JSON array of records
//! - **Arrow Output**: RecordBatch conversion and Parquet files
//! - **HTTP client**: Retries, backoff and rate limiting against iss.moex.com
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use moex_iss::{ClientConfig, IssClient, OutputMode, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::default().with_output_mode(OutputMode::RecordJson);
//!     let client = IssClient::from_config(&config)?;
//!
//!     let sber = client.security("SBER").await?;
//!     println!("{}", sber.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          IssClient                              │
//! │  Endpoint → path + params + TransformMode      Transport → body │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Schema  │  Coerce   │    Table      │ Transform │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ columns  │ int/float │ schema order  │ Default   │ Tabular     │
//! │ types    │ date/time │ nulls         │ Pivot     │ RecordJSON  │
//! │          │ text      │               │           │ Arrow       │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// XML documents and cell coercion
pub mod decode;

/// Column schema extraction
pub mod schema;

/// Typed table assembly
pub mod table;

/// Shape transforms
pub mod transform;

/// Rendering, Arrow and Parquet output
pub mod output;

/// Payload pipeline
pub mod pipeline;

/// HTTP client with retry and rate limiting
pub mod http;

/// ISS endpoints and client
pub mod client;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use client::{Endpoint, IssClient, RawResponse, Transport};
pub use config::ClientConfig;
pub use output::Rendered;
pub use pipeline::{process, transform_result, PipelineConfig};
pub use table::TypedTable;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
