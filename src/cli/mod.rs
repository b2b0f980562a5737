//! CLI module
//!
//! Command-line interface for querying ISS.
//!
//! # Commands
//!
//! - `securities`, `security`, `sec-indices` - Instrument lookups
//! - `sitenews`, `events` - Exchange news and events
//! - `engines`, `markets`, `boards` - Trading system reference data
//! - `candles` - Candles of a security
//! - `get` - Any other ISS resource
//! - `decode` - Decode a saved payload offline

mod commands;
mod runner;

pub use commands::{parse_params, Cli, Commands, OutputFormat};
pub use runner::Runner;
