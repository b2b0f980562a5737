//! CLI commands and argument parsing

use crate::client::{CandlesQuery, Endpoint, SecuritiesQuery};
use crate::error::{Error, Result};
use crate::types::{ParquetCompression, QueryParams};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Moscow Exchange ISS client
#[derive(Parser, Debug)]
#[command(name = "moex-iss")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Write output to this file instead of stdout (required for parquet)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Column compression for parquet output
    #[arg(long, global = true, value_enum, default_value_t = ParquetCompression::Snappy)]
    pub compression: ParquetCompression,

    /// Language for endpoints that accept one
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search securities traded on the exchange
    Securities {
        /// Search text
        q: Option<String>,

        /// Trading system (stock, currency, futures, ...)
        #[arg(long)]
        engine: Option<String>,

        /// Market within the trading system
        #[arg(long)]
        market: Option<String>,

        /// Only securities that are currently traded
        #[arg(long)]
        is_trading: Option<bool>,

        /// Grouping field (group or type)
        #[arg(long)]
        group_by: Option<String>,

        /// Value of the grouping field to keep
        #[arg(long)]
        group_by_filter: Option<String>,

        /// Page size
        #[arg(long, default_value = "100")]
        limit: u32,

        /// Offset of the first row
        #[arg(long, default_value = "0")]
        start: u32,
    },

    /// Show the specification of one instrument
    Security {
        /// Security code, e.g. SBER
        ticker: String,
    },

    /// List indices that include a security
    SecIndices {
        /// Security code
        ticker: String,

        /// Only indices the security is currently part of
        #[arg(long)]
        only_actual: bool,
    },

    /// Exchange news
    Sitenews {
        #[arg(long, default_value = "0")]
        start: u32,
    },

    /// Exchange events
    Events {
        #[arg(long, default_value = "0")]
        start: u32,
    },

    /// List trading systems
    Engines,

    /// List markets of a trading system
    Markets {
        engine: String,
    },

    /// List trading modes of a market
    Boards {
        engine: String,
        market: String,
    },

    /// Candles of a security
    Candles {
        engine: String,
        market: String,
        security: String,

        /// First day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        till: Option<NaiveDate>,

        #[arg(long, default_value = "0")]
        start: u32,

        /// Candle interval code
        #[arg(long, default_value = "5")]
        interval: u32,
    },

    /// Call any other ISS resource
    Get {
        /// Resource path, e.g. turnovers or history/engines
        endpoint: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Decode a saved ISS XML payload without network access
    Decode {
        /// Payload file
        file: PathBuf,

        /// Data block id (defaults to the first block)
        #[arg(long)]
        block: Option<String>,

        /// Pivot a name/value block into one record
        #[arg(long)]
        pivot: bool,
    },
}

impl Commands {
    /// The endpoint a network command calls, `None` for offline commands
    pub fn endpoint(&self) -> Result<Option<Endpoint>> {
        let endpoint = match self {
            Commands::Securities {
                q,
                engine,
                market,
                is_trading,
                group_by,
                group_by_filter,
                limit,
                start,
            } => Endpoint::Securities(SecuritiesQuery {
                q: q.clone(),
                lang: None,
                engine: engine.clone(),
                is_trading: *is_trading,
                market: market.clone(),
                group_by: group_by.clone(),
                group_by_filter: group_by_filter.clone(),
                limit: *limit,
                start: *start,
            }),
            Commands::Security { ticker } => Endpoint::security(ticker),
            Commands::SecIndices {
                ticker,
                only_actual,
            } => Endpoint::sec_indices(ticker, *only_actual),
            Commands::Sitenews { start } => Endpoint::sitenews(*start),
            Commands::Events { start } => Endpoint::events(*start),
            Commands::Engines => Endpoint::engines(),
            Commands::Markets { engine } => Endpoint::markets(engine),
            Commands::Boards { engine, market } => Endpoint::boards(engine, market),
            Commands::Candles {
                engine,
                market,
                security,
                from,
                till,
                start,
                interval,
            } => {
                let mut query =
                    CandlesQuery::new(engine, market, security).with_interval(*interval);
                query.start = *start;
                if let Some(from) = from {
                    query.from = *from;
                }
                if let Some(till) = till {
                    query.till = *till;
                }
                Endpoint::Candles(query)
            }
            Commands::Get { endpoint, params } => {
                Endpoint::other(endpoint, parse_params(params)?)
            }
            Commands::Decode { .. } => return Ok(None),
        };
        Ok(Some(endpoint))
    }
}

/// Parse `key=value` arguments into query parameters
pub fn parse_params(args: &[String]) -> Result<QueryParams> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| {
                    Error::invalid_value("param", format!("expected key=value, got '{arg}'"))
                })
        })
        .collect()
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of records
    Json,
    /// Human-readable table
    Table,
    /// Parquet file
    Parquet,
}
