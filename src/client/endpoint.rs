//! ISS endpoint definitions
//!
//! Each endpoint knows its resource path, the query parameters it sends and
//! the shape transform its payload needs. Parameters left as `None` are not
//! sent at all.

use crate::types::{QueryParams, TransformMode};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Language used by endpoints that default to one
pub const DEFAULT_LANG: &str = "ru";

/// Date format for candle bounds
const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Query Parameters
// ============================================================================

/// Accumulates query parameters, skipping unset values
#[derive(Debug, Default)]
struct Params(QueryParams);

impl Params {
    fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    fn opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    fn flag(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.push(key, u8::from(v)),
            None => self,
        }
    }

    fn finish(self) -> QueryParams {
        self.0
    }
}

/// Filters for the securities search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritiesQuery {
    /// Search text matched against codes, names, ISINs and registration numbers
    pub q: Option<String>,
    pub lang: Option<String>,
    pub engine: Option<String>,
    pub is_trading: Option<bool>,
    pub market: Option<String>,
    pub group_by: Option<String>,
    pub group_by_filter: Option<String>,
    /// Page size
    pub limit: u32,
    /// Offset of the first row
    pub start: u32,
}

impl Default for SecuritiesQuery {
    fn default() -> Self {
        Self {
            q: None,
            lang: None,
            engine: None,
            is_trading: None,
            market: None,
            group_by: None,
            group_by_filter: None,
            limit: 100,
            start: 0,
        }
    }
}

impl SecuritiesQuery {
    /// Search for securities matching text
    pub fn search(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Self::default()
        }
    }

    /// Set the page size
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the offset of the first row
    #[must_use]
    pub fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }
}

/// Candle request for one security
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandlesQuery {
    pub engine: String,
    pub market: String,
    pub security: String,
    /// First day, inclusive
    pub from: NaiveDate,
    /// Last day, inclusive
    pub till: NaiveDate,
    pub start: u32,
    /// Candle interval code (1, 10, 60, 24, 7, 31, 4)
    pub interval: u32,
}

impl CandlesQuery {
    /// Candles for today with the default interval
    pub fn new(
        engine: impl Into<String>,
        market: impl Into<String>,
        security: impl Into<String>,
    ) -> Self {
        let today = Local::now().date_naive();
        Self {
            engine: engine.into(),
            market: market.into(),
            security: security.into(),
            from: today,
            till: today,
            start: 0,
            interval: 5,
        }
    }

    /// Restrict to a date range
    #[must_use]
    pub fn between(mut self, from: NaiveDate, till: NaiveDate) -> Self {
        self.from = from;
        self.till = till;
        self
    }

    /// Set the candle interval
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// A request against one ISS resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Securities traded on the exchange
    Securities(SecuritiesQuery),
    /// Specification of a single instrument
    Security {
        ticker: String,
        lang: Option<String>,
        start: u32,
    },
    /// Indices that include a security
    SecIndices {
        ticker: String,
        lang: Option<String>,
        only_actual: bool,
    },
    /// Exchange news
    SiteNews { start: u32, lang: String },
    /// Exchange events
    Events { start: u32, lang: String },
    /// Trading systems
    Engines { lang: String },
    /// Markets of a trading system
    Markets { engine: String, lang: String },
    /// Trading modes of a market
    Boards {
        engine: String,
        market: String,
        lang: String,
    },
    /// Candles of a security
    Candles(CandlesQuery),
    /// Any other resource, with caller supplied parameters
    Other {
        endpoint: String,
        params: QueryParams,
    },
}

impl Endpoint {
    /// Instrument specification for a ticker
    pub fn security(ticker: impl Into<String>) -> Self {
        Endpoint::Security {
            ticker: ticker.into(),
            lang: None,
            start: 0,
        }
    }

    /// Indices including a ticker
    pub fn sec_indices(ticker: impl Into<String>, only_actual: bool) -> Self {
        Endpoint::SecIndices {
            ticker: ticker.into(),
            lang: None,
            only_actual,
        }
    }

    /// Exchange news starting at an offset
    pub fn sitenews(start: u32) -> Self {
        Endpoint::SiteNews {
            start,
            lang: DEFAULT_LANG.to_string(),
        }
    }

    /// Exchange events starting at an offset
    pub fn events(start: u32) -> Self {
        Endpoint::Events {
            start,
            lang: DEFAULT_LANG.to_string(),
        }
    }

    /// All trading systems
    pub fn engines() -> Self {
        Endpoint::Engines {
            lang: DEFAULT_LANG.to_string(),
        }
    }

    /// Markets of a trading system
    pub fn markets(engine: impl Into<String>) -> Self {
        Endpoint::Markets {
            engine: engine.into(),
            lang: DEFAULT_LANG.to_string(),
        }
    }

    /// Boards of a market
    pub fn boards(engine: impl Into<String>, market: impl Into<String>) -> Self {
        Endpoint::Boards {
            engine: engine.into(),
            market: market.into(),
            lang: DEFAULT_LANG.to_string(),
        }
    }

    /// Any other resource
    pub fn other(endpoint: impl Into<String>, params: QueryParams) -> Self {
        Endpoint::Other {
            endpoint: endpoint.into(),
            params,
        }
    }

    /// Replace the language on endpoints that send one
    #[must_use]
    pub fn with_lang(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        match &mut self {
            Endpoint::Securities(query) => query.lang = Some(value),
            Endpoint::Security { lang, .. } | Endpoint::SecIndices { lang, .. } => {
                *lang = Some(value);
            }
            Endpoint::SiteNews { lang, .. }
            | Endpoint::Events { lang, .. }
            | Endpoint::Engines { lang }
            | Endpoint::Markets { lang, .. }
            | Endpoint::Boards { lang, .. } => *lang = value,
            Endpoint::Candles(_) | Endpoint::Other { .. } => {}
        }
        self
    }

    /// Short name used in logs and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Securities(_) => "securities",
            Endpoint::Security { .. } => "security",
            Endpoint::SecIndices { .. } => "sec_indices",
            Endpoint::SiteNews { .. } => "sitenews",
            Endpoint::Events { .. } => "events",
            Endpoint::Engines { .. } => "engines",
            Endpoint::Markets { .. } => "markets",
            Endpoint::Boards { .. } => "boards",
            Endpoint::Candles(_) => "candles",
            Endpoint::Other { .. } => "other",
        }
    }

    /// Shape transform applied to this endpoint's payload
    pub const fn transform_mode(&self) -> TransformMode {
        match self {
            Endpoint::Security { .. } => TransformMode::EntityPivot,
            _ => TransformMode::Default,
        }
    }

    /// Resource path relative to the ISS base URL, with the XML suffix
    pub fn path(&self) -> String {
        let resource = match self {
            Endpoint::Securities(_) => "securities".to_string(),
            Endpoint::Security { ticker, .. } => format!("securities/{ticker}"),
            Endpoint::SecIndices { ticker, .. } => format!("securities/{ticker}/indices"),
            Endpoint::SiteNews { .. } => "sitenews".to_string(),
            Endpoint::Events { .. } => "events".to_string(),
            Endpoint::Engines { .. } => "engines".to_string(),
            Endpoint::Markets { engine, .. } => format!("engines/{engine}/markets"),
            Endpoint::Boards { engine, market, .. } => {
                format!("engines/{engine}/markets/{market}/boards")
            }
            Endpoint::Candles(query) => format!(
                "engines/{}/markets/{}/securities/{}/candles",
                query.engine, query.market, query.security
            ),
            Endpoint::Other { endpoint, .. } => {
                let endpoint = endpoint.trim_matches('/');
                endpoint.strip_suffix(".xml").unwrap_or(endpoint).to_string()
            }
        };
        format!("/{resource}.xml")
    }

    /// Query parameters in the order ISS documents them
    pub fn params(&self) -> QueryParams {
        match self {
            Endpoint::Securities(query) => Params::default()
                .opt("q", query.q.as_deref())
                .opt("lang", query.lang.as_deref())
                .opt("engine", query.engine.as_deref())
                .flag("is_trading", query.is_trading)
                .opt("market", query.market.as_deref())
                .opt("group_by", query.group_by.as_deref())
                .opt("group_by_filter", query.group_by_filter.as_deref())
                .push("limit", query.limit)
                .push("start", query.start)
                .finish(),
            Endpoint::Security { lang, start, .. } => Params::default()
                .opt("lang", lang.as_deref())
                .push("start", start)
                .finish(),
            Endpoint::SecIndices {
                lang, only_actual, ..
            } => Params::default()
                .opt("lang", lang.as_deref())
                .flag("only_actual", Some(*only_actual))
                .finish(),
            Endpoint::SiteNews { start, lang } | Endpoint::Events { start, lang } => {
                Params::default()
                    .push("lang", lang)
                    .push("start", start)
                    .finish()
            }
            Endpoint::Engines { lang }
            | Endpoint::Markets { lang, .. }
            | Endpoint::Boards { lang, .. } => Params::default().push("lang", lang).finish(),
            Endpoint::Candles(query) => Params::default()
                .push("from", query.from.format(DATE_FORMAT))
                .push("till", query.till.format(DATE_FORMAT))
                .push("start", query.start)
                .push("interval", query.interval)
                .finish(),
            Endpoint::Other { params, .. } => params.clone(),
        }
    }
}
