//! ISS endpoint layer
//!
//! [`IssClient`] owns a [`Transport`] and an output mode. Each [`Endpoint`]
//! supplies its path, its query parameters and its shape transform.

mod endpoint;
mod iss;
mod transport;

pub use endpoint::{CandlesQuery, Endpoint, SecuritiesQuery, DEFAULT_LANG};
pub use iss::{IssClient, ERROR_BODY_LIMIT};
pub use transport::{HttpTransport, RawResponse, Transport};
