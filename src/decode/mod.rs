//! Payload decoding module
//!
//! Turns raw ISS response text into an element tree and coerces raw
//! attribute text into typed cells.
//!
//! # Overview
//!
//! ISS answers with XML documents shaped like
//!
//! ```text
//! <document>
//!   <data id="securities">
//!     <metadata><columns><column name="SECID" type="string"/>...</columns></metadata>
//!     <rows><row SECID="SBER" .../>...</rows>
//!   </data>
//!   <data id="securities.cursor">...</data>
//! </document>
//! ```
//!
//! [`XmlDocument`] parses that text once per call; the schema reader and the
//! table builder navigate the resulting tree.

mod coerce;
mod document;

pub use coerce::{coerce, format_datetime, parse_datetime, Cell};
pub use document::{XmlDocument, XmlElement};
