//! Drivers module for triplestore access
//!
//! Provides the abstract transport interface (TriplestoreTransport trait) and
//! the HTTP implementation used against a live server.

mod http;
mod traits;

pub use http::{HttpTransport, SPARQL_RESULTS_JSON, SPARQL_UPDATE};
pub use traits::{HttpReply, TransportError, TransportResult, TriplestoreTransport};
