//! Query normalization module
//!
//! Sends free-text user input to an external language model and parses the
//! structured keyword reply.

mod oracle_client;
mod query_normalizer;

pub use oracle_client::{ChatMessage, OracleClient, OracleError};
pub use query_normalizer::{parse_reply, NormalizedQuery, QueryNormalizer, QueryOracle};
