pub mod error;
pub mod executor;
pub mod fmt;

pub use error::Error;
pub use executor::run_query;
use serde::Deserialize;

/// Name of the single frame returned for each data query.
pub const RESPONSE_FRAME: &str = "response";

/// One data query as sent by the host, decoded from its JSON body.
///
/// `interval_ms` and `max_data_points` are rendering hints; they are
/// accepted but do not change how the query is executed.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryModel {
    pub datasource_id: i64,
    pub interval_ms: i64,
    pub max_data_points: i64,
    pub query_text: String,
    pub ref_id: String,
}
