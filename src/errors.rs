/// Why a feed record could not be turned into a tracked order.
///
/// These are per-record failures: the offending record is counted, logged,
/// and skipped, and the rest of the batch proceeds.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} is not a usable number: {raw}")]
    InvalidNumber { field: &'static str, raw: String },

    #[error("unrecognized side: {0}")]
    InvalidSide(String),

    #[error("start time out of range: {0}")]
    InvalidTimestamp(i64),
}
