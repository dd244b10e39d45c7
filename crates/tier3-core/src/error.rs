use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Infrastructure faults only. Decision outcomes (LID invalid, age not
/// verified, UPC unknown) are never modeled as errors — they populate
/// fields on the decision context and flow through to the response.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("malformed POS request: {0}")]
    Ingest(String),

    #[error("AVT audit write failed: {0}")]
    AvtWriteFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
