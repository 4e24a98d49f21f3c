use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("replay message carries no state")]
    MissingState,
}
