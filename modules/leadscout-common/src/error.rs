use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadScoutError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Draft failed: {0}")]
    Draft(String),

    #[error("Persistence unavailable: {0}")]
    Persistence(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
