use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("a harvest run is already in progress")]
    RunInProgress,

    #[error("page host failed: {0}")]
    Host(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Export failures are recoverable: the collected records stay with the caller.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
