use thiserror::Error;

/// Errors surfaced at the edges of the engine: configuration, mode names and
/// host resources. The per-frame paths never produce these.
#[derive(Debug, Error)]
pub enum LandscapeError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown mode: {0}")]
    UnknownMode(String),

    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("frame scheduler: {0}")]
    Scheduler(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = LandscapeError> = std::result::Result<T, E>;
