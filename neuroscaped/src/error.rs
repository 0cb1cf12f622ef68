use neuroscape::error::LandscapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine data directory")]
    NoDataDir,

    #[error(transparent)]
    Landscape(#[from] LandscapeError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = DaemonError> = std::result::Result<T, E>;
