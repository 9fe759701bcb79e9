use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pane index {index} out of range for a {panes}-pane layout")]
    PaneIndex { index: usize, panes: usize },

    #[error("invalid key combination: {0:?}")]
    InvalidKey(String),

    #[error("input stream closed")]
    StreamClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
