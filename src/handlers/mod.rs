pub mod tool_handlers;

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported back to the calling agent as tool errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Missing required argument 'path' or 'content'")]
    MissingArgument,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
