pub mod tool_error;

use std::io;

use thiserror::Error as ThisError;

use crate::error::tool_error::ToolError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serde_json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("llm error: {0}")]
    LlmError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("tool error: {0}")]
    ToolError(#[from] ToolError),
}

pub type Result<T> = core::result::Result<T, Error>;
