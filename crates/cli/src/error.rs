//! `flow-art` failures and the exit code each one maps to.
//!
//! | code | meaning |
//! |------|---------|
//! | 0    | success |
//! | 2    | clap rejected the arguments |
//! | 10   | generation failed, was cancelled, or got a zero-sized canvas |
//! | 11   | reading a config file or writing the PNG failed |
//! | 12   | bad `--params`/config JSON, unknown palette, bad color |
//! | 13   | printing JSON output failed |

use flow_art_core::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Generation(FlowError),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Input(String),
    #[error("could not serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Generation(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// File errors surface as I/O, malformed colors and palettes as user input;
/// everything else (dimensions, cancellation, a dead worker) is a
/// generation failure.
impl From<FlowError> for CliError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Io(msg) => CliError::Io(msg),
            FlowError::InvalidColor(_) | FlowError::InvalidPalette(_) => {
                CliError::Input(e.to_string())
            }
            other => CliError::Generation(other),
        }
    }
}
