//! Error types for flow-art.
//!
//! Generation itself never fails hard: out-of-range lookups clamp, placement
//! exhaustion skips slots, degenerate curves are dropped. The variants here
//! cover the edges of the system (dimensions, color parsing, files, tasks).

use thiserror::Error;

/// Errors produced by flow-art operations.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Width or height was zero (or overflowed) when creating a grid or canvas.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A weighted table could not be constructed from the given entries.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// Writing or reading an image failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// A generation pass was cancelled before it finished.
    #[error("generation cancelled")]
    Cancelled,

    /// A background generation task stopped without producing a result.
    #[error("generation task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = FlowError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_color_includes_message() {
        let msg = FlowError::InvalidColor("bad hex".into()).to_string();
        assert!(msg.contains("bad hex"), "missing message in: {msg}");
    }

    #[test]
    fn invalid_palette_includes_message() {
        let msg = FlowError::InvalidPalette("empty".into()).to_string();
        assert!(msg.contains("empty"), "missing message in: {msg}");
    }

    #[test]
    fn io_includes_message() {
        let msg = FlowError::Io("disk full".into()).to_string();
        assert!(msg.contains("disk full"), "missing message in: {msg}");
    }

    #[test]
    fn task_failed_includes_reason() {
        let msg = FlowError::TaskFailed("worker panicked".into()).to_string();
        assert!(msg.contains("worker panicked"), "missing reason in: {msg}");
    }

    #[test]
    fn flow_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FlowError>();
    }

    #[test]
    fn flow_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<FlowError>();
    }
}
