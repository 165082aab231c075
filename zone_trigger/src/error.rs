// THEORY:
// The `error` module gathers every failure the engine can report into a single
// enum. Most "errors" in a live trigger loop are not errors at all: a missing
// frame is simply a tick with nothing to do, and a failed device read is
// retried by the acquisition thread without ever surfacing here. What remains
// are the cases where the caller handed us something we cannot interpret: a
// frame with an unexpected memory layout, or a configuration file that is
// unreadable or describes an impossible pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    /// The frame buffer does not hold `width * height` packed RGB pixels.
    #[error("unexpected frame layout: {width}x{height} with {channels} channels in a {len}-byte buffer")]
    UnexpectedLayout {
        width: u32,
        height: u32,
        channels: u8,
        len: usize,
    },

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TriggerError>;
