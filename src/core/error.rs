use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while running the probing tool.
///
/// Only [`ProbeError::Launch`] ever reaches callers of the probe functions.
/// The other kinds are logged and resolved to a default result.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The external tool could not be started at all
    #[error("Failed to launch {}: {source}", tool.display())]
    Launch {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited unsuccessfully
    #[error("Probe exited with non-zero status: {0}")]
    NonZeroExit(String),

    /// The captured output could not be interpreted
    #[error("Could not decode probe output: {0}")]
    Decode(String),
}

/// Failures raised by the playback controller.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// No media reference was supplied when building a controller
    #[error("Invalid argument: media must be set")]
    MissingMedia,

    /// `play()` was called while a player process is still starting or running
    #[error("Playback already running for {0}")]
    AlreadyRunning(String),

    /// The player process could not be started
    #[error("Failed to start {}: {source}", tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the player was interrupted without a stop request
    #[error("Unexpected interruption while playing {media}: {reason}")]
    UnexpectedInterruption { media: String, reason: String },
}
