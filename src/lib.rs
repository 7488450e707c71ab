//! Play media through `ffplay` and read its metadata through `ffprobe`.
//!
//! Nothing here decodes media. The crate starts the external tools, keeps
//! track of the player process, and interprets what the probe prints.

pub mod core;
pub mod media;
pub mod playback;

pub use crate::core::{AppConfig, FfmpegTools, MediaRef, PlaybackError, ProbeError};
pub use crate::media::{fraction, MediaMetadata, MetadataProbe};
pub use crate::playback::{PlaybackController, PlaybackOptions, PlaybackState};
