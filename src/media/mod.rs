pub mod fraction;
pub mod metadata;
pub mod probe;

pub use metadata::MediaMetadata;
pub use probe::{parse_duration_output, MetadataProbe};
