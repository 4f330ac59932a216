pub mod probe;
pub mod transcoder;

pub use probe::probe_metadata;
pub use transcoder::{count_segments, segment_rendition, transcode_rendition};
