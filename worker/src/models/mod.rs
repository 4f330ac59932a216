pub mod job;
pub mod status;
pub mod video;

pub use job::{
    AggregateOutput, ManifestOutput, PrepareOutput, SegmentOutput, SegmentedFile,
    TranscodeOutcome, TranscodedFile, UploadOutput,
};
pub use status::ProcessingStatus;
pub use video::{ProcessingMetadata, VideoRecord};
