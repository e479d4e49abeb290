//! cnvt library
//!
//! A command-line tool for simple media file conversions and muxing with
//! FFmpeg. The heart of the crate is the argument planner, a pure
//! translation of validated options into an ordered ffmpeg argument list;
//! everything media-related is delegated to the external ffmpeg and ffprobe
//! processes.

pub mod app;
pub mod cli;
pub mod codecs;
pub mod error;
pub mod exec;
pub mod inputs;
pub mod model;
pub mod planner;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use codecs::CodecRegistry;
pub use error::{CnvtError, CnvtResult};
pub use model::{
    AddedSource, Attachment, ConversionRequest, Container, CropAnchor, EncodingParams,
    ResizeRequest, ResolutionPreset, StreamType, StreamTypeOptions,
};
pub use planner::{plan, PlannedJob};
pub use probe::{FfprobeProber, MediaProber, ProbedInputs, ProbedSource, StreamGeometry};
