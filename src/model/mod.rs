//! Domain model for a single conversion request
//!
//! These structures are built once from the command line, validated at the
//! boundary, handed to the argument planner, and discarded after the ffmpeg
//! invocation completes. The planner never sees raw flag strings.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CnvtError, CnvtResult};

/// Stream types addressable on the command line, in FFmpeg output order.
///
/// The variant order doubles as the emission order for mapping directives:
/// video, audio, subtitle, attachment, data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
    Attachment,
    Data,
}

impl StreamType {
    pub const ALL: [StreamType; 5] = [
        StreamType::Video,
        StreamType::Audio,
        StreamType::Subtitle,
        StreamType::Attachment,
        StreamType::Data,
    ];

    /// Single letter used in FFmpeg stream specifiers and on the CLI
    pub fn letter(self) -> char {
        match self {
            StreamType::Video => 'v',
            StreamType::Audio => 'a',
            StreamType::Subtitle => 's',
            StreamType::Attachment => 't',
            StreamType::Data => 'd',
        }
    }

    /// Long name as reported by ffprobe's `codec_type`
    pub fn long_name(self) -> &'static str {
        match self {
            StreamType::Video => "video",
            StreamType::Audio => "audio",
            StreamType::Subtitle => "subtitle",
            StreamType::Attachment => "attachment",
            StreamType::Data => "data",
        }
    }

    /// Parse the short CLI form (`v a s t d`)
    pub fn parse(value: &str) -> CnvtResult<Self> {
        match value {
            "v" => Ok(StreamType::Video),
            "a" => Ok(StreamType::Audio),
            "s" => Ok(StreamType::Subtitle),
            "t" => Ok(StreamType::Attachment),
            "d" => Ok(StreamType::Data),
            _ => Err(CnvtError::config(format!(
                "invalid stream type '{}', expected one of v, a, s, t, d",
                value
            ))),
        }
    }

    /// Parse from ffprobe's `codec_type` value
    pub fn from_codec_type(value: &str) -> Option<Self> {
        match value {
            "video" => Some(StreamType::Video),
            "audio" => Some(StreamType::Audio),
            "subtitle" => Some(StreamType::Subtitle),
            "attachment" => Some(StreamType::Attachment),
            "data" => Some(StreamType::Data),
            _ => None,
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

/// Targets accepted by `--nocopy`: real stream types plus the chapter and
/// metadata pseudo-targets (`c` and `m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoCopyTarget {
    Stream(StreamType),
    Chapters,
    Metadata,
}

impl NoCopyTarget {
    pub fn parse(value: &str) -> CnvtResult<Self> {
        match value {
            "c" => Ok(NoCopyTarget::Chapters),
            "m" => Ok(NoCopyTarget::Metadata),
            other => StreamType::parse(other).map(NoCopyTarget::Stream).map_err(|_| {
                CnvtError::config(format!(
                    "invalid nocopy target '{}', expected one of v, a, s, t, d, c, m",
                    other
                ))
            }),
        }
    }
}

/// A secondary media file contributing streams of one type to the output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddedSource {
    /// Path to the additional input file
    pub path: String,
    /// Restrict to one stream of the type instead of all (`--addstream`)
    pub single_stream: Option<usize>,
    /// Re-encode added streams with this codec (`--addcodec`); None = copy
    pub codec: Option<String>,
    /// Language metadata for the added streams (`--addlang`)
    pub language: Option<String>,
    /// Emit added streams before the primary streams of the type (`--addfirst`)
    pub place_first: bool,
    /// Mark the first added stream of the type default, all others of the
    /// type not default (`--adddefault`)
    pub mark_default: bool,
    /// Loop the added input (`--addlooped`)
    pub loop_input: bool,
}

/// Per-stream-type options for the primary input
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamTypeOptions {
    /// Exclude this type from the primary input entirely (`--nocopy`)
    pub no_copy: bool,
    /// Copy or process a single stream of the type instead of all (`--singlestream`)
    pub single_stream: Option<usize>,
    /// Re-encode primary streams of the type with this codec; None = copy
    pub codec: Option<String>,
    /// Bitrate for streams of the type, e.g. `1M` or `320K`
    pub bitrate: Option<String>,
    /// Language metadata for primary streams of the type (`--lang`)
    pub language: Option<String>,
    /// Additional source contributing streams of the type
    pub added: Option<AddedSource>,
}

/// Encoding parameters shared by whichever codecs are selected
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodingParams {
    /// Encoder preset name (video codecs that support it)
    pub preset: Option<String>,
    /// Encoder tune name
    pub tune: Option<String>,
    /// Constant rate factor (video codecs that support it)
    pub crf: Option<u8>,
    /// Output channel count for audio (`--mono` / `--stereo`)
    pub channels: Option<u8>,
}

/// Requested output dimensions before aspect-ratio fitting.
/// A missing dimension is derived from the input aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Fixed width x height resolution presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolutionPreset {
    /// 1280x720
    Hd,
    /// 1920x1080
    Fhd,
    /// 2560x1440
    Qhd,
    /// 3840x2160
    Uhd,
}

impl ResolutionPreset {
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            ResolutionPreset::Hd => (1280, 720),
            ResolutionPreset::Fhd => (1920, 1080),
            ResolutionPreset::Qhd => (2560, 1440),
            ResolutionPreset::Uhd => (3840, 2160),
        }
    }
}

/// Where to anchor the crop window within the decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CropAnchor {
    Center,
    Left,
    Right,
    Top,
    Bottom,
    #[value(name = "topleft")]
    TopLeft,
    #[value(name = "topright")]
    TopRight,
    #[value(name = "bottomleft")]
    BottomLeft,
    #[value(name = "bottomright")]
    BottomRight,
}

impl CropAnchor {
    /// Crop window offsets for an `out_w` x `out_h` window inside an
    /// `in_w` x `in_h` frame. Extents must already be clamped to the frame.
    pub fn offsets(self, in_w: u32, in_h: u32, out_w: u32, out_h: u32) -> (u32, u32) {
        let center_x = (in_w - out_w) / 2;
        let center_y = (in_h - out_h) / 2;
        let right_x = in_w - out_w;
        let bottom_y = in_h - out_h;
        match self {
            CropAnchor::Center => (center_x, center_y),
            CropAnchor::Left => (0, center_y),
            CropAnchor::Right => (right_x, center_y),
            CropAnchor::Top => (center_x, 0),
            CropAnchor::Bottom => (center_x, bottom_y),
            CropAnchor::TopLeft => (0, 0),
            CropAnchor::TopRight => (right_x, 0),
            CropAnchor::BottomLeft => (0, bottom_y),
            CropAnchor::BottomRight => (right_x, bottom_y),
        }
    }
}

/// Output container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Container {
    Mov,
    Mkv,
    Mp4,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Container::Mov => "mov",
            Container::Mkv => "mkv",
            Container::Mp4 => "mp4",
        }
    }
}

/// File attached as an attachment stream (`--addattach`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: String,
    pub mime_type: String,
}

/// A fully validated conversion request, built once per invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    /// Input file, wildcard pattern, or printf-style sequence template
    pub input: String,
    /// Output file or existing directory
    pub output: String,
    /// Treat the input as a printf-style numbered image sequence
    pub sequence: bool,
    /// Frame rate for sequence input, e.g. `30000/1001`
    pub framerate: String,
    /// Output container, input extension reused when absent
    pub container: Option<Container>,
    /// Per-stream-type options, iterated in output order
    pub types: BTreeMap<StreamType, StreamTypeOptions>,
    /// Shared encoder parameters
    pub params: EncodingParams,
    /// Requested output resolution
    pub resize: Option<ResizeRequest>,
    /// Crop instead of scaling
    pub crop: Option<CropAnchor>,
    /// Round output dimensions up to a multiple of this
    pub padding: u32,
    /// Stop encoding when the shortest stream ends
    pub shortest: bool,
    /// Explicit output duration in seconds; takes precedence over `shortest`
    pub duration: Option<f64>,
    /// Strip chapters from the output
    pub strip_chapters: bool,
    /// Strip global metadata from the output
    pub strip_metadata: bool,
    /// Do not carry unknown data streams over
    pub strip_unknown: bool,
    /// File attached as an attachment stream
    pub attachment: Option<Attachment>,
    /// Overwrite existing output files
    pub overwrite: bool,
    /// Print the ffmpeg command line instead of running it
    pub dry_run: bool,
    /// Abort the batch on the first ffmpeg failure
    pub stop_on_error: bool,
    /// ffmpeg binary to invoke
    pub ffmpeg_bin: String,
    /// ffprobe binary to invoke
    pub ffprobe_bin: String,
}

impl ConversionRequest {
    /// Options for a stream type, defaulting to copy-everything
    pub fn type_options(&self, stream_type: StreamType) -> StreamTypeOptions {
        self.types.get(&stream_type).cloned().unwrap_or_default()
    }

    /// All added sources in stream-type order, with their types
    pub fn added_sources(&self) -> Vec<(StreamType, &AddedSource)> {
        StreamType::ALL
            .iter()
            .filter_map(|ty| {
                self.types
                    .get(ty)
                    .and_then(|opts| opts.added.as_ref())
                    .map(|added| (*ty, added))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_type_letters_round_trip() {
        for ty in StreamType::ALL {
            assert_eq!(StreamType::parse(&ty.letter().to_string()).unwrap(), ty);
        }
        assert!(StreamType::parse("x").is_err());
    }

    #[test]
    fn nocopy_accepts_pseudo_targets() {
        assert_eq!(NoCopyTarget::parse("c").unwrap(), NoCopyTarget::Chapters);
        assert_eq!(NoCopyTarget::parse("m").unwrap(), NoCopyTarget::Metadata);
        assert_eq!(
            NoCopyTarget::parse("a").unwrap(),
            NoCopyTarget::Stream(StreamType::Audio)
        );
        assert!(NoCopyTarget::parse("z").is_err());
    }

    #[test]
    fn crop_anchor_offsets() {
        // 100x100 window inside a 300x200 frame
        assert_eq!(CropAnchor::Center.offsets(300, 200, 100, 100), (100, 50));
        assert_eq!(CropAnchor::TopLeft.offsets(300, 200, 100, 100), (0, 0));
        assert_eq!(CropAnchor::BottomRight.offsets(300, 200, 100, 100), (200, 100));
        assert_eq!(CropAnchor::Left.offsets(300, 200, 100, 100), (0, 50));
        assert_eq!(CropAnchor::Bottom.offsets(300, 200, 100, 100), (100, 100));
    }

    #[test]
    fn preset_dimensions() {
        assert_eq!(ResolutionPreset::Hd.dimensions(), (1280, 720));
        assert_eq!(ResolutionPreset::Uhd.dimensions(), (3840, 2160));
    }
}
