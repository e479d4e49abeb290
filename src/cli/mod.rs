//! Command-line surface
//!
//! Raw flags are parsed here by clap and converted into a validated
//! [`crate::model::ConversionRequest`] in [`options`]; nothing past that
//! boundary looks at flag strings again.

use clap::{ArgAction, Parser};

use crate::model::{Container, CropAnchor};

pub mod options;

const AFTER_HELP: &str = "\
Stream types: v=video a=audio s=subtitle t=attachment d=data (c=chapters m=metadata for --nocopy)

Stream indexes are zero-based and relative to the stream type. Unless told
otherwise, all streams and chapters are copied without processing. Scaled
video keeps its aspect ratio and is resized to fit within the requested
dimensions, so only a width or a height needs to be given.

Examples:
  cnvt input.mp4 output.mkv
  cnvt 'in/*.mkv' out/ --container mp4 --codec v h264 --codec a aac
  cnvt input.mkv output.mkv --codec v h265 --crf 17
  cnvt input.mkv track.mp3 --codec a mp3 --singlestream a 0 --nocopy v --nocopy s
  cnvt video.mp4 out.mp4 --nocopy a --shortest --addfile a music.mp3 --addcodec a aac --addlooped a
  cnvt 'frames/img%04d.jpg' out.mp4 --sequence --uhd --codec v h265";

/// Convert and mux media files with FFmpeg
#[derive(Parser, Debug)]
#[command(name = "cnvt", version, about, after_help = AFTER_HELP)]
pub struct Cli {
    /// Input file, wildcard pattern, or printf-style sequence template
    #[arg(value_name = "INPUT", required_unless_present = "codecs")]
    pub input: Option<String>,

    /// Output file or existing directory
    #[arg(value_name = "OUTPUT", required_unless_present = "codecs")]
    pub output: Option<String>,

    /// Output container format
    #[arg(long, value_enum)]
    pub container: Option<Container>,

    /// Re-encode primary streams of a type: TYPE CODEC (repeatable)
    #[arg(long, num_args = 2, value_names = ["TYPE", "CODEC"], action = ArgAction::Append)]
    pub codec: Vec<String>,

    /// Bitrate for streams of a type, e.g. 1M or 320K: TYPE RATE (repeatable)
    #[arg(long, num_args = 2, value_names = ["TYPE", "RATE"], action = ArgAction::Append)]
    pub bitrate: Vec<String>,

    /// Language metadata for primary streams of a type: TYPE LANG (repeatable)
    #[arg(long, num_args = 2, value_names = ["TYPE", "LANG"], action = ArgAction::Append)]
    pub lang: Vec<String>,

    /// Do not copy or process streams of this type (repeatable)
    #[arg(long, value_name = "TYPE", action = ArgAction::Append)]
    pub nocopy: Vec<String>,

    /// Process a single primary stream instead of all of a type: TYPE INDEX
    #[arg(long, num_args = 2, value_names = ["TYPE", "INDEX"], action = ArgAction::Append)]
    pub singlestream: Vec<String>,

    /// Add streams of a type from a second input file: TYPE PATH (repeatable)
    #[arg(long, num_args = 2, value_names = ["TYPE", "PATH"], action = ArgAction::Append)]
    pub addfile: Vec<String>,

    /// Codec for added streams of a type: TYPE CODEC (repeatable)
    #[arg(long, num_args = 2, value_names = ["TYPE", "CODEC"], action = ArgAction::Append)]
    pub addcodec: Vec<String>,

    /// Use a single stream of the added file: TYPE INDEX (repeatable)
    #[arg(long, num_args = 2, value_names = ["TYPE", "INDEX"], action = ArgAction::Append)]
    pub addstream: Vec<String>,

    /// Order added streams of this type before the primary ones (repeatable)
    #[arg(long, value_name = "TYPE", action = ArgAction::Append)]
    pub addfirst: Vec<String>,

    /// Mark the first added stream of this type as default (repeatable)
    #[arg(long, value_name = "TYPE", action = ArgAction::Append)]
    pub adddefault: Vec<String>,

    /// Language metadata for added streams of a type: TYPE LANG (repeatable)
    #[arg(long, num_args = 2, value_names = ["TYPE", "LANG"], action = ArgAction::Append)]
    pub addlang: Vec<String>,

    /// Loop added input streams of this type (repeatable)
    #[arg(long, value_name = "TYPE", action = ArgAction::Append)]
    pub addlooped: Vec<String>,

    /// Output mono audio
    #[arg(long, conflicts_with = "stereo")]
    pub mono: bool,

    /// Output stereo audio
    #[arg(long)]
    pub stereo: bool,

    /// Preset for the video encoder
    #[arg(long, value_name = "PRESET")]
    pub preset: Option<String>,

    /// Tune option for the video encoder
    #[arg(long, value_name = "TUNE")]
    pub tune: Option<String>,

    /// Constant rate factor for the video encoder
    #[arg(long, value_name = "CRF")]
    pub crf: Option<u8>,

    /// Output 1280x720 video
    #[arg(long)]
    pub hd: bool,

    /// Output 1920x1080 video
    #[arg(long)]
    pub fhd: bool,

    /// Output 2560x1440 video
    #[arg(long)]
    pub qhd: bool,

    /// Output 3840x2160 video
    #[arg(long)]
    pub uhd: bool,

    /// Output video width
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Output video height
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Crop video to the requested resolution instead of scaling
    #[arg(long, value_enum, value_name = "ANCHOR")]
    pub crop: Option<CropAnchor>,

    /// Round output dimensions up to a multiple of this
    #[arg(long, default_value_t = 4, value_name = "N")]
    pub padding: u32,

    /// Input is a printf-style numbered image sequence
    #[arg(long)]
    pub sequence: bool,

    /// Frame rate for sequence input, may be NUM/DEN
    #[arg(long, default_value = "30000/1001", value_name = "RATE")]
    pub framerate: String,

    /// Strip unknown data streams from the output
    #[arg(long)]
    pub nounknown: bool,

    /// Attach a file as an attachment stream
    #[arg(long, value_name = "PATH")]
    pub addattach: Option<String>,

    /// Mime type for the attached file
    #[arg(long, default_value = "application/octet-stream", value_name = "MIMETYPE")]
    pub attachtype: String,

    /// Stop encoding when the shortest stream is finished
    #[arg(long)]
    pub shortest: bool,

    /// Output duration, seconds or [HH:]MM:SS[.ms]; overrides --shortest
    #[arg(long, value_name = "TIME")]
    pub duration: Option<String>,

    /// Stop the batch when ffmpeg returns an error
    #[arg(long)]
    pub stoponerror: bool,

    /// Overwrite existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Print the ffmpeg command line without executing it
    #[arg(long)]
    pub dryrun: bool,

    /// Enable verbose console output
    #[arg(long)]
    pub verbose: bool,

    /// List supported codecs, presets and tunes, then exit
    #[arg(long)]
    pub codecs: bool,

    /// ffmpeg binary to use
    #[arg(long, default_value = "ffmpeg", value_name = "PATH", env = "CNVT_FFMPEG")]
    pub ffmpeg_bin: String,

    /// ffprobe binary to use
    #[arg(long, default_value = "ffprobe", value_name = "PATH", env = "CNVT_FFPROBE")]
    pub ffprobe_bin: String,
}
