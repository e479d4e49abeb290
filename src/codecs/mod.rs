//! Codec registry and encoder argument construction
//!
//! The registry is an immutable table built once per invocation. It maps the
//! user-facing codec names to the FFmpeg encoder invocations and records which
//! encoders accept preset and CRF parameters.

use crate::error::{CnvtError, CnvtResult};
use crate::model::{EncodingParams, StreamType};

/// Preset names accepted by `--preset`
pub const PRESET_CHOICES: &[&str] = &[
    "slowest", "slow", "medium", "fast", "default", "hp", "hq", "bd", "ll", "llhq", "llhp",
    "lossless", "losslesshp", "p1", "p2", "p3", "p4", "p5", "p6", "p7",
];

/// Tune names accepted by `--tune`
pub const TUNE_CHOICES: &[&str] = &["hq", "ll", "ull", "lossless", "psnr", "ssim"];

/// One user-facing codec name and its encoder invocation
#[derive(Debug, Clone)]
struct CodecEntry {
    name: &'static str,
    encoder: &'static [&'static str],
    supports_preset: bool,
    supports_crf: bool,
}

/// Immutable table of supported codecs per stream type
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    video: Vec<CodecEntry>,
    audio: Vec<CodecEntry>,
    subtitle: Vec<CodecEntry>,
}

impl CodecRegistry {
    /// The built-in codec table
    pub fn builtin() -> Self {
        let video = vec![
            entry("h264", &["libx264"], true, true),
            entry("h265", &["libx265"], true, true),
            entry("h264nv", &["h264_nvenc"], true, false),
            entry("h265nv", &["hevc_nvenc"], true, false),
            entry("vp8", &["libvpx"], false, true),
            entry("vp9", &["libvpx-vp9"], false, true),
        ];
        let audio = vec![
            entry("aac", &["aac"], false, false),
            entry("ac3", &["ac3"], false, false),
            entry("eac3", &["eac3"], false, false),
            entry("dts", &["dca"], false, false),
            entry("flac", &["flac"], false, false),
            entry("opus", &["opus", "-strict", "-2"], false, false),
            entry("mp3", &["libmp3lame"], false, false),
            entry("wav", &["wavpack"], false, false),
        ];
        let subtitle = vec![
            entry("ssa", &["ssa"], false, false),
            entry("ass", &["ass"], false, false),
            entry("dvbsub", &["dvbsub"], false, false),
            entry("dvdsub", &["dvdsub"], false, false),
            entry("srt", &["srt"], false, false),
            entry("sub", &["subrip"], false, false),
        ];
        CodecRegistry {
            video,
            audio,
            subtitle,
        }
    }

    fn table(&self, stream_type: StreamType) -> Option<&[CodecEntry]> {
        match stream_type {
            StreamType::Video => Some(&self.video),
            StreamType::Audio => Some(&self.audio),
            StreamType::Subtitle => Some(&self.subtitle),
            StreamType::Attachment | StreamType::Data => None,
        }
    }

    /// True when `name` is a supported codec for the stream type
    pub fn is_known(&self, stream_type: StreamType, name: &str) -> bool {
        self.table(stream_type)
            .map(|t| t.iter().any(|e| e.name == name))
            .unwrap_or(false)
    }

    /// Supported codec names for a stream type
    pub fn names(&self, stream_type: StreamType) -> Vec<&'static str> {
        self.table(stream_type)
            .map(|t| t.iter().map(|e| e.name).collect())
            .unwrap_or_default()
    }

    /// Encoder arguments for one output stream: the encoder invocation
    /// followed by preset, CRF, tune, bitrate and channel parameters where
    /// the codec accepts them. `None` codec means stream copy.
    pub fn encoder_args(
        &self,
        stream_type: StreamType,
        codec: Option<&str>,
        params: &EncodingParams,
        bitrate: Option<&str>,
    ) -> CnvtResult<Vec<String>> {
        let name = match codec {
            None => return Ok(vec!["copy".to_string()]),
            Some(name) => name,
        };

        let table = self.table(stream_type).ok_or_else(|| {
            CnvtError::config(format!(
                "codecs are not supported for {} streams",
                stream_type
            ))
        })?;
        let codec_entry = table.iter().find(|e| e.name == name).ok_or_else(|| {
            CnvtError::config(format!("invalid {} codec: {}", stream_type, name))
        })?;

        let mut args: Vec<String> = codec_entry.encoder.iter().map(|s| s.to_string()).collect();

        if stream_type == StreamType::Video {
            if let Some(preset) = params.preset.as_deref() {
                if codec_entry.supports_preset {
                    args.push("-preset".to_string());
                    args.push(preset.to_string());
                }
            }
            if let Some(crf) = params.crf {
                if codec_entry.supports_crf {
                    args.push("-crf".to_string());
                    args.push(crf.to_string());
                }
            }
            if let Some(tune) = params.tune.as_deref() {
                args.push("-tune".to_string());
                args.push(tune.to_string());
            }
        }

        if stream_type == StreamType::Audio {
            if let Some(channels) = params.channels {
                args.push("-ac".to_string());
                args.push(channels.to_string());
            }
        }

        if let Some(rate) = bitrate {
            args.push(format!("-b:{}", stream_type.letter()));
            args.push(rate.to_string());
        }

        Ok(args)
    }

    /// Render the capability listing printed by `--codecs`
    pub fn capabilities(&self) -> String {
        let mut out = String::new();
        for (label, stream_type) in [
            ("Video codecs", StreamType::Video),
            ("Audio codecs", StreamType::Audio),
            ("Subtitle codecs", StreamType::Subtitle),
        ] {
            out.push_str(label);
            out.push_str(": ");
            out.push_str(&self.names(stream_type).join(" "));
            out.push('\n');
        }
        out.push_str("Presets: ");
        out.push_str(&PRESET_CHOICES.join(" "));
        out.push('\n');
        out.push_str("Tunes: ");
        out.push_str(&TUNE_CHOICES.join(" "));
        out.push('\n');
        out
    }
}

fn entry(
    name: &'static str,
    encoder: &'static [&'static str],
    supports_preset: bool,
    supports_crf: bool,
) -> CodecEntry {
    CodecEntry {
        name,
        encoder,
        supports_preset,
        supports_crf,
    }
}
