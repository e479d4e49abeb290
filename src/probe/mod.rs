//! Stream layout discovery via ffprobe
//!
//! The planner itself is pure; everything it needs to know about the inputs
//! is gathered here first and handed over as a [`ProbedInputs`] snapshot.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::process::Command;
use tracing::debug;

use crate::error::{CnvtError, CnvtResult};
use crate::model::StreamType;

/// Probed dimensions of the first video stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
    /// Display aspect ratio when the container declares one
    pub display_aspect: Option<f64>,
}

impl StreamGeometry {
    /// Display aspect ratio, falling back to the storage ratio
    pub fn aspect_ratio(&self) -> f64 {
        self.display_aspect
            .unwrap_or(self.width as f64 / self.height as f64)
    }
}

/// Stream counts for one input file, keyed by type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbedSource {
    pub counts: BTreeMap<StreamType, usize>,
}

impl ProbedSource {
    pub fn count(&self, stream_type: StreamType) -> usize {
        self.counts.get(&stream_type).copied().unwrap_or(0)
    }
}

/// Everything the planner needs to know about the inputs of one job
#[derive(Debug, Clone, Default)]
pub struct ProbedInputs {
    /// Stream counts of the primary input
    pub primary: ProbedSource,
    /// Stream counts of each added file, keyed by the stream type it serves
    pub added: BTreeMap<StreamType, ProbedSource>,
    /// Geometry of the primary video stream, probed only when resizing
    pub geometry: Option<StreamGeometry>,
}

/// External stream-inspection collaborator
pub trait MediaProber {
    /// Ordered stream counts per type for an input file
    fn stream_counts(&self, path: &str) -> CnvtResult<ProbedSource>;

    /// Dimensions and aspect ratio of the first video stream
    fn video_geometry(&self, path: &str) -> CnvtResult<StreamGeometry>;
}

/// ffprobe-based prober
pub struct FfprobeProber {
    binary: String,
}

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    display_aspect_ratio: Option<String>,
}

impl FfprobeProber {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn probe(&self, path: &str, extra: &[&str]) -> CnvtResult<ProbeDocument> {
        let mut args = vec!["-v", "error"];
        args.extend_from_slice(extra);
        args.push("-of");
        args.push("json");
        args.push(path);

        debug!(binary = %self.binary, ?args, "running ffprobe");
        let output = Command::new(&self.binary).args(&args).output()?;
        if !output.status.success() {
            return Err(CnvtError::Probe {
                path: path.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| CnvtError::Probe {
            path: path.to_string(),
            message: format!("unparseable ffprobe output: {}", e),
        })
    }
}

impl MediaProber for FfprobeProber {
    fn stream_counts(&self, path: &str) -> CnvtResult<ProbedSource> {
        let doc = self.probe(path, &["-show_entries", "stream=codec_type"])?;

        let mut counts: BTreeMap<StreamType, usize> = BTreeMap::new();
        for stream in &doc.streams {
            if let Some(ty) = stream
                .codec_type
                .as_deref()
                .and_then(StreamType::from_codec_type)
            {
                *counts.entry(ty).or_insert(0) += 1;
            }
        }
        Ok(ProbedSource { counts })
    }

    fn video_geometry(&self, path: &str) -> CnvtResult<StreamGeometry> {
        let doc = self.probe(
            path,
            &[
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,display_aspect_ratio",
            ],
        )?;

        let stream = doc.streams.first().ok_or_else(|| CnvtError::Probe {
            path: path.to_string(),
            message: "no video stream to probe dimensions from".to_string(),
        })?;

        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(CnvtError::Probe {
                    path: path.to_string(),
                    message: "missing or zero video dimensions".to_string(),
                })
            }
        };

        let display_aspect = stream
            .display_aspect_ratio
            .as_deref()
            .and_then(parse_aspect_ratio);

        Ok(StreamGeometry {
            width,
            height,
            display_aspect,
        })
    }
}

/// Parse an ffprobe aspect ratio string such as `16:9`
fn parse_aspect_ratio(value: &str) -> Option<f64> {
    let (num, den) = value.split_once(':')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}
