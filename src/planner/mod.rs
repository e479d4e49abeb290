//! The argument planner
//!
//! A pure, single-pass translation of a validated [`ConversionRequest`] and
//! the probed stream layout into the ordered ffmpeg argument list. No side
//! effects; process invocation lives in [`crate::exec`].

use std::path::PathBuf;
use tracing::debug;

use crate::codecs::CodecRegistry;
use crate::error::{CnvtError, CnvtResult};
use crate::model::{ConversionRequest, StreamType};
use crate::probe::ProbedInputs;
use crate::utils::{path::resolve_output, time::format_duration};

pub mod filters;
pub mod mapping;

/// A planned ffmpeg invocation for one input file
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedJob {
    /// Arguments to pass to ffmpeg, output file last
    pub args: Vec<String>,
    /// Resolved output file
    pub output: PathBuf,
}

/// Build the full ffmpeg argument list for one input file.
///
/// Argument order: overwrite flag, sequence input options, input
/// declarations, unknown-stream handling, per-type mapping directives,
/// filters, length limits, chapter/metadata stripping, attachments, and
/// finally the output path.
pub fn plan(
    request: &ConversionRequest,
    input_file: &str,
    probes: &ProbedInputs,
    registry: &CodecRegistry,
) -> CnvtResult<PlannedJob> {
    let mut args: Vec<String> = Vec::new();

    if request.overwrite {
        args.push("-y".to_string());
    }

    if request.sequence {
        args.push("-r".to_string());
        args.push(request.framerate.clone());
        args.push("-f".to_string());
        args.push("image2".to_string());
    }

    // Primary input is always ffmpeg input 0
    args.push("-i".to_string());
    args.push(input_file.to_string());

    // Added files take input indices 1.. in stream-type order
    let added_sources = request.added_sources();
    let mut added_indices: Vec<(StreamType, usize)> = Vec::new();
    for (offset, (stream_type, added)) in added_sources.iter().enumerate() {
        if added.loop_input {
            args.push("-stream_loop".to_string());
            args.push("-1".to_string());
        }
        args.push("-i".to_string());
        args.push(added.path.clone());
        added_indices.push((*stream_type, offset + 1));
    }

    if !request.strip_unknown {
        args.push("-copy_unknown".to_string());
    }

    // Mapping directives in output order: video, audio, subtitle,
    // attachment, data
    for stream_type in StreamType::ALL {
        let opts = request.type_options(stream_type);
        let added_input_index = added_indices
            .iter()
            .find(|(ty, _)| *ty == stream_type)
            .map(|(_, index)| *index);
        mapping::map_stream_type(
            &mut args,
            stream_type,
            &opts,
            probes,
            added_input_index,
            registry,
            &request.params,
            input_file,
        )?;
    }

    // Scale or crop filter for the video output
    if let Some(resize) = request.resize {
        if !request.type_options(StreamType::Video).no_copy {
            let geometry = probes.geometry.as_ref().ok_or_else(|| {
                CnvtError::config("resize requested but input geometry was not probed")
            })?;
            if let Some(filter_plan) =
                filters::video_filter(resize, request.crop, request.padding, geometry)?
            {
                args.push("-vf".to_string());
                args.push(filter_plan.filter);
            }
        }
    }

    // Explicit duration takes precedence over shortest-stream truncation
    if let Some(duration) = request.duration {
        args.push("-t".to_string());
        args.push(format_duration(duration));
    } else if request.shortest {
        args.push("-shortest".to_string());
    }

    if request.strip_chapters {
        args.push("-map_chapters".to_string());
        args.push("-1".to_string());
    }
    if request.strip_metadata {
        args.push("-map_metadata".to_string());
        args.push("-1".to_string());
    }

    if let Some(attachment) = &request.attachment {
        args.push("-attach".to_string());
        args.push(attachment.path.clone());
        args.push("-metadata:s:t".to_string());
        args.push(format!("mimetype={}", attachment.mime_type));
    }

    let output = resolve_output(&request.output, input_file, request.container)?;
    args.push(output.to_string_lossy().into_owned());

    debug!(?output, "planned {} argument(s)", args.len());
    Ok(PlannedJob { args, output })
}
