//! Per-stream-type mapping directives
//!
//! For each stream type the planner emits `-map` selections followed by
//! per-output-stream codec, disposition and language arguments. Output
//! sub-indices number across the primary and added groups in emission order.

use crate::codecs::CodecRegistry;
use crate::error::{CnvtError, CnvtResult};
use crate::model::{EncodingParams, StreamType, StreamTypeOptions};
use crate::probe::ProbedInputs;

/// Disposition handling for one mapped group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Leave stream dispositions untouched
    Keep,
    /// First stream of the group becomes default, the rest not
    FirstDefault,
    /// Every stream of the group is explicitly not default
    AllNone,
}

/// One `-map` group: a run of streams taken from a single input
struct MapGroup<'a> {
    input_index: usize,
    single_stream: Option<usize>,
    stream_count: usize,
    codec: Option<&'a str>,
    bitrate: Option<&'a str>,
    language: Option<&'a str>,
    disposition: Disposition,
}

/// Emit all mapping directives for one stream type.
pub fn map_stream_type(
    args: &mut Vec<String>,
    stream_type: StreamType,
    opts: &StreamTypeOptions,
    probes: &ProbedInputs,
    added_input_index: Option<usize>,
    registry: &CodecRegistry,
    params: &EncodingParams,
    primary_path: &str,
) -> CnvtResult<()> {
    let mark_default = opts
        .added
        .as_ref()
        .map(|a| a.mark_default)
        .unwrap_or(false);

    let primary = primary_group(stream_type, opts, probes, mark_default, primary_path)?;
    let added = added_group(stream_type, opts, probes, added_input_index, mark_default)?;

    let place_added_first = opts
        .added
        .as_ref()
        .map(|a| a.place_first)
        .unwrap_or(false);

    let groups: Vec<MapGroup> = if place_added_first {
        added.into_iter().chain(primary).collect()
    } else {
        primary.into_iter().chain(added).collect()
    };

    let mut next_output_index = 0;
    for group in groups {
        emit_group(args, stream_type, &group, next_output_index, registry, params)?;
        next_output_index += group.stream_count;
    }
    Ok(())
}

/// The primary input's contribution for one type, if any
fn primary_group<'a>(
    stream_type: StreamType,
    opts: &'a StreamTypeOptions,
    probes: &ProbedInputs,
    mark_default: bool,
    primary_path: &str,
) -> CnvtResult<Option<MapGroup<'a>>> {
    if opts.no_copy {
        return Ok(None);
    }

    let available = probes.primary.count(stream_type);
    let stream_count = match opts.single_stream {
        Some(index) => {
            if index >= available {
                return Err(CnvtError::SelectorOutOfRange {
                    stream_type: stream_type.to_string(),
                    index,
                    available,
                    path: primary_path.to_string(),
                });
            }
            1
        }
        None => available,
    };
    if stream_count == 0 {
        return Ok(None);
    }

    Ok(Some(MapGroup {
        input_index: 0,
        single_stream: opts.single_stream,
        stream_count,
        codec: opts.codec.as_deref(),
        bitrate: opts.bitrate.as_deref(),
        language: opts.language.as_deref(),
        // Once some added stream becomes default, primary streams of the
        // type are explicitly demoted
        disposition: if mark_default {
            Disposition::AllNone
        } else {
            Disposition::Keep
        },
    }))
}

/// The added file's contribution for one type, if any
fn added_group<'a>(
    stream_type: StreamType,
    opts: &'a StreamTypeOptions,
    probes: &ProbedInputs,
    added_input_index: Option<usize>,
    mark_default: bool,
) -> CnvtResult<Option<MapGroup<'a>>> {
    let Some(added) = opts.added.as_ref() else {
        return Ok(None);
    };
    let input_index = added_input_index.ok_or_else(|| {
        CnvtError::config(format!(
            "added {} file was not assigned an input index",
            stream_type
        ))
    })?;

    let available = probes
        .added
        .get(&stream_type)
        .map(|source| source.count(stream_type))
        .unwrap_or(0);
    let stream_count = match added.single_stream {
        Some(index) => {
            if index >= available {
                return Err(CnvtError::SelectorOutOfRange {
                    stream_type: stream_type.to_string(),
                    index,
                    available,
                    path: added.path.clone(),
                });
            }
            1
        }
        None => available,
    };
    if stream_count == 0 {
        return Ok(None);
    }

    Ok(Some(MapGroup {
        input_index,
        single_stream: added.single_stream,
        stream_count,
        codec: added.codec.as_deref(),
        bitrate: opts.bitrate.as_deref(),
        language: added.language.as_deref(),
        disposition: if mark_default {
            Disposition::FirstDefault
        } else {
            Disposition::Keep
        },
    }))
}

/// Emit `-map` plus per-stream codec, disposition and language arguments
fn emit_group(
    args: &mut Vec<String>,
    stream_type: StreamType,
    group: &MapGroup,
    first_output_index: usize,
    registry: &CodecRegistry,
    params: &EncodingParams,
) -> CnvtResult<()> {
    let letter = stream_type.letter();

    args.push("-map".to_string());
    match group.single_stream {
        Some(index) => args.push(format!("{}:{}:{}", group.input_index, letter, index)),
        None => args.push(format!("{}:{}?", group.input_index, letter)),
    }

    // Attachment and data streams carry no codec or disposition arguments
    if matches!(stream_type, StreamType::Attachment | StreamType::Data) {
        return Ok(());
    }

    let encoder_args = registry.encoder_args(stream_type, group.codec, params, group.bitrate)?;

    for offset in 0..group.stream_count {
        let output_index = first_output_index + offset;
        args.push(format!("-c:{}:{}", letter, output_index));
        args.extend(encoder_args.iter().cloned());

        match group.disposition {
            Disposition::Keep => {}
            Disposition::AllNone => {
                args.push(format!("-disposition:{}:{}", letter, output_index));
                args.push("none".to_string());
            }
            Disposition::FirstDefault => {
                args.push(format!("-disposition:{}:{}", letter, output_index));
                args.push(if offset == 0 { "default" } else { "none" }.to_string());
            }
        }

        if let Some(language) = group.language {
            args.push(format!("-metadata:s:{}:{}", letter, output_index));
            args.push(format!("language={}", language));
        }
    }
    Ok(())
}
