//! Boundary validation: raw flags to a typed [`ConversionRequest`]
//!
//! Per-type flags may be repeated with different stream types; the first
//! occurrence wins per type and the rest are ignored, matching the
//! repeatable-flag contract documented in the help text.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::warn;

use crate::cli::Cli;
use crate::codecs::{CodecRegistry, PRESET_CHOICES, TUNE_CHOICES};
use crate::error::{CnvtError, CnvtResult};
use crate::model::{
    AddedSource, Attachment, ConversionRequest, EncodingParams, NoCopyTarget, ResizeRequest,
    ResolutionPreset, StreamType, StreamTypeOptions,
};
use crate::utils::time::parse_duration;

/// Validate the parsed command line and build the conversion request
pub fn build_request(cli: &Cli, registry: &CodecRegistry) -> CnvtResult<ConversionRequest> {
    let input = cli
        .input
        .clone()
        .ok_or_else(|| CnvtError::config("missing input"))?;
    let output = cli
        .output
        .clone()
        .ok_or_else(|| CnvtError::config("missing output"))?;

    let codec = first_per_type(typed_pairs(&cli.codec, "--codec")?);
    let addcodec = first_per_type(typed_pairs(&cli.addcodec, "--addcodec")?);
    let bitrate = first_per_type(typed_pairs(&cli.bitrate, "--bitrate")?);
    let lang = first_per_type(typed_pairs(&cli.lang, "--lang")?);
    let addlang = first_per_type(typed_pairs(&cli.addlang, "--addlang")?);
    let addfile = first_per_type(typed_pairs(&cli.addfile, "--addfile")?);
    let singlestream = parse_indices(typed_pairs(&cli.singlestream, "--singlestream")?)?;
    let addstream = parse_indices(typed_pairs(&cli.addstream, "--addstream")?)?;
    let addfirst = type_set(&cli.addfirst, "--addfirst")?;
    let adddefault = type_set(&cli.adddefault, "--adddefault")?;
    let addlooped = type_set(&cli.addlooped, "--addlooped")?;

    let mut nocopy_types = BTreeSet::new();
    let mut strip_chapters = false;
    let mut strip_metadata = false;
    for value in &cli.nocopy {
        match NoCopyTarget::parse(value)? {
            NoCopyTarget::Stream(ty) => {
                nocopy_types.insert(ty);
            }
            NoCopyTarget::Chapters => strip_chapters = true,
            NoCopyTarget::Metadata => strip_metadata = true,
        }
    }

    // Codec names must exist in the registry for their stream type
    for (ty, name) in codec.iter().chain(addcodec.iter()) {
        registry.encoder_args(*ty, Some(name), &EncodingParams::default(), None)?;
    }

    // Per-type cross checks
    for ty in StreamType::ALL {
        if nocopy_types.contains(&ty) && codec.contains_key(&ty) {
            return Err(CnvtError::config(format!(
                "mutually exclusive options for {} streams: --nocopy and --codec",
                ty
            )));
        }
        if bitrate.contains_key(&ty) && !codec.contains_key(&ty) && !addcodec.contains_key(&ty) {
            return Err(CnvtError::config(format!(
                "--bitrate for {} streams requires --codec or --addcodec of the same type",
                ty
            )));
        }
        let dependents: [(&str, bool); 6] = [
            ("--addcodec", addcodec.contains_key(&ty)),
            ("--addstream", addstream.contains_key(&ty)),
            ("--addlang", addlang.contains_key(&ty)),
            ("--addfirst", addfirst.contains(&ty)),
            ("--adddefault", adddefault.contains(&ty)),
            ("--addlooped", addlooped.contains(&ty)),
        ];
        for (flag, used) in dependents {
            if used && !addfile.contains_key(&ty) {
                return Err(CnvtError::config(format!(
                    "{} for {} streams requires --addfile of the same type",
                    flag, ty
                )));
            }
        }
    }

    let duration = cli.duration.as_deref().map(parse_duration).transpose()?;
    if duration.is_some() && cli.shortest {
        warn!("--duration and --shortest both given; --duration takes precedence");
    }

    if !addlooped.is_empty() && duration.is_none() && !cli.shortest {
        return Err(CnvtError::config(
            "--addlooped requires --shortest or --duration",
        ));
    }

    let resize = resolve_resize(cli)?;
    let has_video_codec =
        codec.contains_key(&StreamType::Video) || addcodec.contains_key(&StreamType::Video);
    if resize.is_some() && !has_video_codec {
        return Err(CnvtError::config(
            "resizing requires a video codec (--codec v or --addcodec v)",
        ));
    }
    if resize.is_some() && nocopy_types.contains(&StreamType::Video) {
        return Err(CnvtError::config(
            "resize options conflict with --nocopy v",
        ));
    }
    if cli.crop.is_some() && resize.is_none() {
        return Err(CnvtError::config(
            "--crop requires a resolution (--hd/--fhd/--qhd/--uhd or --width/--height)",
        ));
    }

    if let Some(preset) = cli.preset.as_deref() {
        if !PRESET_CHOICES.contains(&preset) {
            return Err(CnvtError::config(format!("invalid preset: {}", preset)));
        }
    }
    if let Some(tune) = cli.tune.as_deref() {
        if !TUNE_CHOICES.contains(&tune) {
            return Err(CnvtError::config(format!("invalid tune: {}", tune)));
        }
    }
    if (cli.preset.is_some() || cli.tune.is_some() || cli.crf.is_some()) && !has_video_codec {
        return Err(CnvtError::config(
            "--preset, --tune and --crf require a video codec",
        ));
    }

    let has_audio_codec =
        codec.contains_key(&StreamType::Audio) || addcodec.contains_key(&StreamType::Audio);
    if (cli.mono || cli.stereo) && !has_audio_codec {
        return Err(CnvtError::config(
            "--mono and --stereo require an audio codec",
        ));
    }

    let attachment = match cli.addattach.as_deref() {
        Some(path) => {
            if !Path::new(path).is_file() {
                return Err(CnvtError::config(format!(
                    "attachment file not found: {}",
                    path
                )));
            }
            Some(Attachment {
                path: path.to_string(),
                mime_type: cli.attachtype.clone(),
            })
        }
        None => None,
    };

    // Assemble the per-type option table
    let mut types: BTreeMap<StreamType, StreamTypeOptions> = BTreeMap::new();
    for ty in StreamType::ALL {
        let added = addfile.get(&ty).map(|path| AddedSource {
            path: path.clone(),
            single_stream: addstream.get(&ty).copied(),
            codec: addcodec.get(&ty).cloned(),
            language: addlang.get(&ty).cloned(),
            place_first: addfirst.contains(&ty),
            mark_default: adddefault.contains(&ty),
            loop_input: addlooped.contains(&ty),
        });
        let opts = StreamTypeOptions {
            no_copy: nocopy_types.contains(&ty),
            single_stream: singlestream.get(&ty).copied(),
            codec: codec.get(&ty).cloned(),
            bitrate: bitrate.get(&ty).cloned(),
            language: lang.get(&ty).cloned(),
            added,
        };
        if opts != StreamTypeOptions::default() {
            types.insert(ty, opts);
        }
    }

    let channels = if cli.mono {
        Some(1)
    } else if cli.stereo {
        Some(2)
    } else {
        None
    };

    Ok(ConversionRequest {
        input,
        output,
        sequence: cli.sequence,
        framerate: cli.framerate.clone(),
        container: cli.container,
        types,
        params: EncodingParams {
            preset: cli.preset.clone(),
            tune: cli.tune.clone(),
            crf: cli.crf,
            channels,
        },
        resize,
        crop: cli.crop,
        padding: cli.padding,
        shortest: cli.shortest,
        duration,
        strip_chapters,
        strip_metadata,
        strip_unknown: cli.nounknown,
        attachment,
        overwrite: cli.overwrite,
        dry_run: cli.dryrun,
        stop_on_error: cli.stoponerror,
        ffmpeg_bin: cli.ffmpeg_bin.clone(),
        ffprobe_bin: cli.ffprobe_bin.clone(),
    })
}

/// Resolution presets and explicit dimensions are mutually exclusive
fn resolve_resize(cli: &Cli) -> CnvtResult<Option<ResizeRequest>> {
    let presets: Vec<ResolutionPreset> = [
        (cli.hd, ResolutionPreset::Hd),
        (cli.fhd, ResolutionPreset::Fhd),
        (cli.qhd, ResolutionPreset::Qhd),
        (cli.uhd, ResolutionPreset::Uhd),
    ]
    .into_iter()
    .filter_map(|(set, preset)| set.then_some(preset))
    .collect();

    if presets.len() > 1 {
        return Err(CnvtError::config(
            "conflicting resize options: more than one resolution preset",
        ));
    }
    if let Some(preset) = presets.first() {
        if cli.width.is_some() || cli.height.is_some() {
            return Err(CnvtError::config(
                "conflicting resize options: resolution preset with explicit --width/--height",
            ));
        }
        let (width, height) = preset.dimensions();
        return Ok(Some(ResizeRequest {
            width: Some(width),
            height: Some(height),
        }));
    }

    if cli.width.is_some() || cli.height.is_some() {
        return Ok(Some(ResizeRequest {
            width: cli.width,
            height: cli.height,
        }));
    }
    Ok(None)
}

/// Split an appended TYPE VALUE flag into typed pairs
fn typed_pairs(values: &[String], flag: &str) -> CnvtResult<Vec<(StreamType, String)>> {
    let mut pairs = Vec::with_capacity(values.len() / 2);
    for chunk in values.chunks(2) {
        let [ty, value] = chunk else {
            return Err(CnvtError::config(format!(
                "{} expects a stream type and a value",
                flag
            )));
        };
        pairs.push((StreamType::parse(ty)?, value.clone()));
    }
    Ok(pairs)
}

/// First occurrence per stream type wins
fn first_per_type(pairs: Vec<(StreamType, String)>) -> BTreeMap<StreamType, String> {
    let mut map = BTreeMap::new();
    for (ty, value) in pairs {
        map.entry(ty).or_insert(value);
    }
    map
}

fn parse_indices(
    pairs: Vec<(StreamType, String)>,
) -> CnvtResult<BTreeMap<StreamType, usize>> {
    let mut map = BTreeMap::new();
    for (ty, value) in pairs {
        let index: usize = value.parse().map_err(|_| {
            CnvtError::config(format!(
                "invalid stream index '{}' for {} streams",
                value, ty
            ))
        })?;
        map.entry(ty).or_insert(index);
    }
    Ok(map)
}

fn type_set(values: &[String], _flag: &str) -> CnvtResult<BTreeSet<StreamType>> {
    values.iter().map(|v| StreamType::parse(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["cnvt"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    fn build(args: &[&str]) -> CnvtResult<ConversionRequest> {
        build_request(&parse(args), &CodecRegistry::builtin())
    }

    #[test]
    fn plain_copy_request() {
        let request = build(&["in.mp4", "out.mkv"]).unwrap();
        assert_eq!(request.input, "in.mp4");
        assert_eq!(request.output, "out.mkv");
        assert!(request.types.is_empty());
        assert!(request.resize.is_none());
    }

    #[test]
    fn codec_and_parameters() {
        let request = build(&[
            "in.mkv", "out.mkv", "--codec", "v", "h265", "--crf", "17", "--preset", "slow",
        ])
        .unwrap();
        let video = request.type_options(StreamType::Video);
        assert_eq!(video.codec.as_deref(), Some("h265"));
        assert_eq!(request.params.crf, Some(17));
        assert_eq!(request.params.preset.as_deref(), Some("slow"));
    }

    #[test]
    fn repeated_type_flag_first_wins() {
        let request = build(&[
            "in.mkv", "out.mkv", "--codec", "a", "aac", "--codec", "a", "mp3",
        ])
        .unwrap();
        let audio = request.type_options(StreamType::Audio);
        assert_eq!(audio.codec.as_deref(), Some("aac"));
    }

    #[test]
    fn adddefault_is_idempotent() {
        let once = build(&[
            "in.mkv", "out.mkv", "--addfile", "a", "x.aac", "--adddefault", "a",
        ])
        .unwrap();
        let twice = build(&[
            "in.mkv", "out.mkv", "--addfile", "a", "x.aac", "--adddefault", "a", "--adddefault",
            "a",
        ])
        .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn nocopy_pseudo_targets() {
        let request = build(&["in.mkv", "out.mkv", "--nocopy", "c", "--nocopy", "m"]).unwrap();
        assert!(request.strip_chapters);
        assert!(request.strip_metadata);
    }

    #[test]
    fn unknown_codec_rejected() {
        let err = build(&["in.mkv", "out.mkv", "--codec", "a", "h264"]).unwrap_err();
        assert!(err.to_string().contains("invalid audio codec"));
    }

    #[test]
    fn nocopy_conflicts_with_codec() {
        let err = build(&[
            "in.mkv", "out.mkv", "--nocopy", "v", "--codec", "v", "h264",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn bitrate_requires_codec() {
        let err = build(&["in.mkv", "out.mkv", "--bitrate", "a", "320K"]).unwrap_err();
        assert!(err.to_string().contains("--bitrate"));
    }

    #[test]
    fn add_flags_require_addfile() {
        let err = build(&["in.mkv", "out.mkv", "--adddefault", "a"]).unwrap_err();
        assert!(err.to_string().contains("--addfile"));
    }

    #[test]
    fn addlooped_requires_length_option() {
        let err = build(&[
            "in.mkv", "out.mkv", "--addfile", "a", "x.mp3", "--addlooped", "a",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--addlooped"));

        let request = build(&[
            "in.mkv", "out.mkv", "--addfile", "a", "x.mp3", "--addlooped", "a", "--shortest",
        ])
        .unwrap();
        assert!(request.type_options(StreamType::Audio).added.unwrap().loop_input);
    }

    #[test]
    fn conflicting_resize_options() {
        let err = build(&[
            "in.mkv", "out.mkv", "--codec", "v", "h264", "--hd", "--width", "640",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("conflicting resize options"));

        let err = build(&["in.mkv", "out.mkv", "--codec", "v", "h264", "--hd", "--uhd"])
            .unwrap_err();
        assert!(err.to_string().contains("conflicting resize options"));
    }

    #[test]
    fn resize_requires_video_codec() {
        let err = build(&["in.mkv", "out.mkv", "--hd"]).unwrap_err();
        assert!(err.to_string().contains("requires a video codec"));
    }

    #[test]
    fn preset_resolves_dimensions() {
        let request = build(&["in.mkv", "out.mkv", "--codec", "v", "h264", "--uhd"]).unwrap();
        assert_eq!(
            request.resize,
            Some(ResizeRequest {
                width: Some(3840),
                height: Some(2160),
            })
        );
    }

    #[test]
    fn crop_requires_resolution() {
        let err = build(&[
            "in.mkv", "out.mkv", "--codec", "v", "h264", "--crop", "center",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--crop requires"));
    }

    #[test]
    fn channel_flags_require_audio_codec() {
        let err = build(&["in.mkv", "out.mkv", "--mono"]).unwrap_err();
        assert!(err.to_string().contains("audio codec"));

        let request = build(&["in.mkv", "out.mkv", "--codec", "a", "aac", "--stereo"]).unwrap();
        assert_eq!(request.params.channels, Some(2));
    }

    #[test]
    fn duration_parsed_and_precedence_kept() {
        let request = build(&["in.mkv", "out.mkv", "--duration", "01:30", "--shortest"]).unwrap();
        assert_eq!(request.duration, Some(90.0));
        assert!(request.shortest);
    }
}
