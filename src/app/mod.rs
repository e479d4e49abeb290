//! Per-file conversion loop
//!
//! Enumerates the matched inputs, probes each one, plans the argument list
//! and either prints it (dry run) or invokes ffmpeg. Failures are counted
//! and the batch continues unless `--stoponerror` was given.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::codecs::CodecRegistry;
use crate::error::{CnvtError, CnvtResult};
use crate::exec::{render_command, FfmpegRunner};
use crate::inputs::{enumerate_inputs, sequence_probe_name};
use crate::model::{ConversionRequest, StreamType};
use crate::planner::plan;
use crate::probe::{MediaProber, ProbedInputs};

/// Run the whole request. Returns the number of failed jobs.
pub fn run(
    request: &ConversionRequest,
    prober: &dyn MediaProber,
    registry: &CodecRegistry,
) -> CnvtResult<usize> {
    let input_files = enumerate_inputs(&request.input, request.sequence)?;

    if input_files.len() > 1 && !Path::new(&request.output).is_dir() {
        return Err(CnvtError::OutputPath {
            message: format!(
                "{} input files matched but output '{}' is not a directory",
                input_files.len(),
                request.output
            ),
        });
    }

    let runner = FfmpegRunner::new(request.ffmpeg_bin.as_str());
    let total = input_files.len();
    let mut failures = 0;

    for (job, input_file) in input_files.iter().enumerate() {
        let started = Instant::now();
        match convert_one(request, input_file, prober, registry, &runner) {
            Ok(()) => {
                info!(
                    job = job + 1,
                    total,
                    elapsed = ?started.elapsed(),
                    "finished: {}",
                    input_file
                );
            }
            Err(e) if request.stop_on_error => return Err(e),
            Err(e) => {
                error!("job {}/{} failed: {}", job + 1, total, e);
                failures += 1;
            }
        }
    }

    Ok(failures)
}

/// Probe, plan and execute a single input file
fn convert_one(
    request: &ConversionRequest,
    input_file: &str,
    prober: &dyn MediaProber,
    registry: &CodecRegistry,
    runner: &FfmpegRunner,
) -> CnvtResult<()> {
    // Sequences are probed through their first concrete frame
    let probe_path = if request.sequence {
        sequence_probe_name(input_file)
    } else {
        input_file.to_string()
    };

    debug!("probing stream layout of {}", probe_path);
    let primary = prober.stream_counts(&probe_path)?;

    let mut added = BTreeMap::new();
    for (stream_type, source) in request.added_sources() {
        debug!("probing stream layout of {}", source.path);
        added.insert(stream_type, prober.stream_counts(&source.path)?);
    }

    let needs_geometry =
        request.resize.is_some() && !request.type_options(StreamType::Video).no_copy;
    let geometry = if needs_geometry {
        Some(prober.video_geometry(&probe_path)?)
    } else {
        None
    };

    let probes = ProbedInputs {
        primary,
        added,
        geometry,
    };

    let job = plan(request, input_file, &probes, registry)?;
    let rendered = render_command(&request.ffmpeg_bin, &job.args);

    if request.dry_run {
        info!("dry run: {} -> {}", input_file, job.output.display());
        println!("{}", rendered);
        return Ok(());
    }

    debug!("{}", rendered);
    info!("starting: {} -> {}", input_file, job.output.display());
    runner.run(&job.args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbedSource, StreamGeometry};
    use std::fs::File;
    use tempfile::TempDir;

    struct StubProber {
        audio_streams: usize,
    }

    impl MediaProber for StubProber {
        fn stream_counts(&self, _path: &str) -> CnvtResult<ProbedSource> {
            let mut counts = BTreeMap::new();
            counts.insert(StreamType::Video, 1);
            counts.insert(StreamType::Audio, self.audio_streams);
            Ok(ProbedSource { counts })
        }

        fn video_geometry(&self, _path: &str) -> CnvtResult<StreamGeometry> {
            Ok(StreamGeometry {
                width: 1920,
                height: 1080,
                display_aspect: None,
            })
        }
    }

    fn dry_run_request(input: &str, output: &str) -> ConversionRequest {
        ConversionRequest {
            input: input.to_string(),
            output: output.to_string(),
            sequence: false,
            framerate: "30000/1001".to_string(),
            container: None,
            types: BTreeMap::new(),
            params: Default::default(),
            resize: None,
            crop: None,
            padding: 4,
            shortest: false,
            duration: None,
            strip_chapters: false,
            strip_metadata: false,
            strip_unknown: false,
            attachment: None,
            overwrite: false,
            dry_run: true,
            stop_on_error: false,
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
        }
    }

    #[test]
    fn dry_run_completes_without_ffmpeg() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        File::create(&input).unwrap();

        let request = dry_run_request(input.to_str().unwrap(), "out.mkv");
        let prober = StubProber { audio_streams: 2 };
        let failures = run(&request, &prober, &CodecRegistry::builtin()).unwrap();
        assert_eq!(failures, 0);
    }

    #[test]
    fn multiple_inputs_need_directory_output() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("a.mp4")).unwrap();
        File::create(dir.path().join("b.mp4")).unwrap();

        let pattern = dir.path().join("*.mp4");
        let request = dry_run_request(pattern.to_str().unwrap(), "single-file.mkv");
        let prober = StubProber { audio_streams: 1 };
        let err = run(&request, &prober, &CodecRegistry::builtin()).unwrap_err();
        assert!(matches!(err, CnvtError::OutputPath { .. }));
    }

    #[test]
    fn out_of_range_selector_fails_before_invocation() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        File::create(&input).unwrap();

        let mut request = dry_run_request(input.to_str().unwrap(), "out.mkv");
        request.types.insert(
            StreamType::Audio,
            crate::model::StreamTypeOptions {
                single_stream: Some(5),
                ..Default::default()
            },
        );
        request.stop_on_error = true;

        let prober = StubProber { audio_streams: 2 };
        let err = run(&request, &prober, &CodecRegistry::builtin()).unwrap_err();
        assert!(matches!(err, CnvtError::SelectorOutOfRange { .. }));
    }
}
