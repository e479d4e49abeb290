//! cnvt - convert and mux media files with FFmpeg
//!
//! Builds an ffmpeg invocation from declarative stream selection, codec and
//! resize options, probing the inputs with ffprobe first. All media
//! processing is delegated to the external tools.
//!
//! ```bash
//! cnvt input.mp4 output.mkv
//! cnvt 'in/*.mkv' out/ --container mp4 --codec v h264 --codec a aac
//! cnvt input.mkv track.mp3 --codec a mp3 --singlestream a 0 --nocopy v --nocopy s
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cnvt::cli::{options, Cli};
use cnvt::probe::FfprobeProber;
use cnvt::{app, CodecRegistry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let registry = CodecRegistry::builtin();

    if cli.codecs {
        print!("{}", registry.capabilities());
        return Ok(());
    }

    let request = options::build_request(&cli, &registry)?;
    let prober = FfprobeProber::new(request.ffprobe_bin.as_str());

    let failures = app::run(&request, &prober, &registry)?;
    if failures > 0 {
        bail!("{} job(s) failed", failures);
    }
    Ok(())
}
