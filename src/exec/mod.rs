//! ffmpeg process invocation

use std::process::Command;
use tracing::debug;

use crate::error::{CnvtError, CnvtResult};

/// Characters that force quoting when rendering a command line for display
const SPECIAL_CHARS: &[char] = &[' ', '$', '^', '\''];

/// Runs planned argument lists through the configured ffmpeg binary
pub struct FfmpegRunner {
    binary: String,
}

impl FfmpegRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Invoke ffmpeg and wait for it to finish. stdio is inherited so
    /// encoding progress stays visible. Non-zero exit becomes an error;
    /// no retries.
    pub fn run(&self, args: &[String]) -> CnvtResult<()> {
        debug!(binary = %self.binary, "spawning ffmpeg");
        let status = Command::new(&self.binary).args(args).status()?;
        if status.success() {
            return Ok(());
        }
        Err(CnvtError::ExternalTool {
            program: self.binary.clone(),
            code: status.code().unwrap_or(-1),
        })
    }
}

/// Render a command line for logging, quoting arguments that contain
/// shell-special characters
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(quote_if_needed(program));
    parts.extend(args.iter().map(|a| quote_if_needed(a)));
    parts.join(" ")
}

fn quote_if_needed(text: &str) -> String {
    if text.contains(SPECIAL_CHARS) {
        format!("\"{}\"", text)
    } else {
        text.to_string()
    }
}
