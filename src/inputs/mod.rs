//! Input enumeration: single file, wildcard, or printf-style sequence

use std::path::Path;
use tracing::debug;

use crate::error::{CnvtError, CnvtResult};

/// Expand the input specifier into the list of files to process.
///
/// An existing file is taken as-is. A sequence template (with `--sequence`)
/// is passed through for ffmpeg to expand. Anything else is treated as a
/// wildcard pattern.
pub fn enumerate_inputs(input: &str, sequence: bool) -> CnvtResult<Vec<String>> {
    if Path::new(input).is_file() {
        return Ok(vec![input.to_string()]);
    }

    if sequence && input.contains('%') {
        return Ok(vec![input.to_string()]);
    }

    let pattern = glob::glob(input).map_err(|e| {
        CnvtError::config(format!("invalid input pattern '{}': {}", input, e))
    })?;

    let mut files = Vec::new();
    for entry in pattern {
        match entry {
            Ok(path) => files.push(path.to_string_lossy().into_owned()),
            Err(e) => debug!("skipping unreadable match: {}", e),
        }
    }

    if files.is_empty() {
        return Err(CnvtError::NoInputs {
            input: input.to_string(),
        });
    }
    Ok(files)
}

/// First concrete filename of a printf-style sequence template, for probing.
///
/// `frames/img%04d.jpg` becomes `frames/img0001.jpg`. Templates that do not
/// parse are returned unchanged so the probe error names the real path.
pub fn sequence_probe_name(template: &str) -> String {
    let Some(pct) = template.rfind('%') else {
        return template.to_string();
    };
    let Some(d_off) = template[pct..].find('d') else {
        return template.to_string();
    };
    let d_pos = pct + d_off;

    let width: usize = match template[pct + 1..d_pos].parse() {
        Ok(width) => width,
        Err(_) if d_pos == pct + 1 => 1,
        Err(_) => return template.to_string(),
    };

    format!(
        "{}{:0>width$}{}",
        &template[..pct],
        "1",
        &template[d_pos + 1..],
        width = width
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn single_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        File::create(&path).unwrap();

        let files = enumerate_inputs(path.to_str().unwrap(), false).unwrap();
        assert_eq!(files, vec![path.to_string_lossy().into_owned()]);
    }

    #[test]
    fn wildcard_expansion() {
        let dir = TempDir::new().unwrap();
        for name in ["a.mkv", "b.mkv", "c.mp4"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let pattern = dir.path().join("*.mkv");
        let mut files = enumerate_inputs(pattern.to_str().unwrap(), false).unwrap();
        files.sort();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.mkv"));
        assert!(files[1].ends_with("b.mkv"));
    }

    #[test]
    fn empty_expansion_is_an_error() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().join("*.webm");
        let err = enumerate_inputs(pattern.to_str().unwrap(), false).unwrap_err();
        assert!(matches!(err, CnvtError::NoInputs { .. }));
    }

    #[test]
    fn sequence_template_passes_through() {
        let files = enumerate_inputs("frames/img%04d.jpg", true).unwrap();
        assert_eq!(files, vec!["frames/img%04d.jpg"]);
    }

    #[test]
    fn sequence_probe_names() {
        assert_eq!(sequence_probe_name("img%04d.jpg"), "img0001.jpg");
        assert_eq!(sequence_probe_name("img%d.jpg"), "img1.jpg");
        assert_eq!(sequence_probe_name("TLPS%06d.JPG"), "TLPS000001.JPG");
        assert_eq!(sequence_probe_name("plain.jpg"), "plain.jpg");
        assert_eq!(sequence_probe_name("broken%x.jpg"), "broken%x.jpg");
    }
}
