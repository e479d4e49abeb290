//! Output path resolution

use std::path::{Path, PathBuf};

use crate::error::{CnvtError, CnvtResult};
use crate::model::Container;

/// Resolve the output file for one input.
///
/// A directory destination gets the input stem plus the container extension
/// (the input extension when no container was requested); anything else is
/// taken as the output file as given.
pub fn resolve_output(
    output: &str,
    input_file: &str,
    container: Option<Container>,
) -> CnvtResult<PathBuf> {
    let out_path = Path::new(output);
    if !out_path.is_dir() {
        return Ok(out_path.to_path_buf());
    }

    let input_path = Path::new(input_file);
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CnvtError::OutputPath {
            message: format!("cannot derive output name from input '{}'", input_file),
        })?;

    let extension = match container {
        Some(container) => container.extension().to_string(),
        None => input_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_string())
            .ok_or_else(|| CnvtError::OutputPath {
                message: format!(
                    "input '{}' has no extension and no container was given",
                    input_file
                ),
            })?,
    };

    Ok(out_path.join(format!("{}.{}", stem, extension)))
}
