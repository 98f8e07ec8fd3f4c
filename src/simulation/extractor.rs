//! Extractor stage: batch statement, command, and output parsing.

use std::fs;
use std::path::{Path, PathBuf};

use super::config::ExtractionOptions;
use super::error::Error;
use super::invoke::Invocation;
use super::raw::RawExtraction;

/// Path of the JSON document extracted from `stl`: `<stem>_extracted.json`
/// beside the mesh.
pub fn output_path(stl: &Path) -> PathBuf {
    let stem = stl
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stl.with_file_name(format!("{stem}_extracted.json"))
}

/// The single statement handed to the scripting engine.
pub fn batch_statement(
    stl: &Path,
    output: &Path,
    options: &ExtractionOptions,
    box_length: f64,
) -> String {
    format!(
        "STLextractToJSON(\"{}\",\"{}\", \"RemoveOutlierRangez\",{},\"OutlierZThreshold\",{},\"Cutoff\",{}, \"CutoffDirection\",\"{}\",\"BoundingBoxLength\",{})",
        stl.display(),
        output.display(),
        options.remove_outlier_range_z,
        options.outlier_z_threshold,
        options.cutoff,
        options.cutoff_direction,
        box_length,
    )
}

/// Extractor command for `stl`, run in the mesh's directory.
pub fn invocation(
    program: &str,
    stl: &Path,
    options: &ExtractionOptions,
    box_length: f64,
) -> Invocation {
    let output = output_path(stl);
    let cwd = stl.parent().map(Path::to_path_buf).unwrap_or_default();

    Invocation::new(program, cwd)
        .arg("-batch")
        .arg(batch_statement(stl, &output, options, box_length))
        .expects(output)
}

pub fn read_output(path: &Path) -> Result<RawExtraction, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| Error::malformed(path, e))
}
