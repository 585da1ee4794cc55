use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

pub const REPORT_FILE_NAME: &str = "stress_input_errors.txt";

fn joined(title: &str, values: &[f64]) -> String {
    let mut line = title.to_string();
    for value in values {
        line.push_str(&format!(", {}", value));
    }
    line
}

/// Write `Stress scale, ...` and `Errors, ...` lines to the report file
pub fn write_scales_and_errors(work_dir: &Path, scales: &[f64], errors: &[f64]) -> io::Result<PathBuf> {
    let path = work_dir.join(REPORT_FILE_NAME);
    let content = format!("{}\n{}", joined("Stress scale", scales), joined("Errors", errors));
    fs::write(&path, content)?;
    info!("Scales and errors written to {:?}", path);
    Ok(path)
}

/// Write the `Deviations, ...` line, and `Errors, ...` when errors were
/// computed, to the report file
pub fn write_deviations_and_errors(work_dir: &Path, deviations: &[f64], errors: Option<&[f64]>) -> io::Result<PathBuf> {
    let path = work_dir.join(REPORT_FILE_NAME);
    let mut content = joined("Deviations", deviations);
    if let Some(errors) = errors {
        content.push('\n');
        content.push_str(&joined("Errors", errors));
    }
    fs::write(&path, content)?;
    info!("Deviations and errors written to {:?}", path);
    Ok(path)
}
