//! The `customer_id, LTV` report.
//!
//! Customer ids are written unquoted, so an id containing a comma produces an
//! ambiguous line.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ltv_core::LtvResult;
use tracing::info;

pub const REPORT_HEADER: &str = "customer_id, LTV";

#[derive(thiserror::Error, Debug)]
#[error("cannot write report {}", path.display())]
pub struct ReportError {
    pub path: PathBuf,
    #[source]
    pub reason: std::io::Error,
}

pub fn render_report(results: &[LtvResult]) -> String {
    let mut out = String::with_capacity(REPORT_HEADER.len() + 1 + results.len() * 24);
    out.push_str(REPORT_HEADER);
    out.push('\n');
    for result in results {
        out.push_str(&format!("{},{:.2}\n", result.customer_id, result.value));
    }
    out
}

/// Write the report next to `path` first and move it into place, so a failed
/// write never leaves a partial report behind.
pub fn write_report(path: &Path, results: &[LtvResult]) -> Result<usize, ReportError> {
    let io_error = |reason| ReportError {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let staging = staging_path(path);
    let written = File::create(&staging).and_then(|file| {
        let mut writer = BufWriter::new(file);
        writer.write_all(render_report(results).as_bytes())?;
        writer.flush()
    });
    if let Err(reason) = written.and_then(|_| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(io_error(reason));
    }

    info!(path = %path.display(), rows = results.len(), "report written");
    Ok(results.len())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<LtvResult> {
        vec![
            LtvResult::new("96f55c7d8f42", 26000.0),
            LtvResult::new("d4e5f6a7b8c9", 6416.8),
            LtvResult::new("a1b2c3d4e5f6", 0.0),
        ]
    }

    #[test]
    fn every_value_has_two_decimals() {
        assert_eq!(
            render_report(&results()),
            "customer_id, LTV\n96f55c7d8f42,26000.00\nd4e5f6a7b8c9,6416.80\na1b2c3d4e5f6,0.00\n"
        );
    }

    #[test]
    fn empty_report_has_header_only() {
        assert_eq!(render_report(&[]), "customer_id, LTV\n");
    }

    #[test]
    fn writes_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("output.txt");

        let rows = write_report(&path, &results()).unwrap();

        assert_eq!(rows, 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), render_report(&results()));
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn unwritable_target_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // the target is an existing directory, so the final rename fails
        let err = write_report(dir.path(), &results()).unwrap_err();
        assert_eq!(err.path, dir.path());
        let cause = std::error::Error::source(&err).unwrap();
        assert!(cause.is::<std::io::Error>());
    }
}
