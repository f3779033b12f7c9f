//! Normalize scanned page file names to bare page numbers.
//!
//! Scanners and PDF splitters name pages like `Cong-bao-so-12-0007.jpg`. The
//! batch commands use the file stem as the page id, so these are renamed to
//! `7.jpg`: the number after the last dash, without leading zeros.

use crate::error::{Error, Result};
use regex::RegexBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Why a file was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The name does not end in `-<number>.<ext>`
    NoNumber,
    /// A file with the target name already exists
    TargetExists(PathBuf),
}

/// Outcome of a renaming pass.
#[derive(Debug, Clone, Default)]
pub struct RenameReport {
    /// Files renamed, as (old, new) paths
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Files left alone
    pub skipped: Vec<(PathBuf, SkipReason)>,
}

impl RenameReport {
    /// Number of files looked at.
    pub fn total(&self) -> usize {
        self.renamed.len() + self.skipped.len()
    }
}

/// Rename every `<text>-<number>.<ext>` file in `dir` to `<number>.<ext>`.
///
/// `ext` is matched case-insensitively and written back as it appeared in
/// the original name. Existing targets are never overwritten.
pub fn rename_numbered<P: AsRef<Path>>(dir: P, ext: &str) -> Result<RenameReport> {
    let dir = dir.as_ref();
    let ext = ext.trim_start_matches('.');
    let pattern = RegexBuilder::new(&format!(r"-(\d+)\.({})$", regex::escape(ext)))
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Other(format!("invalid extension {:?}: {}", ext, e)))?;

    let mut report = RenameReport::default();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        let has_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case(ext));
        if !has_ext {
            continue;
        }

        let Some(caps) = pattern.captures(&name) else {
            log::info!("Skipped: {} (no number pattern found)", name);
            report.skipped.push((path, SkipReason::NoNumber));
            continue;
        };

        let target = dir.join(format!("{}.{}", strip_leading_zeros(&caps[1]), &caps[2]));
        if target.exists() {
            log::info!("Skipped: {} (target already exists)", name);
            report.skipped.push((path, SkipReason::TargetExists(target)));
            continue;
        }

        fs::rename(&path, &target)?;
        log::info!("Renamed: {} -> {}", name, target.display());
        report.renamed.push((path, target));
    }

    log::info!(
        "Summary: {} renamed, {} skipped",
        report.renamed.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn strip_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}
