//! `verinfo.h` generation.
//!
//! Every SDK build stamps its library directory with a small C header that
//! records the source revision, branch, remote and build time, so a shipped
//! `.so` can be traced back to the tree it came from.

use std::path::{Path, PathBuf};
use std::process::Command;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::types::PackError;

/// File name written into the libs directory.
pub const REVISION_FILE_NAME: &str = "verinfo.h";

/// Tag used when no architecture override is in effect.
pub const DEFAULT_TAG: &str = "default";

/// Source-control facts recorded in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionInfo {
    pub revision: String,
    pub branch: String,
    pub url: String,
    pub build_time: String,
    pub tag: String,
}

impl RevisionInfo {
    /// Collects git information for `source_root`.
    ///
    /// Anything git cannot answer becomes `unknown` (or empty for the URL).
    pub fn collect(source_root: &Path, tag: &str) -> Self {
        Self {
            revision: git_output(source_root, &["rev-parse", "--short", "HEAD"])
                .unwrap_or_else(|| "unknown".to_string()),
            branch: git_output(source_root, &["rev-parse", "--abbrev-ref", "HEAD"])
                .unwrap_or_else(|| "unknown".to_string()),
            url: git_output(source_root, &["config", "--get", "remote.origin.url"])
                .unwrap_or_default(),
            build_time: build_time(),
            tag: tag.to_string(),
        }
    }

    /// Renders the C header.
    pub fn render(&self) -> String {
        format!(
            r#"#ifndef Mars_verinfo_h
#define Mars_verinfo_h

#define MARS_REVISION "{}"
#define MARS_PATH "{}"
#define MARS_URL "{}"
#define MARS_BUILD_TIME "{}"
#define MARS_TAG "{}"

#endif
"#,
            escape(&self.revision),
            escape(&self.branch),
            escape(&self.url),
            escape(&self.build_time),
            escape(&self.tag),
        )
    }
}

/// Writes `verinfo.h` into `dir`, creating it if needed.
pub fn write_revision_file(
    dir: &Path,
    source_root: &Path,
    tag: &str,
) -> Result<PathBuf, PackError> {
    let info = RevisionInfo::collect(source_root, tag);
    std::fs::create_dir_all(dir).map_err(|e| PackError::io(dir, e))?;
    let path = dir.join(REVISION_FILE_NAME);
    std::fs::write(&path, info.render()).map_err(|e| PackError::io(&path, e))?;
    tracing::debug!(
        "wrote {} (revision {}, tag {})",
        path.display(),
        info.revision,
        info.tag
    );
    Ok(path)
}

fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() || value == "HEAD" {
        None
    } else {
        Some(value)
    }
}

fn build_time() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_default()
}

// Keeps values from terminating the C string literal early.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
