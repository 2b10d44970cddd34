//! Host environment checks run before a build starts.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::types::PackError;

/// Environment variables that may point at an NDK install, checked in order.
pub const NDK_HOME_VARS: [&str; 3] = ["NDK_ROOT", "ANDROID_NDK_HOME", "ANDROID_NDK_ROOT"];

/// Locates the build tool.
///
/// Returns `program` unchanged when it can be launched as-is (on PATH or an
/// existing path). Otherwise looks for it inside the NDK directories named by
/// [`NDK_HOME_VARS`] and returns the first hit.
pub fn check_env(program: &Path) -> Result<PathBuf, PackError> {
    if is_launchable(program) {
        tracing::debug!("using {}", program.display());
        return Ok(program.to_path_buf());
    }

    let roots: Vec<PathBuf> = NDK_HOME_VARS
        .iter()
        .filter_map(|var| env::var_os(var))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .collect();

    match find_in_ndk_roots(program, &roots) {
        Some(found) => {
            tracing::info!("using {} from NDK install", found.display());
            Ok(found)
        }
        None => Err(PackError::ToolNotFound {
            program: program.display().to_string(),
        }),
    }
}

/// Checks whether `program --version` can be started.
fn is_launchable(program: &Path) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Returns the first `<root>/<program file name>` that is a file.
pub fn find_in_ndk_roots(program: &Path, roots: &[PathBuf]) -> Option<PathBuf> {
    let file_name = program.file_name()?;
    roots
        .iter()
        .map(|root| root.join(file_name))
        .find(|candidate| candidate.is_file())
}
