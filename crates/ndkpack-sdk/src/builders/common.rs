//! Filesystem helpers shared by the builders.
//!
//! All functions here attach the offending path to any I/O error so a failed
//! copy or removal says exactly where it happened. Directory listings are
//! sorted, which keeps copy order (and therefore overwrite order) stable
//! across platforms.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::types::PackError;

/// Removes `dir` and everything under it.
///
/// A missing directory is not an error. Returns whether anything was removed.
pub fn remove_dir_if_exists(dir: &Path) -> Result<bool, PackError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::debug!("removed {}", dir.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PackError::io(dir, e)),
    }
}

/// Creates `dir` and its parents.
pub fn ensure_dir(dir: &Path) -> Result<(), PackError> {
    fs::create_dir_all(dir).map_err(|e| PackError::io(dir, e))
}

/// Names of the immediate subdirectories of `dir`, sorted.
///
/// Plain files are skipped. A missing `dir` yields an empty list.
pub fn subdirectories(dir: &Path) -> Result<Vec<String>, PackError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PackError::io(dir, e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PackError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Regular files directly in `dir` whose extension is `ext`, sorted.
///
/// A missing `dir` yields an empty list.
pub fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, PackError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PackError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PackError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Copies `src` into `dest_dir`, keeping its file name. Overwrites.
pub fn copy_into(src: &Path, dest_dir: &Path) -> Result<PathBuf, PackError> {
    let name = src.file_name().ok_or_else(|| {
        PackError::Config(format!("cannot copy {}: no file name", src.display()))
    })?;
    let dest = dest_dir.join(name);
    copy_file(src, &dest)?;
    Ok(dest)
}

/// Copies `src` to `dest`. Overwrites.
pub fn copy_file(src: &Path, dest: &Path) -> Result<(), PackError> {
    fs::copy(src, dest).map_err(|e| PackError::io(src, e))?;
    tracing::debug!("copied {} -> {}", src.display(), dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn removing_missing_dir_is_ok() {
        let tmp = TempDir::new().unwrap();
        let removed = remove_dir_if_exists(&tmp.path().join("nope")).unwrap();
        assert!(!removed);
    }

    #[test]
    fn removes_nested_tree() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("obj/local/x86");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("libcomm.a"), b"a").unwrap();

        assert!(remove_dir_if_exists(&tmp.path().join("obj")).unwrap());
        assert!(!tmp.path().join("obj").exists());
    }

    #[test]
    fn subdirectories_skip_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("x86")).unwrap();
        fs::create_dir(tmp.path().join("arm64-v8a")).unwrap();
        fs::write(tmp.path().join("README"), b"").unwrap();

        assert_eq!(subdirectories(tmp.path()).unwrap(), ["arm64-v8a", "x86"]);
        assert!(subdirectories(&tmp.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn extension_filter_is_exact() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("libb.so"), b"").unwrap();
        fs::write(tmp.path().join("liba.so"), b"").unwrap();
        fs::write(tmp.path().join("libc.a"), b"").unwrap();
        fs::write(tmp.path().join("libd.so.1"), b"").unwrap();
        fs::create_dir(tmp.path().join("dir.so")).unwrap();

        let so = files_with_extension(tmp.path(), "so").unwrap();
        let names: Vec<_> = so
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["liba.so", "libb.so"]);
        assert_eq!(files_with_extension(tmp.path(), "a").unwrap().len(), 1);
    }

    #[test]
    fn copy_into_overwrites() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("libx.so");
        let dest_dir = tmp.path().join("out");
        fs::create_dir(&dest_dir).unwrap();
        fs::write(dest_dir.join("libx.so"), b"old").unwrap();
        fs::write(&src, b"new").unwrap();

        let dest = copy_into(&src, &dest_dir).unwrap();
        assert_eq!(fs::read(dest).unwrap(), b"new");
    }

    #[test]
    fn copy_failure_names_the_source() {
        let tmp = TempDir::new().unwrap();
        let err = copy_file(&tmp.path().join("missing.so"), &tmp.path().join("x")).unwrap_err();
        assert!(err.to_string().contains("missing.so"));
    }
}
