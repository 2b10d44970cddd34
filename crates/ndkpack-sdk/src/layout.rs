//! SDK layouts: which subprojects to build and which sources ship with them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory inside the output tree that receives per-ABI libraries.
pub const LIBS_DIR: &str = "mars_libs";

/// Directory inside each ABI directory that receives unstripped shared objects.
pub const SYMBOLS_DIR: &str = "symbols";

/// Copies one auxiliary file into the output tree.
///
/// `from` is relative to the source root, `to` is relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl CopyRule {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Everything the builder needs to know about one SDK flavour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLayout {
    /// Short name used in logs and reports.
    pub name: String,
    /// Subproject directories under the source root, in build order.
    pub subprojects: Vec<String>,
    /// Auxiliary files, applied in order.
    pub copy_files: Vec<CopyRule>,
    /// Output tree, relative to the working directory unless absolute.
    pub output_dir: PathBuf,
}

impl SdkLayout {
    /// The full mars SDK: networking, logging and their dependencies.
    pub fn mars() -> Self {
        Self {
            name: "mars".to_string(),
            subprojects: ["openssl", "comm", "baseevent", "log", "app", "sdt", "stn"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            copy_files: vec![
                CopyRule::new("stn/proto/longlink_packer.h", "jni/longlink_packer.h"),
                CopyRule::new("stn/proto/shortlink_packer.h", "jni/shortlink_packer.h"),
                CopyRule::new(
                    "stn/proto/longlink_packer.cc",
                    "jni/longlink_packer.cc.rewriteme",
                ),
                CopyRule::new(
                    "stn/proto/shortlink_packer.cc",
                    "jni/shortlink_packer.cc.rewriteme",
                ),
                CopyRule::new("log/crypt/log_crypt.h", "jni/log_crypt.h"),
                CopyRule::new("log/crypt/log_crypt.cc", "jni/log_crypt.cc.rewriteme"),
                CopyRule::new(
                    "log/crypt/decode_mars_log_file.py",
                    "jni/decode_mars_log_file.py.rewriteme",
                ),
                CopyRule::new("mk_template/JNI_OnLoad.cpp", "jni/JNI_OnLoad.cc"),
            ],
            output_dir: PathBuf::from("mars_android_sdk"),
        }
    }

    /// The logging-only SDK.
    pub fn xlog() -> Self {
        Self {
            name: "xlog".to_string(),
            subprojects: ["openssl", "comm", "log"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            copy_files: vec![
                CopyRule::new("log/crypt/log_crypt.h", "jni/log_crypt.h"),
                CopyRule::new(
                    "log/crypt/decode_mars_log_file.py",
                    "jni/decode_mars_log_file.py.rewriteme",
                ),
                CopyRule::new("mk_template/JNI_OnLoad.cpp", "jni/JNI_OnLoad.cc"),
            ],
            output_dir: PathBuf::from("mars_xlog_sdk"),
        }
    }

    /// `<output>/mars_libs`
    pub fn libs_dir(&self, work_dir: &Path) -> PathBuf {
        self.output_path(work_dir).join(LIBS_DIR)
    }

    /// The output directory resolved against `work_dir`.
    pub fn output_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.output_dir)
    }
}
