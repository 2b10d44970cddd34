//! Core types for ndkpack-sdk.
//!
//! This module defines the fundamental types used throughout the SDK:
//!
//! - [`PackError`] - Error type for build and packaging operations
//! - [`Arch`] - The CPU architectures `ndk-build` can be pinned to
//! - [`LinkKind`] - Whether a build stops at static libraries or links a shared one
//! - [`BuildReport`] / [`AbiArtifacts`] - What a build produced and where it went

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Error types for ndkpack-sdk operations.
///
/// # Example
///
/// ```ignore
/// use ndkpack_sdk::{PackError, builders::AndroidSdkBuilder};
///
/// match builder.build_static() {
///     Ok(report) => println!("built {} subprojects", report.built.len()),
///     Err(PackError::CommandFailed { code, .. }) => {
///         eprintln!("ndk-build exited with {:?}", code);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// A filesystem operation failed.
    ///
    /// The path is the file or directory being read, created, copied or removed.
    #[error("I/O error at {}: {source}. Check file paths and permissions", .path.display())]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The external build tool could not be started at all.
    #[error("failed to start {program}: {source}\n\nEnsure the tool is installed and on PATH.")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The external build tool ran and exited with a nonzero status.
    ///
    /// `code` is `None` when the process was terminated by a signal.
    #[error("{description} failed (exit {})", exit_status(.code))]
    CommandFailed {
        /// Human-readable description of the command line.
        description: String,
        /// Process exit code, if any.
        code: Option<i32>,
    },

    /// The build tool is neither on PATH nor inside a configured NDK.
    #[error("{program} not found.\n\nInstall the Android NDK and add it to PATH or set NDK_ROOT.")]
    ToolNotFound {
        /// Program that was looked up.
        program: String,
    },

    /// Invalid or inconsistent configuration.
    #[error("configuration error: {0}. Check ndkpack.toml or CLI arguments")]
    Config(String),

    /// JSON serialization failed while writing a build report.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PackError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the external command's exit code when this error came from one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            PackError::CommandFailed { code, .. } => *code,
            _ => None,
        }
    }
}

fn exit_status(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// CPU architecture passed to `ndk-build` as `_ARCH_=<abi>`.
///
/// # Example
///
/// ```
/// use ndkpack_sdk::Arch;
///
/// let arch: Arch = "arm64-v8a".parse().unwrap();
/// assert_eq!(arch, Arch::Arm64V8a);
/// assert_eq!(arch.as_str(), "arm64-v8a");
/// assert!("riscv64".parse::<Arch>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "x86")]
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "armeabi")]
    Armeabi,
    #[serde(rename = "arm64-v8a")]
    Arm64V8a,
    #[serde(rename = "armeabi-v7a")]
    ArmeabiV7a,
    #[serde(rename = "mips")]
    Mips,
    #[serde(rename = "mips64")]
    Mips64,
}

impl Arch {
    /// Every architecture the build scripts understand, in menu order.
    pub const ALL: [Arch; 7] = [
        Arch::X86,
        Arch::X86_64,
        Arch::Armeabi,
        Arch::Arm64V8a,
        Arch::ArmeabiV7a,
        Arch::Mips,
        Arch::Mips64,
    ];

    /// Returns the ABI name as used by the NDK.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armeabi => "armeabi",
            Arch::Arm64V8a => "arm64-v8a",
            Arch::ArmeabiV7a => "armeabi-v7a",
            Arch::Mips => "mips",
            Arch::Mips64 => "mips64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arch::ALL
            .iter()
            .copied()
            .find(|arch| arch.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Arch::ALL.iter().map(Arch::as_str).collect();
                PackError::Config(format!(
                    "unknown architecture '{}', expected one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// How far a build goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Build every subproject and collect its static archives and shared objects.
    Static,
    /// Do the static build, then run `ndk-build` once more over the SDK tree.
    Shared,
}

impl LinkKind {
    /// Returns `"static"` or `"shared"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Static => "static",
            LinkKind::Shared => "shared",
        }
    }
}

/// Libraries gathered for one ABI directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiArtifacts {
    /// ABI directory name, e.g. `arm64-v8a`.
    pub abi: String,
    /// Files copied into `mars_libs/<abi>/`.
    pub libraries: Vec<PathBuf>,
    /// Unstripped shared objects copied into `mars_libs/<abi>/symbols/`.
    pub symbols: Vec<PathBuf>,
}

/// Summary of a completed build.
///
/// Paths in `artifacts` and `copied_files` are destinations inside the SDK
/// output tree. Written to disk by the CLI's `--report` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Layout that was built (`mars` or `xlog`).
    pub layout: String,
    /// Static or shared.
    pub link: LinkKind,
    /// Architecture override, if one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<Arch>,
    /// Root of the SDK output tree.
    pub output_dir: PathBuf,
    /// Subprojects `ndk-build` ran in, in build order.
    pub built: Vec<String>,
    /// Subprojects skipped because they have no `jni/` directory.
    pub skipped: Vec<String>,
    /// Collected libraries, one entry per ABI in first-seen order.
    pub artifacts: Vec<AbiArtifacts>,
    /// Auxiliary sources copied into the output tree.
    pub copied_files: Vec<PathBuf>,
}

impl BuildReport {
    /// Returns the artifact entry for `abi`, creating it if needed.
    pub(crate) fn abi_mut(&mut self, abi: &str) -> &mut AbiArtifacts {
        let idx = match self.artifacts.iter().position(|a| a.abi == abi) {
            Some(idx) => idx,
            None => {
                self.artifacts.push(AbiArtifacts {
                    abi: abi.to_string(),
                    ..Default::default()
                });
                self.artifacts.len() - 1
            }
        };
        &mut self.artifacts[idx]
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PackError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
