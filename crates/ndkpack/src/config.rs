//! Configuration file support for ndkpack.
//!
//! An optional `ndkpack.toml` overrides the built-in ndk-build command, the
//! source root and the two SDK layouts, so a fork of the native tree can add
//! subprojects or ship different sources without patching the tool.
//!
//! ## Configuration File Location
//!
//! Unless `--config` names a file, the configuration is searched for in:
//! 1. Current working directory (`./ndkpack.toml`)
//! 2. Parent directories (up to the repository root or filesystem root)
//!
//! Relative paths inside the file resolve against the directory holding it.
//!
//! ## Example Configuration
//!
//! ```toml
//! [ndk]
//! program = "/opt/android-ndk/ndk-build"
//! args = ["NDK_DEBUG=0", "-j", "-B", "SDK=0", "LIBPREFIX=mars"]
//!
//! [paths]
//! source_root = ".."
//!
//! [mars]
//! output_dir = "mars_android_sdk"
//! subprojects = ["openssl", "comm", "baseevent", "log", "app", "sdt", "stn"]
//!
//! [[xlog.copy]]
//! from = "log/crypt/log_crypt.h"
//! to = "jni/log_crypt.h"
//! ```

use anyhow::{Context, Result};
use ndkpack_sdk::{CopyRule, NdkBuildCommand, SdkLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Flavor;

/// The default configuration file name.
pub const CONFIG_FILE_NAME: &str = "ndkpack.toml";

/// Where the subprojects live when neither CLI nor config says otherwise.
pub const DEFAULT_SOURCE_ROOT: &str = "..";

/// Root configuration structure for `ndkpack.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NdkpackConfig {
    /// ndk-build invocation.
    pub ndk: NdkConfig,

    /// Filesystem locations.
    pub paths: PathsConfig,

    /// Overrides for the mars layout.
    pub mars: LayoutConfig,

    /// Overrides for the xlog layout.
    pub xlog: LayoutConfig,
}

/// ndk-build invocation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NdkConfig {
    /// Program to run. Defaults to `ndk-build` on PATH.
    pub program: Option<PathBuf>,

    /// Arguments placed before `-C <dir>`.
    ///
    /// Defaults to `NDK_DEBUG=0 -j -B SDK=0 LIBPREFIX=mars`.
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory containing the native subprojects. Defaults to `..`.
    pub source_root: Option<PathBuf>,
}

/// Per-layout overrides. Anything left out keeps the built-in preset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub output_dir: Option<PathBuf>,
    pub subprojects: Option<Vec<String>>,
    pub copy: Option<Vec<CopyRule>>,
}

impl NdkpackConfig {
    /// Loads configuration from the specified file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: NdkpackConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Searches for `ndkpack.toml` from the current directory upward.
    pub fn discover() -> Result<Option<(Self, PathBuf)>> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&cwd)
    }

    /// Searches for `ndkpack.toml` from `start_dir` upward.
    ///
    /// Stops at the first directory containing `.git`, or at the filesystem root.
    pub fn discover_from(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let config = Self::load_from_file(&config_path)?;
                return Ok(Some((config, config_path)));
            }

            if current.join(".git").exists() || !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    fn layout_config(&self, flavor: Flavor) -> &LayoutConfig {
        match flavor {
            Flavor::Mars => &self.mars,
            Flavor::Xlog => &self.xlog,
        }
    }
}

/// Merges config file values with CLI arguments.
///
/// CLI arguments always take precedence over config file values.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    /// Loaded configuration, if any.
    pub config: Option<NdkpackConfig>,

    /// Path to the loaded config file, if any.
    pub config_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Loads `explicit` if given, otherwise discovers a config file.
    ///
    /// An explicit path that cannot be read is an error; finding nothing
    /// during discovery is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = NdkpackConfig::load_from_file(path)?;
            return Ok(Self {
                config: Some(config),
                config_path: Some(path.to_path_buf()),
            });
        }

        match NdkpackConfig::discover()? {
            Some((config, path)) => Ok(Self {
                config: Some(config),
                config_path: Some(path),
            }),
            None => Ok(Self::default()),
        }
    }

    /// Resolves a CLI value, using config as fallback.
    pub fn resolve<T, F>(&self, cli_value: Option<T>, config_getter: F, default: T) -> T
    where
        F: FnOnce(&NdkpackConfig) -> Option<T>,
    {
        cli_value
            .or_else(|| self.config.as_ref().and_then(config_getter))
            .unwrap_or(default)
    }

    /// Source root: CLI, then config (relative to the config file), then `..`.
    pub fn source_root(&self, cli_value: Option<PathBuf>) -> PathBuf {
        let from_config = self
            .config
            .as_ref()
            .and_then(|c| c.paths.source_root.clone())
            .map(|p| self.relative_to_config(p));
        cli_value
            .or(from_config)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_ROOT))
    }

    /// The ndk-build template with config overrides applied.
    pub fn ndk_command(&self, cli_program: Option<PathBuf>) -> NdkBuildCommand {
        let program = self.resolve(
            cli_program,
            |c| c.ndk.program.clone(),
            PathBuf::from(ndkpack_sdk::command::DEFAULT_PROGRAM),
        );
        let mut command = NdkBuildCommand::new(program);
        if let Some(args) = self.config.as_ref().and_then(|c| c.ndk.args.clone()) {
            command = command.with_args(args);
        }
        command
    }

    /// The preset for `flavor` with any config overrides applied.
    pub fn layout(&self, flavor: Flavor) -> SdkLayout {
        let mut layout = match flavor {
            Flavor::Mars => SdkLayout::mars(),
            Flavor::Xlog => SdkLayout::xlog(),
        };
        let Some(overrides) = self.config.as_ref().map(|c| c.layout_config(flavor)) else {
            return layout;
        };
        if let Some(dir) = &overrides.output_dir {
            layout.output_dir = self.relative_to_config(dir.clone());
        }
        if let Some(subprojects) = &overrides.subprojects {
            layout.subprojects = subprojects.clone();
        }
        if let Some(copy) = &overrides.copy {
            layout.copy_files = copy.clone();
        }
        layout
    }

    fn relative_to_config(&self, path: PathBuf) -> PathBuf {
        match self.config_path.as_deref().and_then(Path::parent) {
            Some(base) if path.is_relative() && !base.as_os_str().is_empty() => base.join(path),
            _ => path,
        }
    }
}
