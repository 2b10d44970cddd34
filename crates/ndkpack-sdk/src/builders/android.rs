//! Android SDK build automation
//!
//! This module runs `ndk-build` over each native subproject of a layout and
//! assembles the results into a single SDK tree:
//!
//! ```text
//! <output>/
//! ├── mars_libs/
//! │   ├── verinfo.h
//! │   └── <abi>/
//! │       ├── lib*.so, lib*.a
//! │       └── symbols/lib*.so
//! └── jni/               # auxiliary sources from the layout's copy rules
//! ```

use std::path::{Path, PathBuf};

use crate::builders::common::{
    copy_file, copy_into, ensure_dir, files_with_extension, remove_dir_if_exists, subdirectories,
};
use crate::command::{
    CommandRunner, DryRunRunner, Invocation, NdkBuildCommand, SystemRunner, run_checked,
};
use crate::layout::{SYMBOLS_DIR, SdkLayout};
use crate::revision::{DEFAULT_TAG, write_revision_file};
use crate::types::{BuildReport, LinkKind, PackError};

/// Android builder that drives `ndk-build` and packages the output
pub struct AndroidSdkBuilder {
    /// Directory holding the subprojects (`openssl/`, `comm/`, ...)
    source_root: PathBuf,
    /// Directory relative output paths resolve against
    work_dir: PathBuf,
    layout: SdkLayout,
    command: NdkBuildCommand,
    runner: Option<Box<dyn CommandRunner>>,
    /// Whether to ask ndk-build for verbose output
    verbose: bool,
    /// Log what would happen without running or touching anything
    dry_run: bool,
}

impl AndroidSdkBuilder {
    /// Creates a new Android SDK builder
    ///
    /// # Arguments
    ///
    /// * `source_root` - Directory containing the native subprojects
    /// * `layout` - Which subprojects to build and which files to ship
    /// * `command` - The `ndk-build` command template, including any arch override
    pub fn new(
        source_root: impl Into<PathBuf>,
        layout: SdkLayout,
        command: NdkBuildCommand,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            work_dir: PathBuf::from("."),
            layout,
            command,
            runner: None,
            verbose: false,
            dry_run: false,
        }
    }

    /// Sets the directory the layout's output directory is relative to
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Passes `V=1` to ndk-build so it echoes every compiler command
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enables dry-run mode
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replaces the process runner
    pub fn runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Root of the SDK output tree
    pub fn output_dir(&self) -> PathBuf {
        self.layout.output_path(&self.work_dir)
    }

    /// Builds every subproject and collects static archives and shared objects
    ///
    /// This performs the following steps:
    /// 1. Remove output from previous builds
    /// 2. Write `verinfo.h` into the libs directory
    /// 3. Run ndk-build in each subproject that has a `jni/` directory
    /// 4. Copy per-ABI libraries and symbols into the libs directory
    /// 5. Copy the layout's auxiliary sources into the output tree
    ///
    /// # Returns
    ///
    /// * `Ok(BuildReport)` describing what was built and copied
    /// * `Err(PackError::CommandFailed)` as soon as one ndk-build run fails
    pub fn build_static(&self) -> Result<BuildReport, PackError> {
        let mut report = BuildReport {
            layout: self.layout.name.clone(),
            link: LinkKind::Static,
            arch: self.command.arch(),
            output_dir: self.output_dir(),
            built: Vec::new(),
            skipped: Vec::new(),
            artifacts: Vec::new(),
            copied_files: Vec::new(),
        };

        tracing::info!("Cleaning previous {} build output...", self.layout.name);
        self.clean()?;

        self.write_revision()?;

        tracing::info!("Running ndk-build for {} subprojects...", self.layout.name);
        self.build_subprojects(&mut report)?;

        // Without a real build, libs/ only holds whatever an earlier run left.
        if self.dry_run {
            tracing::info!(
                "[dry-run] would collect native libraries into {}",
                self.layout.libs_dir(&self.work_dir).display()
            );
        } else {
            tracing::info!("Collecting native libraries...");
            self.collect_artifacts(&mut report)?;
        }

        tracing::info!("Copying auxiliary sources...");
        self.copy_source_files(&mut report)?;

        Ok(report)
    }

    /// Static build followed by a final ndk-build over the output tree
    pub fn build_shared(&self) -> Result<BuildReport, PackError> {
        let report = self.build_static()?;
        self.link_shared(report)
    }

    /// Runs ndk-build over the SDK output tree itself, producing the shared library
    ///
    /// Expects `report` to come from [`Self::build_static`] on this builder.
    pub fn link_shared(&self, mut report: BuildReport) -> Result<BuildReport, PackError> {
        let output = self.output_dir();
        self.remove(&output.join("libs"))?;
        self.remove(&output.join("obj"))?;

        tracing::info!("Linking shared library in {}...", output.display());
        run_checked(self.active_runner(), &self.invocation(&output))?;

        report.link = LinkKind::Shared;
        Ok(report)
    }

    fn clean(&self) -> Result<(), PackError> {
        self.remove(&self.layout.libs_dir(&self.work_dir))?;
        for sub in &self.layout.subprojects {
            let dir = self.source_root.join(sub);
            self.remove(&dir.join("mars_libs"))?;
            self.remove(&dir.join("obj"))?;
        }
        Ok(())
    }

    fn write_revision(&self) -> Result<(), PackError> {
        let libs_dir = self.layout.libs_dir(&self.work_dir);
        let tag = self.command.arch().map_or(DEFAULT_TAG, |a| a.as_str());
        if self.dry_run {
            tracing::info!("[dry-run] would write revision file into {}", libs_dir.display());
            return Ok(());
        }
        write_revision_file(&libs_dir, &self.source_root, tag)?;
        Ok(())
    }

    fn build_subprojects(&self, report: &mut BuildReport) -> Result<(), PackError> {
        let runner = self.active_runner();
        for sub in &self.layout.subprojects {
            let dir = self.source_root.join(sub);
            if !dir.join("jni").exists() {
                tracing::debug!("skipping {}: no jni/ directory", sub);
                report.skipped.push(sub.clone());
                continue;
            }
            tracing::info!("  Building {}", sub);
            run_checked(runner, &self.invocation(&dir))?;
            report.built.push(sub.clone());
        }
        Ok(())
    }

    // Reverse build order: on a name clash the earlier subproject's copy lands last.
    fn collect_artifacts(&self, report: &mut BuildReport) -> Result<(), PackError> {
        let libs_dir = self.layout.libs_dir(&self.work_dir);
        let built: Vec<String> = report.built.clone();

        for sub in built.iter().rev() {
            let sub_dir = self.source_root.join(sub);
            for abi in subdirectories(&sub_dir.join("libs"))? {
                let cpu_libs = libs_dir.join(&abi);
                let cpu_symbols = cpu_libs.join(SYMBOLS_DIR);
                self.mkdir(&cpu_libs)?;
                self.mkdir(&cpu_symbols)?;

                let obj_dir = sub_dir.join("obj").join("local").join(&abi);
                let mut libraries = files_with_extension(&sub_dir.join("libs").join(&abi), "so")?;
                libraries.extend(files_with_extension(&obj_dir, "a")?);
                let symbols = files_with_extension(&obj_dir, "so")?;

                for lib in &libraries {
                    let dest = self.copy_into(lib, &cpu_libs)?;
                    push_unique(&mut report.abi_mut(&abi).libraries, dest);
                }
                for lib in &symbols {
                    let dest = self.copy_into(lib, &cpu_symbols)?;
                    push_unique(&mut report.abi_mut(&abi).symbols, dest);
                }
            }
        }
        Ok(())
    }

    fn copy_source_files(&self, report: &mut BuildReport) -> Result<(), PackError> {
        let output = self.output_dir();
        for rule in &self.layout.copy_files {
            let src = self.source_root.join(&rule.from);
            let dest = output.join(&rule.to);
            if let Some(parent) = dest.parent() {
                self.mkdir(parent)?;
            }
            if !src.is_file() {
                tracing::warn!("{} not found, skipping", src.display());
                continue;
            }
            if self.dry_run {
                tracing::info!("[dry-run] would copy {} -> {}", src.display(), dest.display());
            } else {
                copy_file(&src, &dest)?;
            }
            push_unique(&mut report.copied_files, dest);
        }
        Ok(())
    }

    fn invocation(&self, dir: &Path) -> Invocation {
        let mut invocation = self.command.invocation(dir);
        if self.verbose {
            invocation.args.insert(0, "V=1".to_string());
        }
        invocation
    }

    fn active_runner(&self) -> &dyn CommandRunner {
        if self.dry_run {
            &DryRunRunner
        } else {
            match &self.runner {
                Some(runner) => runner.as_ref(),
                None => &SystemRunner,
            }
        }
    }

    fn remove(&self, dir: &Path) -> Result<(), PackError> {
        if self.dry_run {
            if dir.exists() {
                tracing::info!("[dry-run] would remove {}", dir.display());
            }
            return Ok(());
        }
        remove_dir_if_exists(dir)?;
        Ok(())
    }

    fn mkdir(&self, dir: &Path) -> Result<(), PackError> {
        if self.dry_run {
            return Ok(());
        }
        ensure_dir(dir)
    }

    fn copy_into(&self, src: &Path, dest_dir: &Path) -> Result<PathBuf, PackError> {
        if self.dry_run {
            let dest = dest_dir.join(src.file_name().unwrap_or_default());
            tracing::info!("[dry-run] would copy {} -> {}", src.display(), dest.display());
            return Ok(dest);
        }
        copy_into(src, dest_dir)
    }
}

fn push_unique(list: &mut Vec<PathBuf>, path: PathBuf) {
    if !list.contains(&path) {
        list.push(path);
    }
}
