//! # ndkpack
//!
//! Command-line helper that builds the native Android subprojects of a mars
//! source tree with `ndk-build` and assembles the SDK output directories.
//!
//! ## Quick Start
//!
//! Run from the `libraries/` directory of the native tree:
//!
//! ```bash
//! # Interactive menu
//! ndkpack
//!
//! # Build mars static libraries
//! ndkpack 1
//!
//! # Build xlog shared libraries for arm64 only
//! ndkpack 4 arm64-v8a
//! ```
//!
//! ## Menu
//!
//! | Choice | Action |
//! |--------|--------|
//! | `1` | Build mars static libs into `mars_android_sdk/` |
//! | `2` | Build mars shared libs |
//! | `3` | Build xlog static libs into `mars_xlog_sdk/` |
//! | `4` | Build xlog shared libs |
//! | `5` | Exit |
//!
//! The optional second argument pins the build to one architecture:
//! `x86`, `x86_64`, `armeabi`, `arm64-v8a`, `armeabi-v7a`, `mips` or `mips64`.
//!
//! ## Output Directory
//!
//! ```text
//! mars_android_sdk/
//! ├── mars_libs/
//! │   ├── verinfo.h
//! │   └── <abi>/{*.so,*.a,symbols/*.so}
//! └── jni/
//! ```
//!
//! ## Exit Status
//!
//! `0` on success. When ndk-build fails its exit code is passed through;
//! every other failure exits with `255`.
//!
//! ## Modules
//!
//! - [`config`] - Configuration file support for `ndkpack.toml`

#![cfg_attr(docsrs, feature(doc_cfg))]

use anyhow::{Context, Result};
use clap::Parser;
use ndkpack_sdk::builders::AndroidSdkBuilder;
use ndkpack_sdk::{Arch, BuildReport, LinkKind, PackError};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub mod config;
mod logging;

/// Exit status for failures that carry no usable exit code of their own.
pub const FAILURE_EXIT_CODE: u8 = 255;

/// Builds native Android subprojects with ndk-build and packages the SDK.
#[derive(Parser, Debug)]
#[command(
    name = "ndkpack",
    author,
    version,
    about = "Android NDK SDK build helper",
    long_about = None
)]
struct Cli {
    /// Menu choice: 1 mars static, 2 mars shared, 3 xlog static, 4 xlog shared, 5 exit
    menu: Option<String>,

    /// Restrict the build to one CPU architecture (only read with a valid menu choice)
    arch: Option<String>,

    #[arg(
        long,
        help = "Path to an ndkpack.toml (default: search upward from the current directory)"
    )]
    config: Option<PathBuf>,

    #[arg(long, help = "Directory containing the native subprojects (default: ..)")]
    source_root: Option<PathBuf>,

    #[arg(long, help = "ndk-build program to run (default: ndk-build on PATH)")]
    ndk_build: Option<PathBuf>,

    #[arg(long, help = "Write a JSON build report to this path")]
    report: Option<PathBuf>,

    /// Print what would be done without running ndk-build or touching files
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging, and V=1 for ndk-build
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Which SDK a menu choice builds.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Flavor {
    Mars,
    Xlog,
}

/// One of the five menu actions.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MenuChoice {
    MarsStatic,
    MarsShared,
    XlogStatic,
    XlogShared,
    Exit,
}

impl MenuChoice {
    pub const PROMPT: &'static str = "Enter menu:\n\
        1. build mars static libs.\n\
        2. build mars shared libs.\n\
        3. build xlog static libs.\n\
        4. build xlog shared libs.\n\
        5. exit.\n";

    /// Parses a menu entry. Only a single character `1` to `5` is accepted.
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "1" => Some(MenuChoice::MarsStatic),
            "2" => Some(MenuChoice::MarsShared),
            "3" => Some(MenuChoice::XlogStatic),
            "4" => Some(MenuChoice::XlogShared),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }

    /// What to build, or `None` for [`MenuChoice::Exit`].
    pub fn build_target(self) -> Option<(Flavor, LinkKind)> {
        match self {
            MenuChoice::MarsStatic => Some((Flavor::Mars, LinkKind::Static)),
            MenuChoice::MarsShared => Some((Flavor::Mars, LinkKind::Shared)),
            MenuChoice::XlogStatic => Some((Flavor::Xlog, LinkKind::Static)),
            MenuChoice::XlogShared => Some((Flavor::Xlog, LinkKind::Shared)),
            MenuChoice::Exit => None,
        }
    }
}

/// Shows the menu until a valid choice is entered.
///
/// End of input counts as [`MenuChoice::Exit`].
pub fn prompt_menu<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<MenuChoice> {
    loop {
        output
            .write_all(MenuChoice::PROMPT.as_bytes())
            .and_then(|()| output.flush())
            .context("writing menu prompt")?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("reading menu choice")?;
        if read == 0 {
            return Ok(MenuChoice::Exit);
        }
        if let Some(choice) = MenuChoice::parse(line.trim()) {
            return Ok(choice);
        }
    }
}

/// Interprets the optional architecture argument.
///
/// Anything that is not a known ABI name is ignored with a warning.
pub fn resolve_arch(arg: Option<&str>) -> Option<Arch> {
    let raw = arg?;
    match raw.parse::<Arch>() {
        Ok(arch) => Some(arch),
        Err(err) => {
            tracing::warn!("ignoring architecture argument: {}", err);
            None
        }
    }
}

/// Maps a failed run to the process exit status.
///
/// An ndk-build failure passes its own exit code through when it fits in
/// `1..=255`; everything else is [`FAILURE_EXIT_CODE`].
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<PackError>())
        .and_then(PackError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(FAILURE_EXIT_CODE)
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);

    let (choice, arch) = match cli.menu.as_deref().and_then(MenuChoice::parse) {
        Some(choice) => (choice, resolve_arch(cli.arch.as_deref())),
        None => {
            let stdin = io::stdin();
            (prompt_menu(stdin.lock(), io::stdout())?, None)
        }
    };

    let Some((flavor, link)) = choice.build_target() else {
        return Ok(());
    };

    let resolver = config::ConfigResolver::load(cli.config.as_deref())?;
    if let Some(path) = &resolver.config_path {
        tracing::info!("Using config file: {:?}", path);
    }

    let command = resolver.ndk_command(cli.ndk_build.clone()).with_arch(arch);
    if arch.is_some() {
        println!("{}", command);
    }
    let command = if cli.dry_run {
        command
    } else {
        let program = ndkpack_sdk::env::check_env(command.program())?;
        command.with_program(program)
    };

    let layout = resolver.layout(flavor);
    let source_root = resolver.source_root(cli.source_root.clone());
    tracing::info!(
        "Building {} {} libs from {:?}",
        layout.name,
        link.as_str(),
        source_root
    );

    let builder = AndroidSdkBuilder::new(source_root, layout, command)
        .verbose(cli.verbose)
        .dry_run(cli.dry_run);

    let report = build(&builder, link)?;
    println!("build succeed!");

    if let Some(path) = &cli.report {
        write_report(path, &report)?;
    }
    Ok(())
}

fn build(builder: &AndroidSdkBuilder, link: LinkKind) -> Result<BuildReport> {
    // A static-only build has no outcome line of its own; main reports the error.
    let report = builder.build_static().inspect_err(|_| {
        if link == LinkKind::Shared {
            println!("build static libs fail!!!");
        }
    })?;

    match link {
        LinkKind::Static => Ok(report),
        LinkKind::Shared => Ok(builder
            .link_shared(report)
            .inspect_err(|_| println!("build fail!!!"))?),
    }
}

fn write_report(path: &Path, report: &BuildReport) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating parent directory {:?}", parent))?;
    }
    let json = report.to_json()?;
    fs::write(path, json).with_context(|| format!("writing build report {:?}", path))?;
    tracing::info!("Build report written to {:?}", path);
    Ok(())
}
