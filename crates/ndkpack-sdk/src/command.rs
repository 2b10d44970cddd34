//! The `ndk-build` command line and the seam that executes it.
//!
//! [`NdkBuildCommand`] is a plain value: the architecture override is a field
//! set when the command is constructed and passed to the builder, so two builds
//! with different overrides never share state.
//!
//! [`CommandRunner`] is what actually launches the tool. [`SystemRunner`] spawns
//! a real process; tests substitute their own implementation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::types::{Arch, PackError};

/// Default program name looked up on PATH.
pub const DEFAULT_PROGRAM: &str = "ndk-build";

/// Arguments every build passes, before `-C <dir>`.
pub const DEFAULT_ARGS: [&str; 5] = ["NDK_DEBUG=0", "-j", "-B", "SDK=0", "LIBPREFIX=mars"];

/// Template for an `ndk-build` invocation.
///
/// # Example
///
/// ```
/// use ndkpack_sdk::{Arch, NdkBuildCommand};
///
/// let cmd = NdkBuildCommand::default().with_arch(Some(Arch::X86));
/// assert_eq!(
///     cmd.to_string(),
///     "ndk-build _ARCH_=x86 NDK_DEBUG=0 -j -B SDK=0 LIBPREFIX=mars -C"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdkBuildCommand {
    program: PathBuf,
    args: Vec<String>,
    arch: Option<Arch>,
}

impl Default for NdkBuildCommand {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl NdkBuildCommand {
    /// Creates a command for `program` with the default argument set.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
            arch: None,
        }
    }

    /// Replaces the base argument list.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Pins the build to one architecture, or clears the pin with `None`.
    pub fn with_arch(mut self, arch: Option<Arch>) -> Self {
        self.arch = arch;
        self
    }

    /// Replaces the program, keeping arguments and architecture.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arch(&self) -> Option<Arch> {
        self.arch
    }

    /// Builds the concrete invocation that runs the tool in `dir`.
    pub fn invocation(&self, dir: &Path) -> Invocation {
        let mut args = Vec::with_capacity(self.args.len() + 3);
        if let Some(arch) = self.arch {
            args.push(format!("_ARCH_={}", arch));
        }
        args.extend(self.args.iter().cloned());
        args.push("-C".to_string());
        args.push(dir.display().to_string());
        Invocation {
            program: self.program.clone(),
            args,
        }
    }
}

/// Renders the command prefix, the way it is echoed when an override is applied.
impl fmt::Display for NdkBuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        if let Some(arch) = self.arch {
            write!(f, " _ARCH_={}", arch)?;
        }
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, " -C")
    }
}

/// One concrete command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    /// The directory passed with `-C`, if present.
    pub fn directory(&self) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == "-C")
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Executes invocations and reports their exit codes.
pub trait CommandRunner {
    /// Runs `invocation` to completion.
    ///
    /// Returns the exit code; a process killed by a signal reports `-1`.
    /// Only a failure to launch the process is an `Err`.
    fn run(&self, invocation: &Invocation) -> Result<i32, PackError>;
}

/// Runs commands as child processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<i32, PackError> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| PackError::Spawn {
                program: invocation.program.display().to_string(),
                source,
            })?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Logs invocations without running anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, invocation: &Invocation) -> Result<i32, PackError> {
        tracing::info!("[dry-run] would run: {}", invocation);
        Ok(0)
    }
}

/// Runs `invocation` and turns a nonzero exit into [`PackError::CommandFailed`].
pub fn run_checked(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<(), PackError> {
    tracing::debug!("running: {}", invocation);
    let code = runner.run(invocation)?;
    if code != 0 {
        return Err(PackError::CommandFailed {
            description: invocation.to_string(),
            code: if code == -1 { None } else { Some(code) },
        });
    }
    Ok(())
}
