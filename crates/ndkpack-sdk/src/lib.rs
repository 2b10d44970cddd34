//! Android native SDK packaging for Rust
//!
//! `ndkpack-sdk` drives `ndk-build` across a fixed list of native subprojects
//! and gathers what it produces into one distributable SDK tree: per-ABI
//! static archives and shared objects, unstripped symbols, a `verinfo.h`
//! revision stamp, and a handful of auxiliary sources.
//!
//! # Quick Start
//!
//! ```ignore
//! use ndkpack_sdk::builders::AndroidSdkBuilder;
//! use ndkpack_sdk::{NdkBuildCommand, SdkLayout};
//!
//! fn main() -> Result<(), ndkpack_sdk::PackError> {
//!     let builder = AndroidSdkBuilder::new("..", SdkLayout::mars(), NdkBuildCommand::default());
//!     let report = builder.build_static()?;
//!     for abi in &report.artifacts {
//!         println!("{}: {} libraries", abi.abi, abi.libraries.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Command**: [`NdkBuildCommand`] is the ndk-build template, passed by value;
//!   [`CommandRunner`] executes it
//! - **Layout**: [`SdkLayout`] names the subprojects and auxiliary files of one SDK flavour
//! - **Builders**: [`builders::AndroidSdkBuilder`] cleans, builds, collects and copies
//! - **Revision**: [`revision`] writes the `verinfo.h` stamp
//! - **Env**: [`env::check_env`] locates ndk-build before a build starts

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod builders;
pub mod command;
pub mod env;
pub mod layout;
pub mod revision;
pub mod types;

pub use command::{CommandRunner, Invocation, NdkBuildCommand, SystemRunner};
pub use layout::{CopyRule, SdkLayout};
pub use types::{AbiArtifacts, Arch, BuildReport, LinkKind, PackError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
