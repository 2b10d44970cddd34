//! Build automation for Android native SDKs.
//!
//! [`AndroidSdkBuilder`] runs `ndk-build` in each subproject of an
//! [`SdkLayout`](crate::SdkLayout) and packages the output.
//!
//! ## Overview
//!
//! A static build:
//!
//! 1. **Clean** - Remove `mars_libs/` from the output tree, and `mars_libs/` and `obj/` from
//!    every subproject
//! 2. **Stamp** - Write `verinfo.h` with the source revision
//! 3. **Compile** - Run `ndk-build -C <subproject>` for each subproject that has `jni/`
//! 4. **Collect** - Copy `libs/<abi>/*.so` and `obj/local/<abi>/*.a` into `mars_libs/<abi>/`,
//!    and `obj/local/<abi>/*.so` into `mars_libs/<abi>/symbols/`
//! 5. **Sources** - Copy the layout's auxiliary files into the output tree
//!
//! A shared build does all of the above and then runs `ndk-build` once more
//! with the output tree itself as the project.
//!
//! ## Builder Options
//!
//! - **`verbose(bool)`** - Pass `V=1` to ndk-build
//! - **`dry_run(bool)`** - Log commands, removals and copies without performing them
//! - **`work_dir(path)`** - Resolve the layout's output directory against `path`
//! - **`runner(..)`** - Substitute how commands are executed
//!
//! ## Example
//!
//! ```ignore
//! use ndkpack_sdk::builders::AndroidSdkBuilder;
//! use ndkpack_sdk::{Arch, NdkBuildCommand, SdkLayout};
//!
//! let command = NdkBuildCommand::default().with_arch(Some(Arch::Arm64V8a));
//! let builder = AndroidSdkBuilder::new("..", SdkLayout::xlog(), command)
//!     .dry_run(true);
//!
//! let report = builder.build_static()?;
//! println!("built: {:?}", report.built);
//! # Ok::<(), ndkpack_sdk::PackError>(())
//! ```

pub mod android;
pub mod common;

pub use android::AndroidSdkBuilder;
