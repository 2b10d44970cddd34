//! End-to-end builder runs against a scripted ndk-build.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ndkpack_sdk::builders::AndroidSdkBuilder;
use ndkpack_sdk::{
    Arch, CommandRunner, CopyRule, Invocation, LinkKind, NdkBuildCommand, PackError, SdkLayout,
};
use tempfile::TempDir;

/// Stands in for ndk-build: records every call, fabricates the artifacts a
/// real build would leave behind, and returns a configurable exit code.
#[derive(Clone, Default)]
struct ScriptedNdk {
    calls: Rc<RefCell<Vec<Invocation>>>,
    exit_codes: Rc<HashMap<String, i32>>,
    abis: Vec<&'static str>,
}

impl ScriptedNdk {
    fn new(abis: &[&'static str]) -> Self {
        Self {
            abis: abis.to_vec(),
            ..Default::default()
        }
    }

    fn failing(mut self, dir_suffix: &str, code: i32) -> Self {
        let mut codes = HashMap::new();
        codes.insert(dir_suffix.to_string(), code);
        self.exit_codes = Rc::new(codes);
        self
    }

    fn directories(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| c.directory().map(str::to_string))
            .collect()
    }
}

impl CommandRunner for ScriptedNdk {
    fn run(&self, invocation: &Invocation) -> Result<i32, PackError> {
        self.calls.borrow_mut().push(invocation.clone());
        let dir = PathBuf::from(invocation.directory().unwrap_or("."));
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(code) = self.exit_codes.get(&name) {
            return Ok(*code);
        }

        for abi in &self.abis {
            let libs = dir.join("libs").join(abi);
            let obj = dir.join("obj").join("local").join(abi);
            fs::create_dir_all(&libs).unwrap();
            fs::create_dir_all(&obj).unwrap();
            fs::write(libs.join(format!("lib{name}.so")), format!("stripped {name}")).unwrap();
            fs::write(obj.join(format!("lib{name}.a")), format!("archive {name}")).unwrap();
            fs::write(obj.join(format!("lib{name}.so")), format!("symbols {name}")).unwrap();
        }
        Ok(0)
    }
}

struct Workspace {
    _tmp: TempDir,
    source_root: PathBuf,
    work_dir: PathBuf,
}

fn workspace(with_jni: &[&str]) -> Workspace {
    let tmp = TempDir::new().unwrap();
    let source_root = tmp.path().join("mars");
    let work_dir = source_root.join("libraries");
    fs::create_dir_all(&work_dir).unwrap();
    for sub in with_jni {
        fs::create_dir_all(source_root.join(sub).join("jni")).unwrap();
    }
    Workspace {
        _tmp: tmp,
        source_root,
        work_dir,
    }
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn builder(ws: &Workspace, layout: SdkLayout, ndk: &ScriptedNdk) -> AndroidSdkBuilder {
    AndroidSdkBuilder::new(&ws.source_root, layout, NdkBuildCommand::default())
        .work_dir(&ws.work_dir)
        .runner(Box::new(ndk.clone()))
}

#[test]
fn static_build_collects_libraries_and_symbols() {
    let ws = workspace(&["openssl", "comm", "log"]);
    let ndk = ScriptedNdk::new(&["arm64-v8a", "x86"]);

    let report = builder(&ws, SdkLayout::xlog(), &ndk).build_static().unwrap();

    assert_eq!(report.link, LinkKind::Static);
    assert_eq!(report.built, ["openssl", "comm", "log"]);
    assert!(report.skipped.is_empty());

    let libs = ws.work_dir.join("mars_xlog_sdk/mars_libs");
    for abi in ["arm64-v8a", "x86"] {
        for name in ["openssl", "comm", "log"] {
            assert!(libs.join(abi).join(format!("lib{name}.so")).is_file());
            assert!(libs.join(abi).join(format!("lib{name}.a")).is_file());
            let symbol = libs.join(abi).join("symbols").join(format!("lib{name}.so"));
            assert_eq!(fs::read_to_string(symbol).unwrap(), format!("symbols {name}"));
        }
    }
    // The stripped copy in the ABI directory comes from libs/, not obj/local/.
    assert_eq!(
        fs::read_to_string(libs.join("x86/libcomm.so")).unwrap(),
        "stripped comm"
    );
    assert!(libs.join("verinfo.h").is_file());

    let abis: Vec<&str> = report.artifacts.iter().map(|a| a.abi.as_str()).collect();
    assert_eq!(abis, ["arm64-v8a", "x86"]);
    assert_eq!(report.artifacts[0].libraries.len(), 6);
    assert_eq!(report.artifacts[0].symbols.len(), 3);
}

#[test]
fn subprojects_without_jni_are_skipped() {
    let ws = workspace(&["comm", "log"]);
    let ndk = ScriptedNdk::new(&["x86"]);

    let report = builder(&ws, SdkLayout::xlog(), &ndk).build_static().unwrap();

    assert_eq!(report.built, ["comm", "log"]);
    assert_eq!(report.skipped, ["openssl"]);
    let dirs = ndk.directories();
    assert_eq!(dirs.len(), 2);
    assert!(dirs[0].ends_with("comm"));
    assert!(dirs[1].ends_with("log"));
}

#[test]
fn nonzero_exit_aborts_before_later_subprojects() {
    let ws = workspace(&["openssl", "comm", "log"]);
    let ndk = ScriptedNdk::new(&["x86"]).failing("comm", 2);

    let err = builder(&ws, SdkLayout::xlog(), &ndk)
        .build_static()
        .unwrap_err();

    assert_eq!(err.exit_code(), Some(2));
    assert_eq!(ndk.directories().len(), 2, "log must not be built after comm fails");
    // Nothing is collected after a failed build.
    assert!(!ws.work_dir.join("mars_xlog_sdk/mars_libs/x86").exists());
}

#[test]
fn earlier_subproject_wins_name_clashes() {
    let ws = workspace(&["openssl", "comm"]);
    let ndk = ScriptedNdk::new(&[]);
    let layout = SdkLayout {
        name: "clash".into(),
        subprojects: vec!["openssl".into(), "comm".into()],
        copy_files: vec![],
        output_dir: PathBuf::from("out"),
    };
    for (sub, body) in [("openssl", "from openssl"), ("comm", "from comm")] {
        write(&ws.source_root.join(sub).join("libs/x86/libshared.so"), body);
    }

    builder(&ws, layout, &ndk).build_static().unwrap();

    let copied = ws.work_dir.join("out/mars_libs/x86/libshared.so");
    assert_eq!(fs::read_to_string(copied).unwrap(), "from openssl");
}

#[test]
fn files_in_libs_are_not_treated_as_abis() {
    let ws = workspace(&["comm"]);
    let ndk = ScriptedNdk::new(&["x86"]);
    let layout = SdkLayout {
        name: "one".into(),
        subprojects: vec!["comm".into()],
        copy_files: vec![],
        output_dir: PathBuf::from("out"),
    };
    write(&ws.source_root.join("comm/libs/NOTICE"), "text");

    let report = builder(&ws, layout, &ndk).build_static().unwrap();

    assert_eq!(report.artifacts.len(), 1);
    assert!(!ws.work_dir.join("out/mars_libs/NOTICE").exists());
}

#[test]
fn copy_rules_create_directories_and_skip_missing_sources() {
    let ws = workspace(&[]);
    let ndk = ScriptedNdk::new(&[]);
    write(&ws.source_root.join("log/crypt/log_crypt.h"), "// header");

    let report = builder(&ws, SdkLayout::xlog(), &ndk).build_static().unwrap();

    let out = ws.work_dir.join("mars_xlog_sdk");
    assert_eq!(
        fs::read_to_string(out.join("jni/log_crypt.h")).unwrap(),
        "// header"
    );
    assert!(out.join("jni").is_dir());
    assert!(!out.join("jni/JNI_OnLoad.cc").exists());
    assert_eq!(report.copied_files, [out.join("jni/log_crypt.h")]);
}

#[test]
fn later_copy_rules_overwrite_earlier_ones() {
    let ws = workspace(&[]);
    let ndk = ScriptedNdk::new(&[]);
    write(&ws.source_root.join("a.txt"), "first");
    write(&ws.source_root.join("b.txt"), "second");
    let layout = SdkLayout {
        name: "rules".into(),
        subprojects: vec![],
        copy_files: vec![
            CopyRule::new("a.txt", "jni/same.txt"),
            CopyRule::new("b.txt", "jni/same.txt"),
        ],
        output_dir: PathBuf::from("out"),
    };

    builder(&ws, layout, &ndk).build_static().unwrap();

    let dest = ws.work_dir.join("out/jni/same.txt");
    assert_eq!(fs::read_to_string(dest).unwrap(), "second");
}

#[test]
fn clean_removes_previous_output() {
    let ws = workspace(&["comm"]);
    let ndk = ScriptedNdk::new(&[]);
    let stale_lib = ws.work_dir.join("mars_xlog_sdk/mars_libs/mips/libold.so");
    let stale_obj = ws.source_root.join("comm/obj/local/mips/libold.a");
    let stale_sub_libs = ws.source_root.join("log/mars_libs/keep.txt");
    write(&stale_lib, "old");
    write(&stale_obj, "old");
    write(&stale_sub_libs, "old");

    builder(&ws, SdkLayout::xlog(), &ndk).build_static().unwrap();

    assert!(!stale_lib.exists());
    assert!(!stale_obj.exists());
    assert!(!stale_sub_libs.exists());
}

#[test]
fn shared_build_runs_ndk_build_over_the_output_tree() {
    let ws = workspace(&["comm"]);
    let ndk = ScriptedNdk::new(&["x86"]);
    write(&ws.work_dir.join("mars_xlog_sdk/obj/local/x86/stale.o"), "");

    let report = builder(&ws, SdkLayout::xlog(), &ndk).build_shared().unwrap();

    assert_eq!(report.link, LinkKind::Shared);
    let dirs = ndk.directories();
    assert_eq!(dirs.len(), 2);
    assert!(dirs[1].ends_with("mars_xlog_sdk"));
    assert!(!ws.work_dir.join("mars_xlog_sdk/obj/local/x86/stale.o").exists());
}

#[test]
fn shared_link_failure_reports_exit_code() {
    let ws = workspace(&["comm"]);
    let ndk = ScriptedNdk::new(&["x86"]).failing("mars_xlog_sdk", 7);

    let err = builder(&ws, SdkLayout::xlog(), &ndk)
        .build_shared()
        .unwrap_err();

    assert_eq!(err.exit_code(), Some(7));
    // The static part completed before the link step failed.
    assert!(ws.work_dir.join("mars_xlog_sdk/mars_libs/x86/libcomm.a").is_file());
}

#[test]
fn arch_override_reaches_every_invocation_and_the_revision_tag() {
    let ws = workspace(&["openssl", "comm"]);
    let ndk = ScriptedNdk::new(&["arm64-v8a"]);
    let command = NdkBuildCommand::default().with_arch(Some(Arch::Arm64V8a));

    let report = AndroidSdkBuilder::new(&ws.source_root, SdkLayout::xlog(), command)
        .work_dir(&ws.work_dir)
        .runner(Box::new(ndk.clone()))
        .build_shared()
        .unwrap();

    assert_eq!(report.arch, Some(Arch::Arm64V8a));
    for call in ndk.calls.borrow().iter() {
        assert_eq!(call.args[0], "_ARCH_=arm64-v8a");
    }
    let verinfo =
        fs::read_to_string(ws.work_dir.join("mars_xlog_sdk/mars_libs/verinfo.h")).unwrap();
    assert!(verinfo.contains("#define MARS_TAG \"arm64-v8a\""));
}

#[test]
fn dry_run_touches_nothing() {
    let ws = workspace(&["comm"]);
    let ndk = ScriptedNdk::new(&["x86"]);
    let stale = ws.source_root.join("comm/obj/local/x86/libold.a");
    write(&stale, "old");
    write(&ws.source_root.join("comm/libs/x86/libold.so"), "old");
    write(&ws.source_root.join("log/crypt/log_crypt.h"), "// header");

    let report = builder(&ws, SdkLayout::xlog(), &ndk)
        .dry_run(true)
        .build_shared()
        .unwrap();

    assert!(ndk.calls.borrow().is_empty(), "dry run must not invoke the runner");
    assert!(stale.exists());
    assert!(!ws.work_dir.join("mars_xlog_sdk").exists());
    assert_eq!(report.built, ["comm"]);
    assert!(report.artifacts.is_empty(), "leftover libs must not be reported");
}
