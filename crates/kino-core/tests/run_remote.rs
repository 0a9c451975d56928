//! Remote scripts served over HTTP: companion resolution against the script
//! URL, HEAD existence checks, downloads and `.gitignore` assembly.

mod common;

use kino_core::config::KinoConfig;
use kino_core::{KinoError, RunOutcome, RunRequest};
use tempfile::tempdir;

const REMOTE_SCRIPT: &str = r#"
fn main(k) {
    k.copy("LICENSE", "../shared/LICENSE");
    k.copy("logo.bin", "../../assets/logo.bin");
    k.write("README.md", #{ source: "README.tpl", args: #{ title: k.target_name } });
    if k.exists_source("optional.txt") {
        k.copy("optional.txt");
    }
    k.write("has_readme.txt", k.exists_source("README.tpl").to_string());
}
"#;

fn serve() -> String {
    common::file_server::start(vec![
        ("/templates/web/app.kino.rhai", REMOTE_SCRIPT.as_bytes().to_vec()),
        ("/templates/web/README.tpl", b"# {{ title }}".to_vec()),
        ("/templates/shared/LICENSE", b"MIT\n".to_vec()),
        ("/assets/logo.bin", vec![0x89, b'P', b'N', b'G', 0, 1, 2]),
        ("/data/meta.json", b"  {\"v\": 1}\n".to_vec()),
        ("/gitignore/Rust.gitignore", b"/target\n".to_vec()),
    ])
}

fn request(location: String, target: &std::path::Path) -> RunRequest {
    RunRequest {
        location,
        target: target.to_path_buf(),
        overwrite: false,
        script_args: Vec::new(),
    }
}

#[test]
fn remote_script_resolves_companions_against_its_url() {
    let _lock = common::cwd_lock();
    let base = serve();
    let dir = tempdir().unwrap();
    let target = dir.path().join("site");

    let outcome = kino_core::run(
        &request(format!("{}/templates/web/app.kino.rhai", base), &target),
        &KinoConfig::default(),
    )
    .unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    assert_eq!(common::read(&target.join("LICENSE")), "MIT\n");
    assert_eq!(
        std::fs::read(target.join("logo.bin")).unwrap(),
        vec![0x89, b'P', b'N', b'G', 0, 1, 2]
    );
    assert_eq!(common::read(&target.join("README.md")), "# site");
    assert!(!target.join("optional.txt").exists());
    assert_eq!(common::read(&target.join("has_readme.txt")), "true");
}

#[test]
fn companion_paths_cannot_leave_the_host() {
    let _lock = common::cwd_lock();
    let script = r#"fn main(k) { k.copy("x.txt", "../../../x.txt"); }"#;
    let base = common::file_server::start(vec![("/a/b/s.kino.rhai", script.as_bytes().to_vec())]);
    let dir = tempdir().unwrap();

    let err = kino_core::run(
        &request(format!("{}/a/b/s.kino.rhai", base), dir.path()),
        &KinoConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, KinoError::OutsideOrigin(_)));

    let script = r#"fn main(k) { k.copy("x.txt", "/etc/hostname"); }"#;
    let base = common::file_server::start(vec![("/s.kino.rhai", script.as_bytes().to_vec())]);
    let err = kino_core::run(
        &request(format!("{}/s.kino.rhai", base), dir.path()),
        &KinoConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, KinoError::OutsideOrigin(_)));
}

#[test]
fn missing_companion_is_fetch_error() {
    let _lock = common::cwd_lock();
    let script = r#"fn main(k) { k.write("a.txt", "a"); k.copy("nope.txt"); }"#;
    let base = common::file_server::start(vec![("/s.kino.rhai", script.as_bytes().to_vec())]);
    let dir = tempdir().unwrap();

    let err = kino_core::run(
        &request(format!("{}/s.kino.rhai", base), dir.path()),
        &KinoConfig::default(),
    )
    .unwrap_err();
    match err {
        KinoError::Fetch { url, reason } => {
            assert!(url.ends_with("/nope.txt"));
            assert!(reason.contains("404"), "{}", reason);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(dir.path().join("a.txt").is_file());
}

#[test]
fn missing_remote_script_fails_before_target_is_touched() {
    let base = common::file_server::start(vec![]);
    let dir = tempdir().unwrap();
    let target = dir.path().join("never");
    let err = kino_core::run(
        &request(format!("{}/gone.kino.rhai", base), &target),
        &KinoConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, KinoError::Fetch { .. }));
    assert!(!target.exists());
}

#[test]
fn curl_download_and_gitignore() {
    let _lock = common::cwd_lock();
    let base = serve();
    let script = format!(
        r#"
fn main(k) {{
    k.write("meta.json", k.curl("{base}/data/meta.json", #{{ strip: true }}));
    k.wget("assets/logo.bin", "{base}/assets/logo.bin");
    k.write(".gitignore", k.curl_gitignore("Rust", #{{ mac_os: false, vscode: false }}));
}}
"#
    );
    let local = tempdir().unwrap();
    let location = common::write_script(local.path(), "net.kino.rhai", &script);
    let target = local.path().join("out");
    let cfg = KinoConfig {
        gitignore_base_url: format!("{}/gitignore", base),
        ..KinoConfig::default()
    };

    kino_core::run(&request(location, &target), &cfg).unwrap();

    assert_eq!(common::read(&target.join("meta.json")), "{\"v\": 1}");
    assert_eq!(std::fs::read(target.join("assets/logo.bin")).unwrap().len(), 7);
    let gitignore = common::read(&target.join(".gitignore"));
    assert!(gitignore.starts_with("/target\n"));
    assert!(gitignore.contains("### IntelliJ IDEA ###"));
    assert!(!gitignore.contains("### macOS ###"));
    assert!(!gitignore.contains("### VS Code ###"));
}

#[test]
fn download_without_mkdir_needs_parent() {
    let _lock = common::cwd_lock();
    let base = serve();
    let script = format!(
        r#"
fn main(k) {{
    k.download("logo.bin", "{base}/assets/logo.bin", false);
    k.download("missing/logo.bin", "{base}/assets/logo.bin", false);
}}
"#
    );
    let local = tempdir().unwrap();
    let location = common::write_script(local.path(), "dl.kino.rhai", &script);
    let target = local.path().join("out");

    let err = kino_core::run(&request(location, &target), &KinoConfig::default()).unwrap_err();
    assert!(matches!(err, KinoError::Io { .. }), "{:?}", err);
    assert_eq!(std::fs::read(target.join("logo.bin")).unwrap().len(), 7);
    assert!(!target.join("missing").exists());
}
