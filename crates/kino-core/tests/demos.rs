//! The bundled demo scripts compile and run offline.

mod common;

use kino_core::config::KinoConfig;
use kino_core::script::check_script;
use kino_core::{RunOutcome, RunRequest};
use tempfile::tempdir;

const SPRINGBOOT_WEB: &str = include_str!("../../../demos/springboot_web.kino.rhai");

#[test]
fn springboot_web_compiles() {
    check_script(SPRINGBOOT_WEB, "springboot_web.kino.rhai").unwrap();
}

#[test]
fn springboot_web_generates_package_layout() {
    let _lock = common::cwd_lock();
    let dir = tempdir().unwrap();
    let location = common::write_script(dir.path(), "springboot_web.kino.rhai", SPRINGBOOT_WEB);
    let target = dir.path().join("hello-web");
    let req = RunRequest {
        location,
        target: target.clone(),
        overwrite: false,
        script_args: ["--group", "com.acme", "--artifact", "hello", "--no-gitignore"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    assert_eq!(kino_core::run(&req, &KinoConfig::default()).unwrap(), RunOutcome::Completed);

    assert_eq!(common::read(&target.join("README.md")), "# hello-web");
    assert!(common::read(&target.join("build.gradle")).contains("group = 'com.acme'"));
    let app = common::read(&target.join("src/main/java/com/acme/hello/App.java"));
    assert!(app.contains("package com.acme.hello;"));
    for sub in ["service", "repository", "util"] {
        assert!(target.join("src/main/java/com/acme/hello").join(sub).is_dir());
    }
    assert!(!target.join(".gitignore").exists());
}
