//! Shared helpers for the integration suite.

// Not every helper is used by every test module.
#![allow(dead_code)]

use assert_cmd::Command;
use lygia_resolver::test_utils::ShaderProject;

/// `lygia` binary running inside `project` with an isolated cache.
///
/// `RUST_LOG` and `LYGIA_CACHE_DIR` are cleared so the caller's environment
/// cannot change the outcome.
pub fn lygia(project: &ShaderProject) -> Command {
    let mut cmd = Command::cargo_bin("lygia").unwrap();
    cmd.current_dir(project.root())
        .env_remove("RUST_LOG")
        .env_remove("LYGIA_CACHE_DIR")
        .arg("--cache-dir")
        .arg(project.cache_dir());
    cmd
}

/// Identifier under which the resolver records a project file.
pub fn local_id(project: &ShaderProject, relative: &str) -> String {
    project.path(relative).display().to_string()
}
