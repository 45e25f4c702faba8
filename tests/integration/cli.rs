use predicates::prelude::*;

use lygia_resolver::test_utils::ShaderProject;

use crate::common::lygia;

fn project_with_cached_library() -> ShaderProject {
    let project = ShaderProject::new().unwrap();
    project.seed_cache("/math/const.glsl", "#define PI 3.14").unwrap();
    project.write("shaders/common/util.glsl", "float util();").unwrap();
    project
        .write(
            "shaders/main.frag",
            "#include \"lygia/math/const.glsl\"\n#include \"common/util.glsl\"\nvoid main() {}\n",
        )
        .unwrap();
    project
}

#[test]
fn test_flatten_file_to_stdout() {
    let project = project_with_cached_library();

    lygia(&project)
        .args(["flatten", "shaders/main.frag"])
        .assert()
        .success()
        .stdout("#define PI 3.14\nfloat util();\nvoid main() {}\n");
}

#[test]
fn test_flatten_file_to_output() {
    let project = project_with_cached_library();

    lygia(&project)
        .args(["flatten", "shaders/main.frag", "-o", "build/main.frag"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓"));

    assert_eq!(
        project.read("build/main.frag").unwrap(),
        "#define PI 3.14\nfloat util();\nvoid main() {}\n"
    );
}

#[test]
fn test_flatten_directory() {
    let project = project_with_cached_library();

    lygia(&project)
        .args(["flatten", "shaders", "--output", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Flattened 2 shader(s)"));

    assert!(project.path("build/main.frag").is_file());
    assert!(project.path("build/common/util.glsl").is_file());
    assert!(!project.path("build/.lygia-cache").exists());
}

#[test]
fn test_flatten_directory_with_max_parallel() {
    let project = project_with_cached_library();

    lygia(&project)
        .args(["flatten", "shaders", "--output", "build", "--max-parallel", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Flattened 2 shader(s)"));

    lygia(&project)
        .args(["flatten", "shaders", "--output", "build", "--max-parallel", "0"])
        .assert()
        .failure();
}

#[test]
fn test_flatten_directory_without_output_fails() {
    let project = project_with_cached_library();

    lygia(&project)
        .args(["flatten", "shaders"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn test_missing_include_reports_path_and_suggestion() {
    let project = ShaderProject::new().unwrap();
    project.write("main.frag", "#include \"nope/missing.glsl\"\n").unwrap();

    lygia(&project)
        .args(["flatten", "main.frag"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing.glsl"))
        .stderr(predicate::str::contains("suggestion"));
}

#[test]
fn test_cyclic_include_fails() {
    let project = ShaderProject::new().unwrap();
    project.write("a.glsl", "#include \"b.glsl\"").unwrap();
    project.write("b.glsl", "#include \"a.glsl\"").unwrap();

    lygia(&project)
        .args(["flatten", "a.glsl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cyclic include detected"));
}

#[test]
fn test_affected_uses_graph_from_previous_flatten() {
    let project = project_with_cached_library();

    lygia(&project).args(["flatten", "shaders/main.frag"]).assert().success();
    assert!(project.cache_dir().join(".graph.json").is_file());

    lygia(&project)
        .args(["affected", "lygia/math/const.glsl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main.frag"));
}

#[test]
fn test_affected_with_entry_and_json_output() {
    let project = project_with_cached_library();

    lygia(&project)
        .args([
            "affected",
            "shaders/common/util.glsl",
            "--entry",
            "shaders/main.frag",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains("main.frag"));
}

#[test]
fn test_cache_path_info_and_clean() {
    let project = project_with_cached_library();
    let cache_dir = project.cache_dir().display().to_string();

    lygia(&project)
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(cache_dir));

    lygia(&project)
        .args(["cache", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Documents: 1"));

    lygia(&project)
        .args(["cache", "clean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 cached document(s)"));
    assert!(!project.cache_dir().exists());
}

#[test]
fn test_invalid_config_file_fails() {
    let project = ShaderProject::new().unwrap();
    project.write_config("cache_dir = [not toml").unwrap();

    lygia(&project)
        .args(["cache", "path"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_config_file_namespace_is_honored() {
    let project = ShaderProject::new().unwrap();
    project.write_config("namespace = \"shaderlib\"\n").unwrap();
    project.seed_cache("/noise.glsl", "float noise();").unwrap();
    project.write("main.frag", "#include \"shaderlib/noise.glsl\"").unwrap();

    lygia(&project)
        .args(["flatten", "main.frag"])
        .assert()
        .success()
        .stdout("float noise();");
}
