//! End-to-end tests for the `tpl` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tpl() -> Command {
    let mut cmd = Command::cargo_bin("tpl").unwrap();
    cmd.env_remove("TPL_EXEC_MAP_FILE").env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

fn scratch() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "values.yaml", "foo: bar\nprice: 2.34\n");
    dir
}

// ============================================================================
// Arguments
// ============================================================================

#[test]
fn requires_a_template() {
    tpl()
        .assert()
        .failure()
        .stderr(predicate::str::contains("TEMPLATES"));
}

#[test]
fn rejects_bad_override() {
    tpl()
        .args(["--value", "novalue", "x.tpl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key=value"));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn renders_to_stdout() {
    let dir = scratch();
    let input = write(dir.path(), "in/hello.txt.tpl", "{{ foo }}-{{ price }}\n");

    tpl()
        .arg("--values")
        .arg(dir.path().join("values.yaml"))
        .arg(&input)
        .assert()
        .success()
        .stdout("bar-2.34\n");
}

#[test]
fn override_wins_over_values_file() {
    let dir = scratch();
    let input = write(dir.path(), "in/hello.txt.tpl", "{{ foo }}\n");

    tpl()
        .arg("--values")
        .arg(dir.path().join("values.yaml"))
        .args(["--value", "foo=baz"])
        .arg(&input)
        .assert()
        .success()
        .stdout("baz\n");
}

#[test]
fn renders_directory_into_output_dir() {
    let dir = scratch();
    write(dir.path(), "in/a.txt.tpl", "a={{ foo }}\n");
    write(dir.path(), "in/sub/b.txt.tmpl", "b={{ foo }}\n");
    let out = format!("{}/", dir.path().join("out").display());

    tpl()
        .arg("--values")
        .arg(dir.path().join("values.yaml"))
        .args(["-o", &out])
        .arg(dir.path().join("in"))
        .assert()
        .success()
        .stdout("");

    assert_eq!(
        fs::read_to_string(dir.path().join("out/in/a.txt")).unwrap(),
        "a=bar\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("out/in/sub/b.txt")).unwrap(),
        "b=bar\n"
    );
}

#[test]
fn missing_key_fails_by_default() {
    let dir = scratch();
    let input = write(dir.path(), "in/test.txt.tpl", "{{ hello }}\n");

    tpl()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#"map has no entry for key "hello""#));
}

#[test]
fn missing_key_is_empty_when_ignoring_errors() {
    let dir = scratch();
    let input = write(dir.path(), "in/test.txt.tpl", "[{{ hello }}]\n");

    tpl()
        .args(["--on-error", "ignore"])
        .arg(&input)
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn missing_values_file_fails() {
    let dir = scratch();
    let input = write(dir.path(), "in/test.txt.tpl", "x\n");

    tpl()
        .arg("--values")
        .arg(dir.path().join("absent.yaml"))
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.yaml"));
}

#[test]
fn preload_is_includable() {
    let dir = scratch();
    let header = write(dir.path(), "shared/header.tpl", "# {{ foo }}\n");
    let input = write(
        dir.path(),
        "in/page.tpl",
        "{% include \"header.tpl\" %}body\n",
    );

    tpl()
        .arg("--values")
        .arg(dir.path().join("values.yaml"))
        .arg("--preload")
        .arg(&header)
        .arg(&input)
        .assert()
        .success()
        .stdout("# bar\nbody\n");
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn exec_is_disabled_without_exec_map() {
    let dir = scratch();
    let input = write(dir.path(), "in/cmd.tpl", "{{ exec(\"date\") }}\n");

    tpl()
        .args(["--on-error", "ignore"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("disabled"));
}

#[cfg(unix)]
#[test]
fn exec_map_from_environment() {
    let dir = scratch();
    let map = write(
        dir.path(),
        "exec-map.yaml",
        "whitelist:\n  - name: echo\n    stdout: true\n",
    );
    let input = write(
        dir.path(),
        "in/cmd.tpl",
        "[{{ exec(\"echo\", \"hi\") | trim }}]\n",
    );

    tpl()
        .env("TPL_EXEC_MAP_FILE", &map)
        .arg(&input)
        .assert()
        .success()
        .stdout("[hi]\n");
}

#[test]
fn invalid_exec_map_fails() {
    let dir = scratch();
    let map = write(
        dir.path(),
        "exec-map.yaml",
        "whitelist:\n  - name: echo\n    stdin: true\n",
    );
    let input = write(dir.path(), "in/cmd.tpl", "x\n");

    tpl()
        .arg("--exec-map-file")
        .arg(&map)
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exec map"));
}

#[test]
fn bundled_extension_is_namespaced() {
    let dir = scratch();
    let input = write(dir.path(), "in/ext.tpl", "{{ path_ext(\"a/b.conf\") }}\n");

    tpl()
        .arg("--extension")
        .arg(format!("path.{}", std::env::consts::DLL_EXTENSION))
        .arg(&input)
        .assert()
        .success()
        .stdout("conf\n");
}

#[test]
fn unknown_extension_fails() {
    let dir = scratch();
    let input = write(dir.path(), "in/ext.tpl", "x\n");

    tpl()
        .arg("--extension")
        .arg(format!("nope.{}", std::env::consts::DLL_EXTENSION))
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}
