use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const WEBSERVER: &str = "\
# FROM

- image: fedora:39

# RUN

- command: dnf install -y httpd && dnf clean all

# EXPOSE

- port: 80

# CMD

- command: /usr/sbin/httpd -D FOREGROUND
";

fn cfb() -> Command {
    let mut cmd = Command::cargo_bin("cfb").expect("cfb binary");
    cmd.env_remove("RUST_LOG").arg("--no-color");
    cmd
}

fn write_canvas(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).expect("write canvas");
    path
}

fn golden_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("golden")
}

#[test]
fn render_prints_build_file() {
    let dir = TempDir::new().unwrap();
    let canvas = write_canvas(&dir, "web.md", WEBSERVER);

    cfb()
        .arg("render")
        .arg(&canvas)
        .assert()
        .success()
        .stdout(
            "FROM fedora:39\n\
             RUN dnf install -y httpd && dnf clean all\n\
             EXPOSE 80\n\
             CMD [\"/usr/sbin/httpd\",\"-D\",\"FOREGROUND\"]\n",
        );
}

#[test]
fn bare_file_argument_renders() {
    let dir = TempDir::new().unwrap();
    let canvas = write_canvas(&dir, "web.md", WEBSERVER);

    cfb()
        .arg(&canvas)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("FROM fedora:39\n"));
}

#[test]
fn render_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let canvas = write_canvas(&dir, "web.md", WEBSERVER);
    let output = dir.path().join("Containerfile");

    cfb()
        .arg("render")
        .arg(&canvas)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout("");

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("FROM fedora:39\n"));
    assert!(written.ends_with("FOREGROUND\"]\n"));
}

#[test]
fn render_reports_parse_errors() {
    let dir = TempDir::new().unwrap();
    let canvas = write_canvas(&dir, "bad.md", "# FROM\n\n# HEALTHCHECK\n");

    cfb()
        .arg("render")
        .arg(&canvas)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("unknown instruction `HEALTHCHECK`"));
}

#[test]
fn render_missing_file_fails() {
    cfb()
        .args(["render", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read 'does-not-exist.md'"));
}

#[test]
fn check_passes_with_warnings() {
    let dir = TempDir::new().unwrap();
    let source = format!("{WEBSERVER}\n# CMD\n\n- command: sleep 1\n");
    let canvas = write_canvas(&dir, "web.md", &source);

    cfb()
        .arg("check")
        .arg(&canvas)
        .assert()
        .success()
        .stderr(predicate::str::contains("single-effective-startup-command"))
        .stderr(predicate::str::contains("0 error(s), 1 warning(s)"));

    cfb()
        .arg("check")
        .arg("--deny-warnings")
        .arg(&canvas)
        .assert()
        .failure();
}

#[test]
fn check_clean_canvas() {
    let dir = TempDir::new().unwrap();
    let canvas = write_canvas(&dir, "web.md", WEBSERVER);

    cfb()
        .args(["check", "--deny-warnings"])
        .arg(&canvas)
        .assert()
        .success()
        .stderr(predicate::str::contains("has no problems"));
}

#[test]
fn check_fails_on_errors() {
    let dir = TempDir::new().unwrap();
    let canvas = write_canvas(&dir, "port.md", "# EXPOSE\n\n- port: 99999\n");

    cfb()
        .arg("check")
        .arg(&canvas)
        .assert()
        .failure()
        .stderr(predicate::str::contains("require-base-kind"))
        .stderr(predicate::str::contains("valid-expose-port"))
        .stderr(predicate::str::contains("port.md:1:1"))
        .stderr(predicate::str::contains("- port: 99999"))
        .stderr(predicate::str::contains("2 error(s), 1 warning(s)"));
}

#[test]
fn kinds_lists_one_category() {
    cfb()
        .args(["kinds", "--category", "exec"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[exec]"))
        .stdout(predicate::str::contains("ENTRYPOINT"))
        .stdout(predicate::str::contains("FROM").not());
}

#[test]
fn kinds_rejects_unknown_category() {
    cfb()
        .args(["kinds", "--category", "network"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category `network`"));
}

#[test]
fn sample_list_and_render() {
    cfb()
        .arg("sample")
        .assert()
        .success()
        .stdout(predicate::str::contains("webserver"))
        .stdout(predicate::str::contains("breakout"))
        .stdout(predicate::str::contains("multistage"));

    cfb()
        .args(["sample", "breakout", "--render"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CMD [\"nginx\",\"-g\",\"daemon off;\"]\n"));

    cfb()
        .args(["sample", "multistage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- asName: builder"));
}

#[test]
fn unknown_sample_fails() {
    cfb()
        .args(["sample", "wordpress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown sample 'wordpress'"));
}

#[test]
fn runtime_choice_is_persisted() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("nested").join("settings.toml");

    cfb()
        .arg("--config")
        .arg(&settings)
        .arg("runtime")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("runtime: Podman\n"));
    assert!(!settings.exists());

    cfb()
        .arg("--config")
        .arg(&settings)
        .args(["runtime", "docker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker build -t my-container"));
    assert!(fs::read_to_string(&settings).unwrap().contains("runtime = \"docker\""));

    cfb()
        .arg("--config")
        .arg(&settings)
        .args(["runtime", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("runtime: Podman\n"));
}

#[test]
fn advice_follows_runtime() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");

    cfb()
        .arg("--config")
        .arg(&settings)
        .args(["advice", "expose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rootless mode"));

    fs::write(&settings, "runtime = \"docker\"\n").unwrap();
    cfb()
        .arg("--config")
        .arg(&settings)
        .args(["advice", "EXPOSE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker run -p"));

    cfb()
        .arg("--config")
        .arg(&settings)
        .args(["advice", "RUN"])
        .assert()
        .success()
        .stdout("no Docker-specific advice for RUN\n");
}

#[test]
fn invalid_settings_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");
    fs::write(&settings, "runtime = \"lxc\"\n").unwrap();

    cfb()
        .arg("--config")
        .arg(&settings)
        .arg("runtime")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid settings"));
}

#[test]
fn golden_files_pass() {
    cfb()
        .arg("test")
        .arg(golden_dir())
        .assert()
        .success()
        .stderr(predicate::str::contains("0 failed"));
}

#[test]
fn golden_category_filter() {
    cfb()
        .arg("test")
        .arg(golden_dir())
        .args(["--category", "parse"])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 passed, 0 failed"));
}

#[test]
fn failing_golden_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let case = dir.path().join("wrong.test.md");
    fs::write(
        &case,
        "---\nexpect_valid = true\n---\n\n# EXPOSE\n\n- port: 80\n",
    )
    .unwrap();

    cfb()
        .arg("test")
        .arg(&case)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected valid = true, got false"));
}
