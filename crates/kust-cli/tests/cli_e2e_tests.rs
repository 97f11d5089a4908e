//! CLI end-to-end tests that invoke the compiled `kust` binary.

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get a Command for the kust binary
fn kust_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("kust"))
}

const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      containers:
      - name: web
        image: nginx:1.24
        envFrom:
        - configMapRef:
            name: cfg
"#;

/// base/ with one Deployment, overlay/ adding a prefix and a generated ConfigMap.
fn overlay_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("base/kustomization.yaml")
        .write_str("resources:\n- deployment.yaml\n")
        .unwrap();
    temp.child("base/deployment.yaml").write_str(DEPLOYMENT).unwrap();
    temp.child("overlay/kustomization.yaml")
        .write_str(
            "bases:\n- ../base\nnamePrefix: prod-\nconfigMapGenerator:\n- name: cfg\n  literals:\n  - mode=prod\n",
        )
        .unwrap();
    temp
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    kust_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"));
}

#[test]
fn test_version_output() {
    kust_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kust"));
}

// ============================================================================
// Build Tests
// ============================================================================

#[test]
fn test_build_prints_resolved_resources() {
    let temp = overlay_tree();
    kust_cmd()
        .current_dir(temp.path())
        .args(["build", "overlay"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: prod-web"))
        .stdout(predicate::str::is_match(r"name: prod-cfg-[a-z0-9]{10}\n").unwrap())
        .stdout(predicate::str::contains("\n---\n"));
}

#[test]
fn test_build_defaults_to_current_directory() {
    let temp = overlay_tree();
    kust_cmd()
        .current_dir(temp.child("base").path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("name: web"));
}

#[test]
fn test_build_writes_output_file() {
    let temp = overlay_tree();
    kust_cmd()
        .current_dir(temp.path())
        .args(["build", "overlay", "-o", "out/all.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    temp.child("out/all.yaml")
        .assert(predicate::str::contains("name: prod-web"));
}

#[test]
fn test_build_rejects_several_paths() {
    let temp = overlay_tree();
    kust_cmd()
        .current_dir(temp.path())
        .args(["build", "base", "overlay"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("specify one path to kustomization.yaml"));
}

#[test]
fn test_build_missing_manifest_fails() {
    let temp = TempDir::new().unwrap();
    temp.child("empty").create_dir_all().unwrap();
    kust_cmd()
        .current_dir(temp.path())
        .args(["build", "empty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("No kustomization file"));
}

#[test]
fn test_failed_build_leaves_no_output_file() {
    let temp = TempDir::new().unwrap();
    temp.child("app/kustomization.yaml")
        .write_str("resources:\n- missing.yaml\n")
        .unwrap();
    kust_cmd()
        .current_dir(temp.path())
        .args(["build", "app", "--output", "out.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("resource 'missing.yaml'"));

    temp.child("out.yaml").assert(predicate::path::missing());
}

#[test]
fn test_unresolved_var_is_a_warning() {
    let temp = TempDir::new().unwrap();
    temp.child("app/kustomization.yaml")
        .write_str(
            "resources:\n- deployment.yaml\nvars:\n- name: DB\n  objref:\n    apiVersion: v1\n    kind: Service\n    name: db\n",
        )
        .unwrap();
    temp.child("app/deployment.yaml").write_str(DEPLOYMENT).unwrap();
    kust_cmd()
        .current_dir(temp.path())
        .args(["build", "app"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning"))
        .stderr(predicate::str::contains("unresolved var"));
}

#[test]
fn test_custom_transformer_config_replaces_builtin_rules() {
    let temp = overlay_tree();
    temp.child("configs/prefix.yaml")
        .write_str("namePrefix:\n- path: metadata/name\n  kind: ConfigMap\n")
        .unwrap();
    kust_cmd()
        .current_dir(temp.path())
        .args(["build", "overlay", "-t", "configs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: web\n"))
        .stdout(predicate::str::is_match(r"name: prod-cfg-[a-z0-9]{10}\n").unwrap());
}

#[test]
fn test_missing_transformer_config_file_fails() {
    let temp = overlay_tree();
    kust_cmd()
        .current_dir(temp.path())
        .args(["build", "overlay", "-t", "a.yaml,b.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a.yaml"));
}
