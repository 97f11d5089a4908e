//! Builds of the guestbook fixtures under `test-fixtures/kustomize`
//!
//! The base declares a Deployment, a Service, a generated ConfigMap and a
//! var. The staging and production overlays layer prefixes, namespaces,
//! labels, patches and generators on top.

use kust_core::{Build, TransformerConfig, build};
use kust_fs::{FileLoader, RealFileSystem};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/kustomize")
        .join(relative)
}

fn build_fixture(relative: &str) -> Build {
    let root = fixture(relative);
    let loader = FileLoader::new(&root.to_string_lossy(), Arc::new(RealFileSystem::new()))
        .expect("fixture root should load");
    build(Box::new(loader), TransformerConfig::builtin().unwrap()).expect("fixture should build")
}

fn object<'a>(built: &'a Build, kind: &str) -> &'a Value {
    built
        .resources
        .resources()
        .find(|r| r.kind() == kind)
        .unwrap_or_else(|| panic!("no {kind} in build"))
        .object()
}

fn container(deployment: &Value) -> &Value {
    &deployment["spec"]["template"]["spec"]["containers"][0]
}

#[test]
fn base_builds_on_its_own() {
    let built = build_fixture("base");

    let kinds: Vec<&str> = built.resources.resources().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec!["Deployment", "Service", "ConfigMap"]);

    let deployment = object(&built, "Deployment");
    assert_eq!(deployment["spec"]["selector"]["matchLabels"], json!({"app": "guestbook"}));
    assert_eq!(container(deployment)["env"][0]["value"], "guestbook");
    assert!(built.diagnostics.is_empty());
}

#[test]
fn staging_overlay() {
    let built = build_fixture("overlays/staging");

    let kinds: Vec<&str> = built.resources.resources().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec!["Deployment", "Service", "ConfigMap"]);
    for resource in built.resources.resources() {
        assert_eq!(resource.namespace(), Some("staging"), "{}", resource.id());
    }

    let configmap = object(&built, "ConfigMap");
    assert_eq!(configmap["metadata"]["name"], "staging-app-config-7g88gmb2d5");
    assert_eq!(configmap["data"], json!({"LOG_LEVEL": "debug"}));

    let deployment = object(&built, "Deployment");
    assert_eq!(deployment["metadata"]["name"], "staging-guestbook");
    assert_eq!(deployment["spec"]["replicas"], 2);
    assert_eq!(
        deployment["metadata"]["labels"],
        json!({"app": "guestbook", "env": "staging"})
    );
    assert_eq!(
        container(deployment)["envFrom"][0]["configMapRef"]["name"],
        "staging-app-config-7g88gmb2d5"
    );
    assert_eq!(container(deployment)["env"][0]["value"], "staging-guestbook");

    let service = object(&built, "Service");
    assert_eq!(
        service["spec"]["selector"],
        json!({"app": "guestbook", "env": "staging"})
    );
}

#[test]
fn production_overlay() {
    let built = build_fixture("overlays/production");

    let kinds: Vec<&str> = built.resources.resources().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec!["Deployment", "Service", "ConfigMap", "Secret"]);

    let deployment = object(&built, "Deployment");
    assert_eq!(deployment["metadata"]["name"], "prod-guestbook");
    assert_eq!(deployment["metadata"]["annotations"], json!({"tier": "production"}));
    assert_eq!(deployment["spec"]["replicas"], 3);
    assert_eq!(container(deployment)["image"], "gcr.io/google-samples/gb-frontend:v5");
    assert_eq!(
        container(deployment)["env"],
        json!([
            {"name": "BACKEND_HOST", "value": "prod-guestbook"},
            {"name": "REGION", "value": "eu-west-1"},
        ])
    );

    let secret = object(&built, "Secret");
    let secret_name = secret["metadata"]["name"].as_str().unwrap();
    assert!(secret_name.starts_with("prod-db-credentials-"));
    assert_eq!(secret["data"]["password"], "czNjcmV0");
    assert_eq!(secret["metadata"]["namespace"], "production");
}

#[test]
fn output_is_a_document_stream() {
    let built = build_fixture("overlays/production");
    let yaml = String::from_utf8(built.resources.encode_as_yaml().unwrap()).unwrap();

    assert_eq!(yaml.matches("\n---\n").count(), 3);
    let reparsed = kust_resource::ResMap::from_bytes(yaml.as_bytes()).unwrap();
    assert_eq!(reparsed.len(), 4);
}

#[test]
fn builds_are_deterministic() {
    let first = build_fixture("overlays/staging").resources.encode_as_yaml().unwrap();
    let second = build_fixture("overlays/staging").resources.encode_as_yaml().unwrap();
    assert_eq!(first, second);
}

#[test]
fn copied_tree_builds_the_same() {
    let temp = tempfile::tempdir().unwrap();
    for entry in ["base", "overlays/staging"] {
        let from = fixture(entry);
        let to = temp.path().join(entry);
        std::fs::create_dir_all(&to).unwrap();
        for file in std::fs::read_dir(&from).unwrap() {
            let file = file.unwrap();
            std::fs::copy(file.path(), to.join(file.file_name())).unwrap();
        }
    }

    let loader = FileLoader::new(
        &temp.path().join("overlays/staging").to_string_lossy(),
        Arc::new(RealFileSystem::new()),
    )
    .unwrap();
    let copied = build(Box::new(loader), TransformerConfig::builtin().unwrap()).unwrap();
    assert_eq!(
        copied.resources.encode_as_yaml().unwrap(),
        build_fixture("overlays/staging").resources.encode_as_yaml().unwrap()
    );
}
