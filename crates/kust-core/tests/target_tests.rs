//! End-to-end resolution over in-memory kustomization trees

use insta::assert_snapshot;
use kust_core::{Build, DiagnosticKind, Error, Resource, TransformerConfig, build};
use kust_fs::{FileLoader, MemoryFileSystem};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;

const SERVICE_DB: &str = r#"
apiVersion: v1
kind: Service
metadata:
  name: db
spec:
  clusterIP: 10.0.0.5
  selector:
    app: db
"#;

const DEPLOYMENT_WEB: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 1
  template:
    spec:
      containers:
      - name: web
        image: nginx:1.24
        args: ["--db=$(SVC_IP)"]
        envFrom:
        - configMapRef:
            name: cfg
"#;

fn tree(files: &[(&str, &str)]) -> Arc<MemoryFileSystem> {
    let fs = Arc::new(MemoryFileSystem::new());
    for (path, content) in files {
        fs.add_file(*path, *content);
    }
    fs
}

fn build_at(fs: Arc<MemoryFileSystem>, root: &str) -> kust_core::Result<Build> {
    let loader = FileLoader::new(root, fs)?;
    build(Box::new(loader), TransformerConfig::builtin()?)
}

fn find<'a>(built: &'a Build, kind: &str) -> Vec<&'a Resource> {
    built.resources.resources().filter(|r| r.kind() == kind).collect()
}

fn only<'a>(built: &'a Build, kind: &str) -> &'a Value {
    let found = find(built, kind);
    assert_eq!(found.len(), 1, "expected one {kind}");
    found[0].object()
}

#[test]
fn nested_prefixes_apply_innermost_first() {
    let fs = tree(&[
        ("/app/base/kustomization.yaml", "resources: [svc.yaml]\n"),
        ("/app/base/svc.yaml", SERVICE_DB),
        ("/app/mid/kustomization.yaml", "bases: [../base]\nnamePrefix: x-\n"),
        ("/app/top/kustomization.yaml", "bases: [../mid]\nnamePrefix: y-\n"),
    ]);

    let built = build_at(fs, "/app/top").unwrap();
    assert_eq!(only(&built, "Service")["metadata"]["name"], "y-x-db");
}

#[test]
fn overlay_settings_cascade_onto_inherited_resources() {
    let fs = tree(&[
        ("/app/base/kustomization.yaml", "resources: [svc.yaml]\n"),
        ("/app/base/svc.yaml", SERVICE_DB),
        (
            "/app/prod/kustomization.yaml",
            "bases: [../base]\nnamespace: prod\ncommonLabels:\n  env: prod\ncommonAnnotations:\n  owner: team-a\n",
        ),
    ]);

    let built = build_at(fs, "/app/prod").unwrap();
    let service = only(&built, "Service");
    assert_eq!(service["metadata"]["namespace"], "prod");
    assert_eq!(service["metadata"]["labels"], json!({"env": "prod"}));
    assert_eq!(service["metadata"]["annotations"], json!({"owner": "team-a"}));
    assert_eq!(service["spec"]["selector"], json!({"app": "db", "env": "prod"}));
}

#[test]
fn failing_bases_are_reported_together() {
    let fs = tree(&[
        (
            "/app/b2/kustomization.yaml",
            "resources: [dup.yaml]\n",
        ),
        ("/app/b2/dup.yaml", format!("{SERVICE_DB}---{SERVICE_DB}").as_str()),
        ("/app/parent/kustomization.yaml", "bases: [../b1, ../b2]\n"),
    ]);
    fs.mkdir("/app/b1");

    let err = build_at(fs, "/app/parent").unwrap_err();
    let Error::Aggregate(errors) = &err else {
        panic!("expected an aggregated error, got {err}");
    };
    assert_eq!(errors.len(), 2);
    assert_snapshot!(err.to_string(), @r"
    2 errors occurred:
      * base '../b1': No kustomization file (kustomization.yaml, kustomization.yml or Kustomization) found in /app/b1
      * base '../b2': resource 'dup.yaml': Duplicate resource id ~G_v1_Service|db
    ");
}

#[test]
fn loading_errors_stop_before_transformers_run() {
    let fs = tree(&[
        (
            "/app/kustomization.yaml",
            "resources: [missing.yaml, bad.yaml]\npatchesStrategicMerge: [nowhere.yaml]\n",
        ),
        ("/app/bad.yaml", "apiVersion: v1\nkind: Service\n"),
    ]);

    let err = build_at(fs, "/app").unwrap_err();
    let Error::Aggregate(errors) = err else {
        panic!("expected an aggregated error");
    };
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].starts_with("resource 'missing.yaml'"));
    assert!(messages[1].starts_with("resource 'bad.yaml'"));
    assert!(messages[2].starts_with("patch 'nowhere.yaml'"));
}

#[test]
fn generated_configmap_overrides_inherited_one() {
    let fs = tree(&[
        ("/app/base/kustomization.yaml", "resources: [cm.yaml, svc.yaml]\n"),
        (
            "/app/base/cm.yaml",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\ndata:\n  mode: base\n",
        ),
        ("/app/base/svc.yaml", SERVICE_DB),
        (
            "/app/overlay/kustomization.yaml",
            "bases: [../base]\nconfigMapGenerator:\n- name: cfg\n  literals: [mode=overlay]\n",
        ),
    ]);

    let built = build_at(fs, "/app/overlay").unwrap();
    let configmap = only(&built, "ConfigMap");
    assert_eq!(configmap["data"], json!({"mode": "overlay"}));

    let kinds: Vec<&str> = built.resources.resources().map(Resource::kind).collect();
    assert_eq!(kinds, vec!["ConfigMap", "Service"]);
}

#[test]
fn hashed_configmap_references_are_rewritten() {
    let fs = tree(&[
        (
            "/app/kustomization.yaml",
            "namePrefix: app-\nresources: [deploy.yaml]\nconfigMapGenerator:\n- name: cfg\n  literals: [mode=prod]\n",
        ),
        ("/app/deploy.yaml", DEPLOYMENT_WEB),
    ]);

    let built = build_at(fs, "/app").unwrap();
    let configmap_name = only(&built, "ConfigMap")["metadata"]["name"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(configmap_name.starts_with("app-cfg-"));
    assert_eq!(configmap_name.len(), "app-cfg-".len() + 10);

    let deployment = only(&built, "Deployment");
    assert_eq!(deployment["metadata"]["name"], "app-web");
    assert_eq!(
        deployment["spec"]["template"]["spec"]["containers"][0]["envFrom"][0]["configMapRef"]["name"],
        configmap_name.as_str()
    );
}

#[test]
fn vars_resolve_through_prefixed_services() {
    let fs = tree(&[
        (
            "/app/base/kustomization.yaml",
            r#"
resources: [svc.yaml, deploy.yaml]
vars:
- name: SVC_IP
  objref:
    apiVersion: v1
    kind: Service
    name: db
  fieldref:
    fieldpath: spec.clusterIP
"#,
        ),
        ("/app/base/svc.yaml", SERVICE_DB),
        ("/app/base/deploy.yaml", DEPLOYMENT_WEB),
        ("/app/overlay/kustomization.yaml", "bases: [../base]\nnamePrefix: p-\n"),
    ]);

    let built = build_at(fs, "/app/overlay").unwrap();
    assert_eq!(only(&built, "Service")["metadata"]["name"], "p-db");
    assert_eq!(
        only(&built, "Deployment")["spec"]["template"]["spec"]["containers"][0]["args"],
        json!(["--db=10.0.0.5"])
    );
    assert!(built.diagnostics.is_empty());
}

#[test]
fn unresolved_vars_are_diagnostics_not_errors() {
    let fs = tree(&[
        (
            "/app/kustomization.yaml",
            "resources: [deploy.yaml]\nvars:\n- name: SVC_IP\n  objref: {apiVersion: v1, kind: Service, name: db}\n",
        ),
        ("/app/deploy.yaml", DEPLOYMENT_WEB),
    ]);

    let built = build_at(fs, "/app").unwrap();
    assert_eq!(built.diagnostics.of_kind(DiagnosticKind::UnresolvedVar).count(), 1);
    assert_eq!(
        only(&built, "Deployment")["spec"]["template"]["spec"]["containers"][0]["args"],
        json!(["--db=$(SVC_IP)"])
    );
}

#[test]
fn unreadable_var_field_is_fatal() {
    let fs = tree(&[
        (
            "/app/kustomization.yaml",
            "resources: [svc.yaml]\nvars:\n- name: PORT\n  objref: {apiVersion: v1, kind: Service, name: db}\n  fieldref: {fieldpath: spec.ports[0].port}\n",
        ),
        ("/app/svc.yaml", SERVICE_DB),
    ]);

    let err = build_at(fs, "/app").unwrap_err();
    assert!(matches!(err, Error::VarFieldPath { .. }), "got {err}");
}

#[test]
fn patches_apply_before_prefixing() {
    let fs = tree(&[
        ("/app/base/kustomization.yaml", "resources: [deploy.yaml]\n"),
        ("/app/base/deploy.yaml", DEPLOYMENT_WEB),
        (
            "/app/prod/kustomization.yaml",
            "bases: [../base]\nnamePrefix: prod-\npatchesStrategicMerge: [replicas.yaml]\nimageTags:\n- name: nginx\n  newTag: \"1.25\"\n",
        ),
        (
            "/app/prod/replicas.yaml",
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: 3\n",
        ),
    ]);

    let built = build_at(fs, "/app/prod").unwrap();
    let deployment = only(&built, "Deployment");
    assert_eq!(deployment["metadata"]["name"], "prod-web");
    assert_eq!(deployment["spec"]["replicas"], 3);
    assert_eq!(
        deployment["spec"]["template"]["spec"]["containers"][0]["image"],
        "nginx:1.25"
    );
}

#[test]
fn json6902_patches_target_one_resource() {
    let fs = tree(&[
        (
            "/app/kustomization.yaml",
            "resources: [deploy.yaml]\npatchesJson6902:\n- target: {group: apps, version: v1, kind: Deployment, name: web}\n  path: ops.yaml\n",
        ),
        ("/app/deploy.yaml", DEPLOYMENT_WEB),
        (
            "/app/ops.yaml",
            "- op: replace\n  path: /spec/replicas\n  value: 5\n- op: add\n  path: /metadata/labels\n  value: {tier: frontend}\n",
        ),
    ]);

    let built = build_at(fs, "/app").unwrap();
    let deployment = only(&built, "Deployment");
    assert_eq!(deployment["spec"]["replicas"], 5);
    assert_eq!(deployment["metadata"]["labels"], json!({"tier": "frontend"}));
}

#[test]
fn unmatched_patch_fails_the_pipeline() {
    let fs = tree(&[
        (
            "/app/kustomization.yaml",
            "resources: [svc.yaml]\npatchesStrategicMerge: [patch.yaml]\n",
        ),
        ("/app/svc.yaml", SERVICE_DB),
        (
            "/app/patch.yaml",
            "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n",
        ),
    ]);

    let err = build_at(fs, "/app").unwrap_err();
    assert!(matches!(err, Error::PatchTarget { .. }), "got {err}");
}

#[test]
fn duplicate_resources_across_files_are_rejected() {
    let fs = tree(&[
        ("/app/kustomization.yaml", "resources: [a.yaml, b.yaml]\n"),
        ("/app/a.yaml", SERVICE_DB),
        ("/app/b.yaml", SERVICE_DB),
    ]);

    let err = build_at(fs, "/app").unwrap_err();
    assert!(err.to_string().contains("Duplicate resource id ~G_v1_Service|db"));
}

#[test]
fn manifest_names_are_probed_in_order() {
    let fs = tree(&[
        ("/app/Kustomization", "resources: [svc.yaml]\n"),
        ("/app/svc.yaml", SERVICE_DB),
    ]);
    let built = build_at(fs, "/app").unwrap();
    assert_eq!(built.resources.len(), 1);
}

#[test]
fn missing_manifest_is_reported() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.mkdir("/empty");
    let err = build_at(fs, "/empty").unwrap_err();
    assert!(matches!(err, Error::ManifestNotFound { .. }));
}

#[test]
fn malformed_manifest_is_reported() {
    let fs = tree(&[("/app/kustomization.yaml", "namePrefx: typo-\n")]);
    let err = build_at(fs, "/app").unwrap_err();
    assert!(matches!(err, Error::Manifest { .. }));
    assert!(err.to_string().contains("/app/kustomization.yaml"));
}

#[test]
fn crd_rules_reach_custom_resources() {
    let fs = tree(&[
        (
            "/app/kustomization.yaml",
            "crds: [bee.yaml]\nresources: [bee-instance.yaml]\ncommonLabels:\n  env: prod\n",
        ),
        (
            "/app/bee.yaml",
            r##"
example.com.v1.Bee:
  properties:
    apiVersion: {type: string}
    kind: {type: string}
    metadata: {type: object}
    spec:
      properties:
        selectors:
          type: object
          x-kubernetes-label-selector: {}
"##,
        ),
        (
            "/app/bee-instance.yaml",
            "apiVersion: example.com/v1\nkind: Bee\nmetadata:\n  name: buzz\nspec:\n  selectors:\n    hive: north\n",
        ),
    ]);

    let built = build_at(fs, "/app").unwrap();
    assert_eq!(
        only(&built, "Bee")["spec"]["selectors"],
        json!({"hive": "north", "env": "prod"})
    );
}

#[test]
fn local_resources_precede_inherited_ones() {
    let fs = tree(&[
        ("/app/base/kustomization.yaml", "resources: [svc.yaml]\n"),
        ("/app/base/svc.yaml", SERVICE_DB),
        (
            "/app/overlay/kustomization.yaml",
            "bases: [../base]\nresources: [cm.yaml]\n",
        ),
        (
            "/app/overlay/cm.yaml",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: plain\ndata:\n  k: v\n",
        ),
    ]);

    let built = build_at(fs, "/app/overlay").unwrap();
    let kinds: Vec<&str> = built.resources.resources().map(Resource::kind).collect();
    assert_eq!(kinds, vec!["ConfigMap", "Service"]);
}

#[test]
fn outer_namespace_moves_subjects_of_prefixed_service_accounts() {
    let fs = tree(&[
        (
            "/app/base/kustomization.yaml",
            "namePrefix: base-\nresources: [sa.yaml, binding.yaml]\n",
        ),
        (
            "/app/base/sa.yaml",
            "apiVersion: v1\nkind: ServiceAccount\nmetadata:\n  name: builder\n",
        ),
        (
            "/app/base/binding.yaml",
            r#"
apiVersion: rbac.authorization.k8s.io/v1
kind: RoleBinding
metadata:
  name: builder-binding
roleRef:
  apiGroup: rbac.authorization.k8s.io
  kind: Role
  name: builder-role
subjects:
- kind: ServiceAccount
  name: builder
  namespace: default
"#,
        ),
        ("/app/prod/kustomization.yaml", "bases: [../base]\nnamespace: prod\n"),
    ]);

    let built = build_at(fs, "/app/prod").unwrap();
    let account = only(&built, "ServiceAccount");
    assert_eq!(account["metadata"]["name"], "base-builder");
    assert_eq!(account["metadata"]["namespace"], "prod");

    let subject = &only(&built, "RoleBinding")["subjects"][0];
    assert_eq!(subject["name"], "base-builder");
    assert_eq!(subject["namespace"], "prod");
}
