//! End-to-end runs of the production and watch commands against a
//! temporary project laid out like the default configuration expects.

use cdnpack_bundler::{BundleBuilder, Mode, NativeRuntime};
use cdnpack_cli::cli::Cli;
use cdnpack_cli::commands::{self, build, watch};
use cdnpack_cli::config::{CONFIG_FILE, ProjectConfig};
use cdnpack_cli::error::CliError;
use clap::Parser;
use serial_test::serial;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn create_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "src/framework/main.js",
        "export function init(name) {\n  if (DEVELOPMENT) {\n    console.log(name);\n  }\n  return name;\n}\n",
    );
    write(
        root,
        "src/namespaces/abc/components/bar/bar.js",
        "import aura from 'aura';\nexport default function () { return aura.init('bar'); }\n",
    );
    write(
        root,
        "src/namespaces/abc/components/foo/foo.js",
        "import aura from 'aura';\nexport default function () { return aura.init('foo'); }\n",
    );
    dir
}

fn builder(root: &Path) -> BundleBuilder {
    BundleBuilder::native(Arc::new(NativeRuntime::new(root)))
}

#[tokio::test]
#[serial]
async fn production_build_writes_every_default_bundle() {
    let project = create_project();
    let root = project.path();
    let registry = ProjectConfig::default()
        .into_registry(Mode::Production, root)
        .unwrap();

    let results = build::execute(&builder(root), &registry, root).await.unwrap();

    assert_eq!(results.len(), 3);
    for name in ["fw", "bar", "foo"] {
        assert!(root.join(format!("fake-cdn/{name}.js")).exists());
        assert!(root.join(format!("fake-cdn/{name}.js.map")).exists());
    }
    let fw = std::fs::read_to_string(root.join("fake-cdn/fw.js")).unwrap();
    assert!(fw.contains("$A"));
    assert!(!fw.contains("console.log"));
    let bar = std::fs::read_to_string(root.join("fake-cdn/bar.js")).unwrap();
    assert!(bar.starts_with("define(\"abc:bar\""));
}

#[tokio::test]
#[serial]
async fn run_reports_failing_bundle() {
    let project = create_project();
    let root = project.path();
    write(root, "src/namespaces/abc/components/foo/foo.js", "export default = ;\n");

    let args = Cli::parse_from(["cdnpack", "--cwd", root.to_str().unwrap(), "-q"]);
    let err = commands::run(args, Mode::Production).await.unwrap_err();

    match err {
        CliError::Build(err) => assert_eq!(err.bundle(), "foo"),
        other => panic!("expected build error, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn run_uses_config_file_from_cwd() {
    let project = create_project();
    let root = project.path();
    write(
        root,
        CONFIG_FILE,
        r#"
[[bundles]]
name = "fw"
folder = "src/framework"
entry = "main.js"
dest = "public/framework.js"
format = { type = "umd", name = "$A" }
"#,
    );

    let args = Cli::parse_from(["cdnpack", "--cwd", root.to_str().unwrap()]);
    commands::run(args, Mode::Production).await.unwrap();

    assert!(root.join("public/framework.js").exists());
    // no sourcemap configured
    assert!(!root.join("public/framework.js.map").exists());
    assert!(!root.join("fake-cdn").exists());
}

#[tokio::test]
#[serial]
async fn run_rejects_missing_explicit_config() {
    let project = create_project();
    let root = project.path();

    let args = Cli::parse_from([
        "cdnpack",
        "--cwd",
        root.to_str().unwrap(),
        "--config",
        "missing.toml",
    ]);
    let err = commands::run(args, Mode::Production).await.unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn watch_runs_initial_builds_until_shutdown() {
    let project = create_project();
    let root = project.path().to_path_buf();
    let registry = ProjectConfig::default()
        .into_registry(Mode::Development, &root)
        .unwrap();

    let outputs = ["fw", "bar", "foo"].map(|name| root.join(format!("fake-cdn/{name}.js")));
    let shutdown = {
        let outputs = outputs.clone();
        async move {
            let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
            while !outputs.iter().all(|path| path.exists()) && tokio::time::Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            // let the last completion event reach the loop
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    let completed = watch::execute_until(builder(&root), &registry, &root, shutdown)
        .await
        .unwrap();

    assert!(completed >= 3, "only {completed} builds completed");
    let fw = std::fs::read_to_string(&outputs[0]).unwrap();
    assert!(fw.contains("console.log"));
}
