#![cfg(unix)]

mod common;

use common::{Project, engine_with_esbuild};
use handler_bundler::bundler::{
    AssetHash, AssetStager, BundlingEngine, BundlingOptionsBuilder, Error,
    builder::checksum::calculate_sha256,
};
use std::{collections::BTreeMap, os::unix::fs::PermissionsExt, path::Path};

/// Writes an executable `esbuild` into `<project>/fake-bin` and returns the
/// PATH that finds it first.
fn fake_esbuild(project: &Project, body: &str) -> String {
    let script = project.write("fake-bin/esbuild", &format!("#!/bin/sh\n{body}\n"));
    let mut permissions = std::fs::metadata(&script).expect("metadata").permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&script, permissions).expect("chmod");

    let path = std::env::var("PATH").unwrap_or_default();
    format!("{}:{}", project.path("fake-bin").display(), path)
}

const WRITES_OUTFILE: &str = r#"for arg in "$@"; do
  case "$arg" in
    --outfile=*) out="${arg#--outfile=}" ;;
  esac
done
echo "exports.handler = async () => '$STAGE';" > "$out""#;

fn environment(path: String) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("PATH".to_string(), path),
        ("STAGE".to_string(), "test".to_string()),
    ])
}

fn engine() -> BundlingEngine {
    engine_with_esbuild("0.21.5", false)
}

// ── local bundling ──

#[tokio::test]
async fn test_local_bundle_is_staged_under_its_hash() {
    let project = Project::with_lock_file("package-lock.json");
    let path = fake_esbuild(&project, WRITES_OUTFILE);
    let options = BundlingOptionsBuilder::new(project.entry())
        .environment(environment(path))
        .build()
        .expect("options");
    let outdir = project.path("cdk.out");

    let artifact = engine()
        .bundle(&options, &outdir)
        .await
        .expect("local bundle");

    assert!(artifact.bundled_locally);
    assert_eq!(artifact.asset_hash, AssetHash::Output);
    assert_eq!(artifact.hash.len(), 64);
    assert_eq!(artifact.path, outdir.join(format!("asset.{}", artifact.hash)));
    let bundle = std::fs::read_to_string(artifact.path.join("index.js")).expect("bundle");
    assert_eq!(bundle, "exports.handler = async () => 'test';\n");
    assert_eq!(
        calculate_sha256(&artifact.path).await.expect("hash"),
        artifact.hash
    );

    // Same output, same directory; the second staging dir is discarded
    let again = engine()
        .bundle(&options, &outdir)
        .await
        .expect("second bundle");
    assert_eq!(again.path, artifact.path);
    assert_eq!(std::fs::read_dir(&outdir).expect("outdir").count(), 1);
}

#[tokio::test]
async fn test_custom_hash_is_passed_through() {
    let project = Project::with_lock_file("yarn.lock");
    let path = fake_esbuild(&project, WRITES_OUTFILE);
    let options = BundlingOptionsBuilder::new(project.entry())
        .environment(environment(path))
        .asset_hash("v1/beta")
        .build()
        .expect("options");

    let artifact = engine()
        .bundle(&options, &project.path("cdk.out"))
        .await
        .expect("local bundle");

    assert_eq!(artifact.hash, "v1/beta");
    assert_eq!(artifact.asset_hash, AssetHash::Custom("v1/beta".to_string()));
    assert_eq!(
        artifact.path.file_name().and_then(|n| n.to_str()),
        Some("asset.v1_beta")
    );
}

#[tokio::test]
async fn test_hooks_run_around_local_bundling() {
    let project = Project::with_lock_file("yarn.lock");
    project.write("config.json", "{}");
    let path = fake_esbuild(&project, WRITES_OUTFILE);
    let hooks = handler_bundler::bundler::TemplateHooks {
        after_bundling: vec!["cp \"{inputDir}/config.json\" \"{outputDir}\"".to_string()],
        ..Default::default()
    };
    let options = BundlingOptionsBuilder::new(project.entry())
        .environment(environment(path))
        .command_hooks(std::sync::Arc::new(hooks))
        .build()
        .expect("options");

    let artifact = engine()
        .bundle(&options, &project.path("cdk.out"))
        .await
        .expect("local bundle");
    assert!(artifact.path.join("config.json").is_file());
    assert!(artifact.path.join("index.js").is_file());
}

// ── failures ──

#[tokio::test]
async fn test_failed_command_reports_exit_code_and_stderr() {
    let project = Project::with_lock_file("yarn.lock");
    let path = fake_esbuild(&project, "echo 'Could not resolve \"pg\"' >&2\nexit 3");
    let options = BundlingOptionsBuilder::new(project.entry())
        .environment(environment(path))
        .build()
        .expect("options");

    let err = engine()
        .bundle(&options, &project.path("cdk.out"))
        .await
        .expect_err("esbuild failure");
    match err {
        Error::BuildExecution {
            exit_code, stderr, ..
        } => {
            assert_eq!(exit_code, 3);
            assert!(stderr.iter().any(|line| line.contains("Could not resolve")));
        }
        other => panic!("expected BuildExecution, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_output_is_an_error() {
    let project = Project::with_lock_file("yarn.lock");
    let path = fake_esbuild(&project, "exit 0");
    let options = BundlingOptionsBuilder::new(project.entry())
        .environment(environment(path))
        .build()
        .expect("options");

    let err = engine()
        .bundle(&options, &project.path("cdk.out"))
        .await
        .expect_err("no output");
    assert!(err.to_string().contains("did not produce any output"));
}

// ── checksum ──

#[tokio::test]
async fn test_directory_hash_covers_names_and_contents() {
    let project = Project::new();
    let dir = |name: &str| project.path(name);
    project.write("a/index.js", "1");
    project.write("a/lib/util.js", "2");
    project.write("b/index.js", "1");
    project.write("b/lib/util.js", "2");
    project.write("c/index.js", "1");
    project.write("c/lib/other.js", "2");

    let hash = |p: &Path| {
        let p = p.to_path_buf();
        async move { calculate_sha256(&p).await.expect("hash") }
    };
    assert_eq!(hash(&dir("a")).await, hash(&dir("b")).await);
    assert_ne!(hash(&dir("a")).await, hash(&dir("c")).await);
}
