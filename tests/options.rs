mod common;

use common::Project;
use handler_bundler::bundler::{
    Architecture, AssetHash, BundlingOptionsBuilder, Error, OutputFormat, Runtime, SourceMapMode,
};
use std::path::PathBuf;

fn builder() -> BundlingOptionsBuilder {
    BundlingOptionsBuilder::new("/project/lib/handler.ts").deps_lock_file_path("/project/yarn.lock")
}

// ── source maps ──

#[test]
fn test_source_map_mode_requires_source_map() {
    let variants = [
        builder(),
        builder().minify(true),
        builder().format(OutputFormat::Esm),
        builder().force_docker_bundling(true).asset_hash("abc"),
    ];
    for variant in variants {
        let err = variant
            .source_map_mode(SourceMapMode::Inline)
            .build()
            .expect_err("source map mode without source map");
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "Configuration error: source_map_mode cannot be used when source_map is disabled"
        );
    }
}

#[test]
fn test_source_map_mode_with_source_map() {
    builder()
        .source_map(true)
        .source_map_mode(SourceMapMode::Both)
        .build()
        .expect("valid source map options");
}

// ── output format ──

#[test]
fn test_esm_rejected_for_runtime_without_esm() {
    for variant in [builder(), builder().minify(true).source_map(true)] {
        let err = variant
            .runtime("nodejs12.x".parse().expect("runtime"))
            .format(OutputFormat::Esm)
            .build()
            .expect_err("esm on node 12");
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("ECMAScript module")));
    }
}

#[test]
fn test_esm_accepted_from_node_14() {
    let options = builder()
        .runtime(Runtime::nodejs(14))
        .format(OutputFormat::Esm)
        .build()
        .expect("esm on node 14");
    assert_eq!(options.format(), Some(OutputFormat::Esm));
}

// ── defaults ──

#[test]
fn test_defaults_follow_lock_file_and_runtime() {
    let options = builder().build().expect("options");
    assert_eq!(options.project_root(), PathBuf::from("/project"));
    assert_eq!(options.runtime(), Runtime::DEFAULT);
    assert_eq!(options.architecture(), Architecture::X86_64);
    assert_eq!(options.external_modules(), ["@aws-sdk/*".to_string()]);
    assert_eq!(options.asset_hash(), &AssetHash::Output);

    let node16 = builder()
        .runtime("nodejs16.x".parse().expect("runtime"))
        .build()
        .expect("options");
    assert_eq!(node16.external_modules(), ["aws-sdk".to_string()]);
}

#[test]
fn test_lock_file_found_above_entry() {
    let project = Project::with_lock_file("pnpm-lock.yaml");
    let options = BundlingOptionsBuilder::new(project.entry())
        .build()
        .expect("options");
    assert_eq!(options.deps_lock_file_path(), project.path("pnpm-lock.yaml"));
    assert_eq!(options.project_root(), project.root());
}

#[test]
fn test_custom_asset_hash() {
    let options = builder().asset_hash("release-42").build().expect("options");
    assert_eq!(options.asset_hash(), &AssetHash::Custom("release-42".to_string()));

    let err = builder().asset_hash("  ").build().expect_err("empty hash");
    assert!(err.is_configuration());
}

// ── entry and paths ──

#[test]
fn test_entry_must_be_javascript_or_typescript() {
    let err = BundlingOptionsBuilder::new("/project/lib/handler.py")
        .deps_lock_file_path("/project/yarn.lock")
        .build()
        .expect_err("python entry");
    assert!(err.to_string().contains("JavaScript or TypeScript"));

    for entry in ["handler.js", "handler.mjs", "handler.cts", "handler.tsx"] {
        BundlingOptionsBuilder::new(format!("/project/{entry}"))
            .deps_lock_file_path("/project/yarn.lock")
            .build()
            .unwrap_or_else(|e| panic!("{entry} should be accepted: {e}"));
    }
}

#[test]
fn test_entry_outside_project_root() {
    let err = BundlingOptionsBuilder::new("/elsewhere/handler.ts")
        .deps_lock_file_path("/project/yarn.lock")
        .build()
        .expect_err("entry outside root");
    assert!(err.to_string().contains("inside the project root"));
}

#[test]
fn test_explicit_tsconfig_must_exist() {
    let err = builder()
        .tsconfig("/project/missing/tsconfig.json")
        .build()
        .expect_err("missing tsconfig");
    assert!(err.to_string().contains("Cannot find the tsconfig file"));
}

// ── identifiers ──

#[test]
fn test_runtime_and_architecture_parsing() {
    let runtime: Runtime = "nodejs18.x".parse().expect("runtime");
    assert_eq!(runtime.major(), 18);
    assert_eq!(runtime.to_string(), "nodejs18.x");
    assert_eq!(runtime.bundling_image(), "public.ecr.aws/sam/build-nodejs18.x");
    assert!("python3.12".parse::<Runtime>().is_err());

    let arch: Architecture = "aarch64".parse().expect("architecture");
    assert_eq!(arch, Architecture::Arm64);
    assert_eq!(arch.docker_platform(), "linux/arm64");
    assert!("sparc".parse::<Architecture>().is_err());
}
