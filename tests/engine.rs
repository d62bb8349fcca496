mod common;

use common::{Project, engine_with_esbuild, engine_without_host_tools};
use handler_bundler::{
    bundler::{
        Architecture, AssetHash, BundlingEngine, BundlingOptionsBuilder, Error,
        Installation, PackageManager, ToolCache,
    },
    docker::DockerImage,
};
use std::{collections::BTreeMap, path::PathBuf};

// ── end to end decisions ──

#[test]
fn test_forced_container_with_yarn() {
    let environment = BTreeMap::from([("KEY".to_string(), "value".to_string())]);
    let options = BundlingOptionsBuilder::new("/project/lib/handler.ts")
        .deps_lock_file_path("/project/yarn.lock")
        .environment(environment.clone())
        .force_docker_bundling(true)
        .build()
        .expect("options");

    // esbuild is "installed", but the container is forced
    let request = engine_with_esbuild("0.21.5", false)
        .prepare(&options)
        .expect("request");

    assert_eq!(request.source_dir, PathBuf::from("/project"));
    assert_eq!(request.package_manager, PackageManager::Yarn);
    assert_eq!(request.asset_hash, AssetHash::Output);
    assert!(request.local.is_none());
    assert_eq!(request.container.environment, environment);
    assert_eq!(request.container.working_directory, "/asset-input/lib");
}

#[test]
fn test_pnpm_with_extra_module() {
    let project = Project::with_lock_file("pnpm-lock.yaml");
    let options = BundlingOptionsBuilder::new(project.entry())
        .deps_lock_file_path(project.path("pnpm-lock.yaml"))
        .node_modules(vec!["delay".to_string()])
        .build()
        .expect("options");

    let request = engine_without_host_tools()
        .prepare(&options)
        .expect("request");

    assert_eq!(request.package_manager, PackageManager::Pnpm);
    assert!(request.package_manager.install_command().join(" ").contains("pnpm install"));
    assert!(request.container.command[2].contains("pnpm install"));
    assert_eq!(
        request.source_dir,
        project.path("pnpm-lock.yaml").parent().expect("parent")
    );
}

// ── strategy selection ──

#[test]
fn test_missing_esbuild_means_container_only() {
    let project = Project::with_lock_file("package-lock.json");
    let options = BundlingOptionsBuilder::new(project.entry())
        .build()
        .expect("options");
    let request = engine_without_host_tools()
        .prepare(&options)
        .expect("request");
    assert!(request.local.is_none());
}

#[test]
fn test_pre_compilation_needs_tsc_for_local_bundling() {
    let project = Project::with_lock_file("package-lock.json");
    project.write("tsconfig.json", r#"{"compilerOptions":{}}"#);
    let options = BundlingOptionsBuilder::new(project.entry())
        .pre_compilation(true)
        .build()
        .expect("options");

    let tools = ToolCache::new();
    tools.insert(
        "esbuild",
        Some(Installation {
            local: false,
            version: "0.21.5".to_string(),
        }),
    );
    tools.insert("tsc", None);
    let request = BundlingEngine::with_tools(tools)
        .prepare(&options)
        .expect("request");
    assert!(request.local.is_none());
}

#[test]
fn test_local_strategy_uses_project_binaries() {
    let project = Project::with_lock_file("pnpm-lock.yaml");
    let environment = BTreeMap::from([("NODE_ENV".to_string(), "production".to_string())]);
    let options = BundlingOptionsBuilder::new(project.entry())
        .environment(environment.clone())
        .build()
        .expect("options");

    let request = engine_with_esbuild("0.21.5", true)
        .prepare(&options)
        .expect("request");
    let local = request.local.expect("local strategy");

    assert_eq!(local.project_root, project.root());
    assert_eq!(local.environment, environment);
    let command = local.shell_command(&project.path("out"));
    let out_file = format!("--outfile=\"{}\"", project.path("out").join("index.js").display());
    assert!(command[2].starts_with("pnpm exec -- esbuild --bundle"), "got {}", command[2]);
    assert!(command[2].contains(&out_file), "got {}", command[2]);
}

// ── configuration failures ──

#[test]
fn test_missing_tsconfig_for_pre_compilation() {
    let project = Project::with_lock_file("yarn.lock");
    let options = BundlingOptionsBuilder::new(project.entry())
        .pre_compilation(true)
        .build()
        .expect("options");

    let err = engine_without_host_tools()
        .prepare(&options)
        .expect_err("no tsconfig");
    assert!(
        matches!(&err, Error::Configuration(msg) if msg == "Cannot find a `tsconfig.json` but `pre_compilation` is set to `true`, please specify it via `tsconfig`"),
        "got {err:?}"
    );
}

#[test]
fn test_pnp_requires_yarn_berry() {
    let options = BundlingOptionsBuilder::new("/project/lib/handler.ts")
        .deps_lock_file_path("/project/package-lock.json")
        .pnp(true)
        .build()
        .expect("options");
    let err = engine_without_host_tools()
        .prepare(&options)
        .expect_err("pnp with npm");
    assert!(err.is_configuration());
    assert!(err.to_string().contains("Yarn Berry"));
}

#[test]
fn test_unknown_module_version() {
    let project = Project::with_lock_file("yarn.lock");
    let options = BundlingOptionsBuilder::new(project.entry())
        .node_modules(vec!["not-declared".to_string()])
        .build()
        .expect("options");
    let err = engine_without_host_tools()
        .prepare(&options)
        .expect_err("undeclared module");
    assert_eq!(
        err.to_string(),
        "Cannot extract version for module 'not-declared'. Check that it's referenced in your package.json or installed."
    );
}

// ── container image ──

#[test]
fn test_default_image_is_built_for_runtime_and_architecture() {
    let options = BundlingOptionsBuilder::new("/project/lib/handler.ts")
        .deps_lock_file_path("/project/yarn.lock")
        .runtime("nodejs18.x".parse().expect("runtime"))
        .architecture(Architecture::Arm64)
        .build_args(BTreeMap::from([("HTTPS_PROXY".to_string(), "proxy:3128".to_string())]))
        .build()
        .expect("options");
    let request = engine_without_host_tools()
        .prepare(&options)
        .expect("request");

    let DockerImage::Build {
        build_args,
        platform,
    } = &request.container.image
    else {
        panic!("expected a built image, got {:?}", request.container.image);
    };
    assert_eq!(build_args["IMAGE"], "public.ecr.aws/sam/build-nodejs18.x");
    assert_eq!(build_args["ESBUILD_VERSION"], "0");
    assert_eq!(build_args["HTTPS_PROXY"], "proxy:3128");
    assert_eq!(platform.as_deref(), Some("linux/arm64"));
    assert_eq!(request.container.platform, "linux/arm64");
    assert!(request.container.image.tag().starts_with("handler-bundler:"));
}

#[test]
fn test_custom_image_is_used_as_is() {
    let options = BundlingOptionsBuilder::new("/project/handler.js")
        .deps_lock_file_path("/project/yarn.lock")
        .docker_image("my-registry/bundler:1")
        .build()
        .expect("options");
    let request = engine_without_host_tools()
        .prepare(&options)
        .expect("request");
    assert_eq!(
        request.container.image,
        DockerImage::from_registry("my-registry/bundler:1")
    );
    assert_eq!(request.container.working_directory, "/asset-input");
}

// ── tool cache ──

#[test]
fn test_tool_cache_serves_and_resets() {
    let project = Project::new();
    let tools = ToolCache::new();
    let fake = Installation {
        local: false,
        version: "0.0.1".to_string(),
    };
    tools.insert("handler-bundler-test-tool", Some(fake.clone()));
    assert_eq!(
        tools.detect("handler-bundler-test-tool", project.root()),
        Some(fake)
    );

    tools.reset();
    assert_eq!(tools.detect("handler-bundler-test-tool", project.root()), None);
}

#[test]
fn test_installation_major_version() {
    let installation = |version: &str| Installation {
        local: false,
        version: version.to_string(),
    };
    assert_eq!(installation("0.21.5").major(), Some(0));
    assert_eq!(installation("v1.2.3").major(), Some(1));
    assert_eq!(installation("nightly").major(), None);
}

// ── lazy version mismatch ──

#[tokio::test]
async fn test_version_mismatch_surfaces_only_on_local_run() {
    let project = Project::with_lock_file("yarn.lock");
    let options = BundlingOptionsBuilder::new(project.entry())
        .build()
        .expect("options");

    let request = engine_with_esbuild("1.2.3", false)
        .prepare(&options)
        .expect("mismatch is not a preparation error");
    let local = request.local.expect("local strategy despite the mismatch");

    let output = project.path("out");
    std::fs::create_dir_all(&output).expect("output dir");
    let err = local.bundle(&output).await.expect_err("mismatch on local run");
    assert!(
        matches!(&err, Error::ToolVersionMismatch { tool, expected: 0, found } if tool == "esbuild" && found == "1.2.3"),
        "got {err:?}"
    );
    assert_eq!(std::fs::read_dir(&output).expect("output").count(), 0);
}
