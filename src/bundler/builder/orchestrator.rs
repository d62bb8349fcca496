//! Bundling decision engine.
//!
//! This module provides the [`BundlingEngine`] that turns [`BundlingOptions`]
//! into a [`BuildArtifactRequest`]: it picks the package manager, probes the
//! host toolchain, renders the command for both execution strategies and
//! decides whether local execution is worth attempting.

use crate::{
    bundler::{
        AssetStager, BuildArtifact, BuildArtifactRequest, BundlingOptions, Error,
        LocalBundling, PackageManager, Result,
        utils::{fs::to_posix, os_command::OsPlatform},
    },
    docker::{BUNDLING_INPUT_DIR, BUNDLING_OUTPUT_DIR, ContainerBundling, DockerImage},
};
use std::path::Path;

use super::{
    command::{BundlingCommand, CommandContext},
    tool_detection::{Installation, ToolCache},
};

/// Major version of esbuild the generated command line is written for.
pub const ESBUILD_MAJOR_VERSION: u64 = 0;

const ESBUILD: &str = "esbuild";
const TSC: &str = "tsc";

/// Decides how a handler is bundled.
///
/// Owns the [`ToolCache`], so probes run once per engine and tool no matter how
/// many handlers are prepared.
///
/// # Examples
///
/// ```no_run
/// use handler_bundler::bundler::{BundlingEngine, BundlingOptionsBuilder};
///
/// # async fn example() -> handler_bundler::bundler::Result<()> {
/// let options = BundlingOptionsBuilder::new("/project/lib/handler.ts")
///     .deps_lock_file_path("/project/package-lock.json")
///     .build()?;
///
/// let engine = BundlingEngine::new();
/// let artifact = engine.bundle(&options, "cdk.out".as_ref()).await?;
/// println!("{} ({})", artifact.path.display(), artifact.hash);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct BundlingEngine {
    tools: ToolCache,
}

impl BundlingEngine {
    /// Creates an engine with an empty tool cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine sharing nothing but the given probe results.
    pub fn with_tools(tools: ToolCache) -> Self {
        Self { tools }
    }

    /// Probe cache, e.g. to [`ToolCache::reset`] it between builds.
    pub fn tools(&self) -> &ToolCache {
        &self.tools
    }

    /// Resolves everything needed to bundle, without running anything.
    ///
    /// # Errors
    ///
    /// - [`Error::ResourceResolution`] for an unknown lock file, a missing
    ///   package.json or an unpinnable node module
    /// - [`Error::Configuration`] for `pnp` without Yarn Berry, a missing
    ///   tsconfig or files outside the project root
    pub fn prepare(&self, options: &BundlingOptions) -> Result<BuildArtifactRequest> {
        let package_manager = PackageManager::from_lock_file(&options.deps_lock_file_path)?;
        log::debug!(
            "Using {} (lock file {})",
            package_manager,
            options.deps_lock_file_path.display()
        );

        if options.pnp && package_manager != PackageManager::YarnBerry {
            return Err(Error::configuration(format!(
                "`pnp` requires Yarn Berry but the lock file `{}` belongs to {}",
                options.deps_lock_file_path.display(),
                package_manager
            )));
        }

        let command = BundlingCommand::new(options, package_manager)?;
        let container = container_bundling(options, &command)?;

        let local = if options.force_docker_bundling {
            log::info!("Container bundling forced");
            None
        } else {
            self.local_bundling(options, &command)
        };

        Ok(BuildArtifactRequest {
            source_dir: options.project_root.clone(),
            package_manager,
            local,
            container,
            asset_hash: options.asset_hash.clone(),
        })
    }

    /// Prepares and stages the bundle under `outdir`.
    ///
    /// # Errors
    ///
    /// Anything from [`BundlingEngine::prepare`], plus [`Error::BuildExecution`]
    /// from the run. A host esbuild with the wrong major version is retried in
    /// the container.
    pub async fn bundle(&self, options: &BundlingOptions, outdir: &Path) -> Result<BuildArtifact> {
        let request = self.prepare(options)?;
        AssetStager::new(outdir).stage(&request).await
    }

    fn local_bundling(
        &self,
        options: &BundlingOptions,
        command: &BundlingCommand,
    ) -> Option<LocalBundling> {
        let project_root = &options.project_root;

        let Some(esbuild) = self.tools.detect(ESBUILD, project_root) else {
            log::warn!("esbuild not found on the host, bundling in a container");
            return None;
        };

        let tsc = if command.has_pre_compilation() {
            match self.tools.detect(TSC, project_root) {
                Some(tsc) => Some(tsc),
                None => {
                    log::warn!("tsc not found on the host, bundling in a container");
                    return None;
                }
            }
        } else {
            None
        };

        let os = OsPlatform::host();
        let pm = command.package_manager();
        let runner = |tool: &str, installation: &Installation| {
            if installation.local {
                pm.run_bin_command(tool, os)
            } else {
                tool.to_string()
            }
        };

        let ctx = CommandContext {
            input_dir: project_root.to_string_lossy().into_owned(),
            output_dir: String::new(),
            esbuild_runner: runner(ESBUILD, &esbuild),
            tsc_runner: tsc
                .as_ref()
                .map(|t| runner(TSC, t))
                .unwrap_or_else(|| TSC.to_string()),
            os,
        };

        Some(LocalBundling {
            command: command.clone(),
            context: ctx,
            project_root: project_root.clone(),
            environment: options.environment.clone(),
            esbuild,
            tsc,
        })
    }
}

fn container_bundling(
    options: &BundlingOptions,
    command: &BundlingCommand,
) -> Result<ContainerBundling> {
    let ctx = CommandContext {
        input_dir: BUNDLING_INPUT_DIR.to_string(),
        output_dir: BUNDLING_OUTPUT_DIR.to_string(),
        esbuild_runner: ESBUILD.to_string(),
        tsc_runner: TSC.to_string(),
        os: OsPlatform::Unix,
    };

    let entry_dir = options
        .entry
        .parent()
        .and_then(|dir| dir.strip_prefix(&options.project_root).ok())
        .ok_or_else(|| {
            Error::configuration(format!(
                "The entry `{}` must be located inside the project root `{}`",
                options.entry.display(),
                options.project_root.display()
            ))
        })?;
    let working_directory = match to_posix(entry_dir) {
        dir if dir.is_empty() => BUNDLING_INPUT_DIR.to_string(),
        dir => OsPlatform::Unix.join(BUNDLING_INPUT_DIR, &dir),
    };

    let platform = options.architecture.docker_platform().to_string();
    let image = match &options.docker_image {
        Some(image) => DockerImage::from_registry(image.clone()),
        None => {
            let mut build_args = options.build_args.clone();
            build_args.insert("IMAGE".to_string(), options.runtime.bundling_image());
            build_args.insert(
                "ESBUILD_VERSION".to_string(),
                options
                    .esbuild_version
                    .clone()
                    .unwrap_or_else(|| ESBUILD_MAJOR_VERSION.to_string()),
            );
            DockerImage::from_build(build_args, Some(platform.clone()))
        }
    };

    Ok(ContainerBundling {
        image,
        command: command.shell_command(&ctx),
        build_args: options.build_args.clone(),
        working_directory,
        environment: options.environment.clone(),
        user: options.user.clone(),
        platform,
        network: options.network.clone(),
    })
}
