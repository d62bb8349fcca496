//! Builder for constructing [`BundlingOptions`].

use super::{
    Architecture, AssetHash, BundlingOptions, Charset, CommandHooks, EsbuildArg, LogLevel,
    OutputFormat, Runtime, SourceMapMode,
};
use crate::bundler::{
    Error, Result,
    error::ErrorExt,
    package_manager::LOCK_FILES,
    utils::fs::find_up_any,
};
use path_absolutize::Absolutize;
use regex::Regex;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};

static ENTRY_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(jsx?|tsx?|cjs|cts|mjs|mts)$").expect("entry pattern is valid")
});

/// Builder for [`BundlingOptions`].
///
/// Only the entry is required. Paths may be relative to the current directory.
///
/// # Examples
///
/// ```no_run
/// use handler_bundler::bundler::{BundlingOptionsBuilder, OutputFormat};
///
/// # fn example() -> handler_bundler::bundler::Result<()> {
/// let options = BundlingOptionsBuilder::new("lib/handler.ts")
///     .deps_lock_file_path("yarn.lock")
///     .runtime("nodejs20.x".parse()?)
///     .format(OutputFormat::Esm)
///     .minify(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct BundlingOptionsBuilder {
    entry: PathBuf,
    project_root: Option<PathBuf>,
    deps_lock_file_path: Option<PathBuf>,
    runtime: Option<Runtime>,
    architecture: Architecture,
    external_modules: Option<Vec<String>>,
    node_modules: Vec<String>,
    minify: bool,
    source_map: bool,
    source_map_mode: Option<SourceMapMode>,
    sources_content: Option<bool>,
    format: Option<OutputFormat>,
    target: Option<String>,
    loader: BTreeMap<String, String>,
    define: BTreeMap<String, String>,
    log_level: Option<LogLevel>,
    keep_names: bool,
    metafile: bool,
    banner: Option<String>,
    footer: Option<String>,
    main_fields: Vec<String>,
    inject: Vec<String>,
    charset: Option<Charset>,
    esbuild_args: BTreeMap<String, EsbuildArg>,
    esbuild_version: Option<String>,
    pre_compilation: bool,
    tsconfig: Option<PathBuf>,
    pnp: bool,
    docker_image: Option<String>,
    build_args: BTreeMap<String, String>,
    environment: BTreeMap<String, String>,
    command_hooks: Option<Arc<dyn CommandHooks>>,
    force_docker_bundling: bool,
    asset_hash: Option<String>,
    user: Option<String>,
    network: Option<String>,
}

impl BundlingOptionsBuilder {
    /// Starts a builder for the given handler entry file.
    pub fn new<P: AsRef<Path>>(entry: P) -> Self {
        Self {
            entry: entry.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Directory mounted as bundling input.
    ///
    /// Default: the lock file's directory.
    pub fn project_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Lock file identifying the package manager.
    ///
    /// Default: the closest known lock file above the entry.
    pub fn deps_lock_file_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.deps_lock_file_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Default: [`Runtime::DEFAULT`]
    pub fn runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Default: x86_64
    pub fn architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    /// Modules left out of the bundle.
    ///
    /// Default: the SDK shipped with the runtime.
    pub fn external_modules(mut self, modules: Vec<String>) -> Self {
        self.external_modules = Some(modules);
        self
    }

    /// Modules installed into the output with the package manager instead of bundled.
    pub fn node_modules(mut self, modules: Vec<String>) -> Self {
        self.node_modules = modules;
        self
    }

    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    pub fn source_map(mut self, source_map: bool) -> Self {
        self.source_map = source_map;
        self
    }

    /// Requires [`source_map`](Self::source_map) to be enabled.
    pub fn source_map_mode(mut self, mode: SourceMapMode) -> Self {
        self.source_map_mode = Some(mode);
        self
    }

    /// Default: true
    pub fn sources_content(mut self, sources_content: bool) -> Self {
        self.sources_content = Some(sources_content);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// esbuild `--target`. Default: derived from the runtime (e.g. `node20`).
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Maps a file extension (with leading dot) to an esbuild loader.
    pub fn loader(mut self, extension: impl Into<String>, loader: impl Into<String>) -> Self {
        self.loader.insert(extension.into(), loader.into());
        self
    }

    /// Replaces a global identifier with a constant expression.
    pub fn define(mut self, identifier: impl Into<String>, value: impl Into<String>) -> Self {
        self.define.insert(identifier.into(), value.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn keep_names(mut self, keep_names: bool) -> Self {
        self.keep_names = keep_names;
        self
    }

    /// Writes `index.meta.json` next to the bundle.
    pub fn metafile(mut self, metafile: bool) -> Self {
        self.metafile = metafile;
        self
    }

    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn main_fields(mut self, fields: Vec<String>) -> Self {
        self.main_fields = fields;
        self
    }

    /// Files whose exports are injected as globals (shims).
    pub fn inject(mut self, files: Vec<String>) -> Self {
        self.inject = files;
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Extra esbuild flag, e.g. `("--log-limit", EsbuildArg::Value("0".into()))`.
    pub fn esbuild_arg(mut self, flag: impl Into<String>, value: EsbuildArg) -> Self {
        self.esbuild_args.insert(flag.into(), value);
        self
    }

    /// esbuild version installed in the default bundling image.
    pub fn esbuild_version(mut self, version: impl Into<String>) -> Self {
        self.esbuild_version = Some(version.into());
        self
    }

    /// Runs `tsc` on the entry before bundling.
    pub fn pre_compilation(mut self, pre_compilation: bool) -> Self {
        self.pre_compilation = pre_compilation;
        self
    }

    pub fn tsconfig<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.tsconfig = Some(path.as_ref().to_path_buf());
        self
    }

    /// Installs node modules with Yarn Plug'n'Play. Yarn Berry only.
    pub fn pnp(mut self, pnp: bool) -> Self {
        self.pnp = pnp;
        self
    }

    /// Image used for container bundling instead of the built default.
    pub fn docker_image(mut self, image: impl Into<String>) -> Self {
        self.docker_image = Some(image.into());
        self
    }

    pub fn build_args(mut self, args: BTreeMap<String, String>) -> Self {
        self.build_args = args;
        self
    }

    /// Environment for the bundling command, local or in the container.
    pub fn environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    pub fn command_hooks(mut self, hooks: Arc<dyn CommandHooks>) -> Self {
        self.command_hooks = Some(hooks);
        self
    }

    /// Skips local bundling even when esbuild is available.
    pub fn force_docker_bundling(mut self, force: bool) -> Self {
        self.force_docker_bundling = force;
        self
    }

    /// Uses `hash` verbatim instead of hashing the output.
    pub fn asset_hash(mut self, hash: impl Into<String>) -> Self {
        self.asset_hash = Some(hash.into());
        self
    }

    /// Container user. Default: the current `uid:gid`.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Container network.
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Resolves defaults and validates the combination.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] for invalid combinations (source map mode
    ///   without source maps, ESM on a runtime without ESM support, entry
    ///   outside the project root, missing explicit tsconfig, ...)
    /// - [`Error::ResourceResolution`] when no lock file can be found
    pub fn build(self) -> Result<BundlingOptions> {
        let entry = absolute(&self.entry)?;
        let entry_name = entry.to_string_lossy();
        if !ENTRY_EXTENSION.is_match(&entry_name) {
            return Err(Error::configuration(format!(
                "Only JavaScript or TypeScript entry files are supported, got `{}`",
                entry.display()
            )));
        }

        let deps_lock_file_path = match &self.deps_lock_file_path {
            Some(path) => absolute(path)?,
            None => find_lock_file(&entry)?,
        };

        let project_root = match &self.project_root {
            Some(path) => absolute(path)?,
            None => deps_lock_file_path
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| {
                    Error::configuration(format!(
                        "Cannot derive a project root from `{}`",
                        deps_lock_file_path.display()
                    ))
                })?,
        };

        if !entry.starts_with(&project_root) {
            return Err(Error::configuration(format!(
                "Entry `{}` must be located inside the project root `{}`",
                entry.display(),
                project_root.display()
            )));
        }

        if self.source_map_mode.is_some() && !self.source_map {
            return Err(Error::configuration(
                "source_map_mode cannot be used when source_map is disabled",
            ));
        }

        let runtime = self.runtime.unwrap_or_default();
        if self.format == Some(OutputFormat::Esm) && !runtime.supports_esm() {
            return Err(Error::configuration(format!(
                "ECMAScript module output format is not supported by the {} runtime",
                runtime
            )));
        }

        let tsconfig = match &self.tsconfig {
            Some(path) => {
                let path = absolute(path)?;
                if !path.is_file() {
                    return Err(Error::configuration(format!(
                        "Cannot find the tsconfig file at `{}`",
                        path.display()
                    )));
                }
                Some(path)
            }
            None => None,
        };

        let asset_hash = match self.asset_hash {
            Some(hash) if hash.trim().is_empty() => {
                return Err(Error::configuration("asset_hash cannot be empty"));
            }
            Some(hash) => AssetHash::Custom(hash),
            None => AssetHash::Output,
        };

        Ok(BundlingOptions {
            external_modules: self
                .external_modules
                .unwrap_or_else(|| runtime.default_externals()),
            entry,
            project_root,
            deps_lock_file_path,
            runtime,
            architecture: self.architecture,
            node_modules: self.node_modules,
            minify: self.minify,
            source_map: self.source_map,
            source_map_mode: self.source_map_mode,
            sources_content: self.sources_content.unwrap_or(true),
            format: self.format,
            target: self.target,
            loader: self.loader,
            define: self.define,
            log_level: self.log_level,
            keep_names: self.keep_names,
            metafile: self.metafile,
            banner: self.banner,
            footer: self.footer,
            main_fields: self.main_fields,
            inject: self.inject,
            charset: self.charset,
            esbuild_args: self.esbuild_args,
            esbuild_version: self.esbuild_version,
            pre_compilation: self.pre_compilation,
            tsconfig,
            pnp: self.pnp,
            docker_image: self.docker_image,
            build_args: self.build_args,
            environment: self.environment,
            command_hooks: self.command_hooks,
            force_docker_bundling: self.force_docker_bundling,
            asset_hash,
            user: self.user,
            network: self.network,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .fs_context("resolving path", path)?
        .into_owned())
}

fn find_lock_file(entry: &Path) -> Result<PathBuf> {
    let names: Vec<&str> = LOCK_FILES.iter().map(|(name, _)| *name).collect();
    let start = entry.parent().unwrap_or(entry);
    find_up_any(&names, start).ok_or_else(|| {
        Error::ResourceResolution(format!(
            "Cannot find a package lock file ({}) above `{}`. \
             Please specify it with `deps_lock_file_path`.",
            names.join(", "),
            start.display()
        ))
    })
}
