//! TOML config file and its merge with command line flags.
//!
//! ```toml
//! entry = "lib/handler.ts"
//! runtime = "nodejs20.x"
//! node_modules = ["delay"]
//!
//! [environment]
//! NODE_ENV = "production"
//!
//! [command_hooks]
//! after_bundling = ["cp {inputDir}/config.json {outputDir}"]
//! ```
//!
//! Relative paths in the file are resolved against the file's directory.

use super::args::Args;
use crate::{
    bundler::{
        Architecture, BundlingOptions, BundlingOptionsBuilder, Charset, EsbuildArg, LogLevel,
        OutputFormat, Runtime, SourceMapMode, TemplateHooks,
    },
    error::{CliError, Result},
};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "handler-bundler.toml";

/// Output directory when neither the flag nor the file sets one.
pub const DEFAULT_OUT_DIR: &str = "cdk.out";

/// Contents of a config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub entry: Option<PathBuf>,
    pub lock_file: Option<PathBuf>,
    pub project_root: Option<PathBuf>,
    pub runtime: Option<Runtime>,
    pub architecture: Option<Architecture>,
    pub format: Option<OutputFormat>,
    pub minify: Option<bool>,
    pub source_map: Option<bool>,
    pub source_map_mode: Option<SourceMapMode>,
    pub sources_content: Option<bool>,
    pub target: Option<String>,
    pub external_modules: Option<Vec<String>>,
    pub node_modules: Vec<String>,
    pub loader: BTreeMap<String, String>,
    pub define: BTreeMap<String, String>,
    pub log_level: Option<LogLevel>,
    pub keep_names: Option<bool>,
    pub metafile: Option<bool>,
    pub banner: Option<String>,
    pub footer: Option<String>,
    pub main_fields: Vec<String>,
    pub inject: Vec<String>,
    pub charset: Option<Charset>,
    pub esbuild_args: BTreeMap<String, EsbuildArg>,
    pub esbuild_version: Option<String>,
    pub pre_compilation: Option<bool>,
    pub tsconfig: Option<PathBuf>,
    pub pnp: Option<bool>,
    pub docker_image: Option<String>,
    pub build_args: BTreeMap<String, String>,
    pub environment: BTreeMap<String, String>,
    pub command_hooks: Option<TemplateHooks>,
    pub force_docker_bundling: Option<bool>,
    pub asset_hash: Option<String>,
    pub user: Option<String>,
    pub network: Option<String>,
    pub out_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Reads and parses a config file, resolving its relative paths.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut config: Self = toml::from_str(&content)?;

        let base = path
            .absolutize()?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.resolve_paths(&base);

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.entry,
            &mut self.lock_file,
            &mut self.project_root,
            &mut self.tsconfig,
            &mut self.out_dir,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Loads `--config`, or the default file when it exists.
pub fn load(args: &Args) -> Result<Option<FileConfig>> {
    match &args.config {
        Some(path) => FileConfig::load(path).map(Some),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                FileConfig::load(default).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

/// Merges flags over the file and builds validated options.
///
/// Returns the options and the output directory.
pub fn resolve(args: &Args, file: FileConfig) -> Result<(BundlingOptions, PathBuf)> {
    let entry = args
        .entry
        .clone()
        .or(file.entry)
        .ok_or_else(|| CliError::MissingArgument {
            argument: "--entry".to_string(),
        })?;

    let mut builder = BundlingOptionsBuilder::new(entry)
        .minify(args.minify || file.minify.unwrap_or(false))
        .source_map(args.source_map || file.source_map.unwrap_or(false))
        .pre_compilation(args.pre_compilation || file.pre_compilation.unwrap_or(false))
        .force_docker_bundling(args.force_docker || file.force_docker_bundling.unwrap_or(false))
        .keep_names(file.keep_names.unwrap_or(false))
        .metafile(file.metafile.unwrap_or(false))
        .pnp(file.pnp.unwrap_or(false))
        .main_fields(file.main_fields)
        .inject(file.inject);

    if let Some(path) = args.lock_file.clone().or(file.lock_file) {
        builder = builder.deps_lock_file_path(path);
    }
    if let Some(path) = args.project_root.clone().or(file.project_root) {
        builder = builder.project_root(path);
    }
    if let Some(runtime) = args.runtime.or(file.runtime) {
        builder = builder.runtime(runtime);
    }
    if let Some(architecture) = args.architecture.or(file.architecture) {
        builder = builder.architecture(architecture);
    }
    if let Some(format) = args.format.or(file.format) {
        builder = builder.format(format);
    }
    if let Some(mode) = args.source_map_mode.or(file.source_map_mode) {
        builder = builder.source_map_mode(mode);
    }
    if let Some(sources_content) = file.sources_content {
        builder = builder.sources_content(sources_content);
    }
    if let Some(target) = file.target {
        builder = builder.target(target);
    }

    let external_modules = if args.external.is_empty() {
        file.external_modules
    } else {
        Some(args.external.clone())
    };
    if let Some(modules) = external_modules {
        builder = builder.external_modules(modules);
    }
    let mut node_modules = file.node_modules;
    node_modules.extend(args.node_module.iter().cloned());
    builder = builder.node_modules(node_modules);

    for (extension, loader) in file.loader {
        builder = builder.loader(extension, loader);
    }
    for (identifier, value) in file.define {
        builder = builder.define(identifier, value);
    }
    if let Some(level) = file.log_level {
        builder = builder.log_level(level);
    }
    if let Some(banner) = file.banner {
        builder = builder.banner(banner);
    }
    if let Some(footer) = file.footer {
        builder = builder.footer(footer);
    }
    if let Some(charset) = file.charset {
        builder = builder.charset(charset);
    }
    for (flag, value) in file.esbuild_args {
        builder = builder.esbuild_arg(flag, value);
    }
    if let Some(version) = file.esbuild_version {
        builder = builder.esbuild_version(version);
    }
    if let Some(path) = args.tsconfig.clone().or(file.tsconfig) {
        builder = builder.tsconfig(path);
    }
    if let Some(image) = file.docker_image {
        builder = builder.docker_image(image);
    }

    let mut build_args = file.build_args;
    build_args.extend(args.build_arg.iter().cloned());
    let mut environment = file.environment;
    environment.extend(args.env.iter().cloned());
    builder = builder.build_args(build_args).environment(environment);

    if let Some(hooks) = file.command_hooks.filter(|h| !h.is_empty()) {
        builder = builder.command_hooks(Arc::new(hooks));
    }
    if let Some(hash) = args.asset_hash.clone().or(file.asset_hash) {
        builder = builder.asset_hash(hash);
    }
    if let Some(user) = file.user {
        builder = builder.user(user);
    }
    if let Some(network) = file.network {
        builder = builder.network(network);
    }

    let out_dir = args
        .out_dir
        .clone()
        .or(file.out_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

    Ok((builder.build()?, out_dir))
}
