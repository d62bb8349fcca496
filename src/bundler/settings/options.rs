//! Bundling options and the esbuild flag enums they use.

use super::{Architecture, CommandHooks, Runtime};
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

/// esbuild output module format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CommonJS
    Cjs,
    /// ECMAScript module
    Esm,
}

impl OutputFormat {
    /// Flag value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cjs => "cjs",
            Self::Esm => "esm",
        }
    }

    /// Bundle file name written to the output directory.
    pub fn out_file(format: Option<OutputFormat>) -> &'static str {
        match format {
            Some(Self::Esm) => "index.mjs",
            _ => "index.js",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = crate::bundler::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cjs" => Ok(Self::Cjs),
            "esm" => Ok(Self::Esm),
            other => Err(crate::bundler::Error::configuration(format!(
                "Unknown output format `{other}`. Valid formats: cjs, esm"
            ))),
        }
    }
}

/// How esbuild emits source maps.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// Linked `.map` file plus `//# sourceMappingURL` comment.
    #[default]
    Default,
    /// `.map` file without the comment.
    External,
    /// Map embedded in the bundle.
    Inline,
    /// Both linked and inline.
    Both,
}

impl SourceMapMode {
    /// Suffix appended to `--sourcemap`.
    pub fn flag_suffix(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::External => "=external",
            Self::Inline => "=inline",
            Self::Both => "=both",
        }
    }
}

impl FromStr for SourceMapMode {
    type Err = crate::bundler::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "external" => Ok(Self::External),
            "inline" => Ok(Self::Inline),
            "both" => Ok(Self::Both),
            other => Err(crate::bundler::Error::configuration(format!(
                "Unknown source map mode `{other}`. Valid modes: default, external, inline, both"
            ))),
        }
    }
}

/// esbuild `--log-level`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
    Silent,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verbose => "verbose",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Silent => "silent",
        }
    }
}

/// esbuild `--charset`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    Ascii,
    Utf8,
}

impl Charset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Utf8 => "utf8",
        }
    }
}

/// Value of an extra esbuild argument.
///
/// `true` or an empty string emits the bare flag, `false` emits nothing.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum EsbuildArg {
    Flag(bool),
    Value(String),
}

/// How the artifact hash is computed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum AssetHash {
    /// SHA-256 of the bundled output directory.
    #[default]
    Output,
    /// Caller-supplied string, used as-is.
    Custom(String),
}

impl fmt::Display for AssetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output => f.write_str("output"),
            Self::Custom(hash) => write!(f, "custom ({hash})"),
        }
    }
}

/// Options for one bundling request.
///
/// Built with [`BundlingOptionsBuilder`](super::BundlingOptionsBuilder), which
/// resolves defaults and rejects invalid combinations. Immutable afterwards.
#[derive(Clone, Debug)]
pub struct BundlingOptions {
    pub(crate) entry: PathBuf,
    pub(crate) project_root: PathBuf,
    pub(crate) deps_lock_file_path: PathBuf,
    pub(crate) runtime: Runtime,
    pub(crate) architecture: Architecture,
    pub(crate) external_modules: Vec<String>,
    pub(crate) node_modules: Vec<String>,
    pub(crate) minify: bool,
    pub(crate) source_map: bool,
    pub(crate) source_map_mode: Option<SourceMapMode>,
    pub(crate) sources_content: bool,
    pub(crate) format: Option<OutputFormat>,
    pub(crate) target: Option<String>,
    pub(crate) loader: BTreeMap<String, String>,
    pub(crate) define: BTreeMap<String, String>,
    pub(crate) log_level: Option<LogLevel>,
    pub(crate) keep_names: bool,
    pub(crate) metafile: bool,
    pub(crate) banner: Option<String>,
    pub(crate) footer: Option<String>,
    pub(crate) main_fields: Vec<String>,
    pub(crate) inject: Vec<String>,
    pub(crate) charset: Option<Charset>,
    pub(crate) esbuild_args: BTreeMap<String, EsbuildArg>,
    pub(crate) esbuild_version: Option<String>,
    pub(crate) pre_compilation: bool,
    pub(crate) tsconfig: Option<PathBuf>,
    pub(crate) pnp: bool,
    pub(crate) docker_image: Option<String>,
    pub(crate) build_args: BTreeMap<String, String>,
    pub(crate) environment: BTreeMap<String, String>,
    pub(crate) command_hooks: Option<Arc<dyn CommandHooks>>,
    pub(crate) force_docker_bundling: bool,
    pub(crate) asset_hash: AssetHash,
    pub(crate) user: Option<String>,
    pub(crate) network: Option<String>,
}

impl BundlingOptions {
    /// Absolute path of the handler entry file.
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    /// Directory mounted as the bundling input.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Lock file that identifies the package manager.
    pub fn deps_lock_file_path(&self) -> &Path {
        &self.deps_lock_file_path
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    /// Modules excluded from the bundle.
    pub fn external_modules(&self) -> &[String] {
        &self.external_modules
    }

    /// Modules installed next to the bundle instead of being bundled.
    pub fn node_modules(&self) -> &[String] {
        &self.node_modules
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    pub fn pre_compilation(&self) -> bool {
        self.pre_compilation
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn build_args(&self) -> &BTreeMap<String, String> {
        &self.build_args
    }

    pub fn force_docker_bundling(&self) -> bool {
        self.force_docker_bundling
    }

    pub fn asset_hash(&self) -> &AssetHash {
        &self.asset_hash
    }

    /// Everything that ends up in esbuild's `--external:` flags.
    pub(crate) fn externals(&self) -> Vec<String> {
        self.external_modules
            .iter()
            .chain(self.node_modules.iter())
            .cloned()
            .collect()
    }
}
