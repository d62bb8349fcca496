//! Assembly of the bundling shell command.
//!
//! The command is a `&&` chain of fragments:
//!
//! 1. `before_install` hooks
//! 2. dependency installation into the output (only when node modules are named)
//! 3. `tsc` pre-compilation (when requested)
//! 4. `before_bundling` hooks
//! 5. esbuild
//! 6. `after_bundling` hooks

use super::{dependencies, tsconfig};
use crate::bundler::{
    BundlingOptions, EsbuildArg, Error, OutputFormat, PackageManager, Result,
    utils::{
        fs::to_posix,
        os_command::{OsPlatform, chain},
    },
};
use regex::Regex;
use std::{
    collections::BTreeMap,
    path::Path,
    sync::LazyLock,
};

/// TypeScript source extension; `tsc` emits `.js`, `.mjs` or `.cjs` next to it.
static TS_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([mc]?)ts(x?)$").expect("extension pattern is valid"));

/// esbuild flags that take `flag:"value"` instead of `flag="value"`.
const RESPECIFIABLE_FLAGS: &[&str] = &["--alias", "--drop", "--pure", "--log-override", "--out-extension"];

/// Where and how a [`BundlingCommand`] is rendered.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project root as seen by the shell.
    pub input_dir: String,
    /// Output directory as seen by the shell.
    pub output_dir: String,
    /// Fragment invoking esbuild.
    pub esbuild_runner: String,
    /// Fragment invoking tsc.
    pub tsc_runner: String,
    /// Shell flavour.
    pub os: OsPlatform,
}

/// Everything needed to render the bundling command for any input/output pair.
///
/// File lookups (tsconfig, package.json) happen once in [`BundlingCommand::new`];
/// rendering is pure.
#[derive(Debug, Clone)]
pub struct BundlingCommand {
    options: BundlingOptions,
    package_manager: PackageManager,
    relative_entry: String,
    relative_tsconfig: Option<String>,
    relative_lock_file: String,
    lock_file_name: String,
    tsc_flags: Option<String>,
    dependencies: Option<BTreeMap<String, String>>,
}

impl BundlingCommand {
    /// Resolves the file-dependent parts of the command.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] when pre-compilation has no tsconfig, or a
    ///   file that must be mounted lies outside the project root
    /// - [`Error::ResourceResolution`] when a node module version cannot be found
    pub fn new(options: &BundlingOptions, package_manager: PackageManager) -> Result<Self> {
        let relative_entry = relative_to_root(options, &options.entry, "entry")?;

        let relative_tsconfig = match &options.tsconfig {
            Some(path) => Some(relative_to_root(options, path, "tsconfig")?),
            None => None,
        };

        let tsc_flags = if options.pre_compilation {
            let path = tsconfig::resolve(options.tsconfig.as_deref(), &options.entry)?;
            let compiler_options = tsconfig::read_compiler_options(&path)?;
            Some(tsconfig::compiler_flags(&compiler_options))
        } else {
            None
        };

        let dependencies = if options.node_modules.is_empty() {
            None
        } else {
            let package_json = dependencies::find_package_json(&options.entry)?;
            Some(dependencies::extract_dependencies(
                &package_json,
                &options.node_modules,
            )?)
        };

        let relative_lock_file = if dependencies.is_some() {
            relative_to_root(options, &options.deps_lock_file_path, "deps lock file")?
        } else {
            to_posix(
                options
                    .deps_lock_file_path
                    .strip_prefix(&options.project_root)
                    .unwrap_or(&options.deps_lock_file_path),
            )
        };

        let lock_file_name = options
            .deps_lock_file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| package_manager.lock_file().to_string());

        Ok(Self {
            options: options.clone(),
            package_manager,
            relative_entry,
            relative_tsconfig,
            relative_lock_file,
            lock_file_name,
            tsc_flags,
            dependencies,
        })
    }

    /// Package manager the command installs with.
    pub fn package_manager(&self) -> PackageManager {
        self.package_manager
    }

    /// True when a `tsc` step is part of the command.
    pub fn has_pre_compilation(&self) -> bool {
        self.tsc_flags.is_some()
    }

    /// Versions pinned for the node modules installed next to the bundle.
    pub fn dependencies(&self) -> Option<&BTreeMap<String, String>> {
        self.dependencies.as_ref()
    }

    /// Renders the full `&&` chain.
    pub fn render(&self, ctx: &CommandContext) -> String {
        let mut entry_path = ctx.os.join(&ctx.input_dir, &self.relative_entry);

        let tsc_command = match &self.tsc_flags {
            Some(flags) => {
                let command = format!("{} \"{}\" {}", ctx.tsc_runner, entry_path, flags);
                entry_path = TS_EXTENSION.replace(&entry_path, ".${1}js${2}").into_owned();
                command
            }
            None => String::new(),
        };

        let esbuild_command = self.esbuild_command(ctx, &entry_path);
        let deps_command = self.deps_command(ctx);

        let hooks = self.options.command_hooks.as_deref();
        let (input, output) = (ctx.input_dir.as_str(), ctx.output_dir.as_str());

        let mut fragments: Vec<String> = Vec::new();
        if let Some(hooks) = hooks {
            fragments.extend(hooks.before_install(input, output));
        }
        fragments.push(deps_command);
        fragments.push(tsc_command);
        if let Some(hooks) = hooks {
            fragments.extend(hooks.before_bundling(input, output));
        }
        fragments.push(esbuild_command);
        if let Some(hooks) = hooks {
            fragments.extend(hooks.after_bundling(input, output));
        }

        chain(&fragments)
    }

    /// Renders `[shell, flag, chain]`, ready to spawn.
    pub fn shell_command(&self, ctx: &CommandContext) -> Vec<String> {
        let [program, flag] = ctx.os.shell();
        vec![program.to_string(), flag.to_string(), self.render(ctx)]
    }

    fn esbuild_command(&self, ctx: &CommandContext, entry_path: &str) -> String {
        let o = &self.options;
        let out_file = OutputFormat::out_file(o.format);
        let target = o
            .target
            .clone()
            .unwrap_or_else(|| o.runtime.esbuild_target());

        let mut args: Vec<String> = vec![
            ctx.esbuild_runner.clone(),
            "--bundle".to_string(),
            format!("\"{entry_path}\""),
            format!("--target={target}"),
            "--platform=node".to_string(),
        ];
        if let Some(format) = o.format {
            args.push(format!("--format={}", format.as_str()));
        }
        args.push(format!(
            "--outfile=\"{}\"",
            ctx.os.join(&ctx.output_dir, out_file)
        ));
        if o.minify {
            args.push("--minify".to_string());
        }
        if o.source_map {
            let mode = o.source_map_mode.unwrap_or_default();
            args.push(format!("--sourcemap{}", mode.flag_suffix()));
        }
        if !o.sources_content {
            args.push("--sources-content=false".to_string());
        }
        args.extend(o.externals().iter().map(|m| format!("--external:{m}")));
        args.extend(
            o.loader
                .iter()
                .map(|(ext, loader)| format!("--loader:{ext}={loader}")),
        );
        args.extend(
            o.define
                .iter()
                .map(|(key, value)| format!("--define:{key}={}", json_string(value))),
        );
        if let Some(level) = o.log_level {
            args.push(format!("--log-level={}", level.as_str()));
        }
        if o.keep_names {
            args.push("--keep-names".to_string());
        }
        if let Some(tsconfig) = &self.relative_tsconfig {
            args.push(format!(
                "--tsconfig=\"{}\"",
                ctx.os.join(&ctx.input_dir, tsconfig)
            ));
        }
        if o.metafile {
            args.push(format!(
                "--metafile=\"{}\"",
                ctx.os.join(&ctx.output_dir, "index.meta.json")
            ));
        }
        if let Some(banner) = &o.banner {
            args.push(format!("--banner:js={}", json_string(banner)));
        }
        if let Some(footer) = &o.footer {
            args.push(format!("--footer:js={}", json_string(footer)));
        }
        if !o.main_fields.is_empty() {
            args.push(format!("--main-fields={}", o.main_fields.join(",")));
        }
        args.extend(o.inject.iter().map(|file| format!("--inject:\"{file}\"")));
        if let Some(charset) = o.charset {
            args.push(format!("--charset={}", charset.as_str()));
        }
        args.extend(to_cli_args(&o.esbuild_args));

        args.join(" ")
    }

    fn deps_command(&self, ctx: &CommandContext) -> String {
        let Some(dependencies) = &self.dependencies else {
            return String::new();
        };
        let os = ctx.os;
        let out = |name: &str| os.join(&ctx.output_dir, name);
        let pm = self.package_manager;

        let mut steps = Vec::new();
        if pm == PackageManager::Pnpm {
            steps.push(os.write(&out("pnpm-workspace.yaml"), ""));
        }
        if pm == PackageManager::YarnBerry {
            let linker = if self.options.pnp {
                "nodeLinker: pnp"
            } else {
                "nodeLinker: node-modules"
            };
            steps.push(os.write(&out(".yarnrc.yml"), linker));
        }
        let manifest = serde_json::json!({ "dependencies": dependencies });
        steps.push(os.write(&out("package.json"), &manifest.to_string()));
        steps.push(os.copy(
            &os.join(&ctx.input_dir, &self.relative_lock_file),
            &out(&self.lock_file_name),
        ));

        let mut install = vec![pm.install_command().join(" ")];
        if pm == PackageManager::Pnpm {
            install.push(os.remove(&os.join(&ctx.output_dir, "node_modules/.modules.yaml")));
        }
        steps.push(os.in_directory(&ctx.output_dir, &install));

        chain(&steps)
    }
}

fn relative_to_root(options: &BundlingOptions, path: &Path, what: &str) -> Result<String> {
    path.strip_prefix(&options.project_root)
        .map(to_posix)
        .map_err(|_| {
            Error::configuration(format!(
                "The {} `{}` must be located inside the project root `{}`",
                what,
                path.display(),
                options.project_root.display()
            ))
        })
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Renders extra esbuild arguments.
///
/// `true` or `""` emits the bare flag, `false` nothing, anything else
/// `flag="value"` (or `flag:"value"` for flags esbuild accepts repeatedly).
pub fn to_cli_args(args: &BTreeMap<String, EsbuildArg>) -> Vec<String> {
    args.iter()
        .filter_map(|(flag, value)| match value {
            EsbuildArg::Flag(true) => Some(flag.clone()),
            EsbuildArg::Flag(false) => None,
            EsbuildArg::Value(v) if v.is_empty() => Some(flag.clone()),
            EsbuildArg::Value(v) if RESPECIFIABLE_FLAGS.contains(&flag.as_str()) => {
                Some(format!("{flag}:\"{v}\""))
            }
            EsbuildArg::Value(v) => Some(format!("{flag}=\"{v}\"")),
        })
        .collect()
}
