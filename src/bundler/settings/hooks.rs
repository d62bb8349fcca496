//! Command hooks run around the bundling steps.

use std::fmt;

/// Shell fragments to run at fixed points of the bundling command.
///
/// Each method receives the input directory (project root) and the output
/// directory as they appear to the shell that runs the command: host paths for
/// local bundling, `/asset-input` and `/asset-output` inside the container.
/// Returned fragments are chained with `&&`, so a failing fragment stops the
/// build. An empty list contributes nothing.
pub trait CommandHooks: Send + Sync + fmt::Debug {
    /// Runs before dependencies are installed into the output directory.
    fn before_install(&self, input_dir: &str, output_dir: &str) -> Vec<String>;

    /// Runs before esbuild (after pre-compilation).
    fn before_bundling(&self, input_dir: &str, output_dir: &str) -> Vec<String>;

    /// Runs after esbuild.
    fn after_bundling(&self, input_dir: &str, output_dir: &str) -> Vec<String>;
}

/// Hooks written as plain command templates, as found in config files.
///
/// `{inputDir}` and `{outputDir}` are replaced by the directories passed in.
///
/// ```toml
/// [command_hooks]
/// after_bundling = ["cp {inputDir}/config.json {outputDir}"]
/// ```
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct TemplateHooks {
    /// Fragments run before dependency installation.
    #[serde(default)]
    pub before_install: Vec<String>,

    /// Fragments run before esbuild.
    #[serde(default)]
    pub before_bundling: Vec<String>,

    /// Fragments run after esbuild.
    #[serde(default)]
    pub after_bundling: Vec<String>,
}

impl TemplateHooks {
    fn render(templates: &[String], input_dir: &str, output_dir: &str) -> Vec<String> {
        templates
            .iter()
            .map(|t| {
                t.replace("{inputDir}", input_dir)
                    .replace("{outputDir}", output_dir)
            })
            .collect()
    }

    /// True when no hook has any fragment.
    pub fn is_empty(&self) -> bool {
        self.before_install.is_empty()
            && self.before_bundling.is_empty()
            && self.after_bundling.is_empty()
    }
}

impl CommandHooks for TemplateHooks {
    fn before_install(&self, input_dir: &str, output_dir: &str) -> Vec<String> {
        Self::render(&self.before_install, input_dir, output_dir)
    }

    fn before_bundling(&self, input_dir: &str, output_dir: &str) -> Vec<String> {
        Self::render(&self.before_bundling, input_dir, output_dir)
    }

    fn after_bundling(&self, input_dir: &str, output_dir: &str) -> Vec<String> {
        Self::render(&self.after_bundling, input_dir, output_dir)
    }
}
