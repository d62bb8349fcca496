//! Bundling on the host.

use crate::bundler::{
    Error, Result,
    builder::{BundlingCommand, CommandContext, ESBUILD_MAJOR_VERSION, Installation},
    utils::exec::{ExecOptions, run_streaming},
};
use std::{collections::BTreeMap, path::Path, path::PathBuf};

/// Host execution strategy.
///
/// Constructed only when the tools were found. The esbuild version is checked
/// when [`LocalBundling::bundle`] runs, not at construction.
#[derive(Clone, Debug)]
pub struct LocalBundling {
    pub(crate) command: BundlingCommand,
    /// Rendering context; the output directory is filled in at run time.
    pub(crate) context: CommandContext,
    /// Working directory of the shell.
    pub project_root: PathBuf,
    /// Merged over the host environment.
    pub environment: BTreeMap<String, String>,
    pub esbuild: Installation,
    pub tsc: Option<Installation>,
}

impl LocalBundling {
    /// Shell command that writes the bundle to `output_dir`.
    pub fn shell_command(&self, output_dir: &Path) -> Vec<String> {
        let ctx = CommandContext {
            output_dir: output_dir.to_string_lossy().into_owned(),
            ..self.context.clone()
        };
        self.command.shell_command(&ctx)
    }

    /// Runs the bundling command on the host.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolVersionMismatch`] when the detected esbuild is not
    ///   version `0.x`
    /// - [`Error::BuildExecution`] when the command exits unsuccessfully
    pub async fn bundle(&self, output_dir: &Path) -> Result<()> {
        if self.esbuild.major() != Some(ESBUILD_MAJOR_VERSION) {
            return Err(Error::ToolVersionMismatch {
                tool: "esbuild".to_string(),
                expected: ESBUILD_MAJOR_VERSION,
                found: self.esbuild.version.clone(),
            });
        }

        let command = self.shell_command(output_dir);
        let Some((program, args)) = command.split_first() else {
            return Err(Error::GenericError("Empty bundling command".to_string()));
        };

        log::info!("Bundling locally with esbuild {}", self.esbuild.version);
        log::debug!("{}", command.join(" "));

        let options = ExecOptions {
            cwd: Some(self.project_root.clone()),
            env: self.environment.clone(),
        };
        run_streaming(program, args, &options)
            .await?
            .check(&command.join(" "))?;
        Ok(())
    }
}
