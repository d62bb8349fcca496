//! CPU architecture types and utilities.

use std::{fmt, str::FromStr};

/// CPU architecture of the function that runs the bundle.
///
/// Selects the docker platform used for container bundling so that native
/// dependencies installed next to the bundle match the target machine.
///
/// # Examples
///
/// ```no_run
/// use handler_bundler::bundler::Architecture;
///
/// let arch: Architecture = "arm64".parse().unwrap();
/// assert_eq!(arch.docker_platform(), "linux/arm64");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    /// x86_64 / AMD64 (64-bit)
    #[default]
    X86_64,
    /// AArch64 / ARM64 (64-bit)
    Arm64,
}

impl Architecture {
    /// Name as written in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "arm64",
        }
    }

    /// Value for `docker build --platform` / `docker run --platform`.
    pub fn docker_platform(&self) -> &'static str {
        match self {
            Self::X86_64 => "linux/amd64",
            Self::Arm64 => "linux/arm64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Architecture {
    type Err = crate::bundler::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Ok(Self::X86_64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            other => Err(crate::bundler::Error::configuration(format!(
                "Unknown architecture `{other}`. Valid architectures: x86_64, arm64"
            ))),
        }
    }
}
