//! Node.js runtime identifiers.

use regex::Regex;
use std::{fmt, str::FromStr, sync::LazyLock};

static RUNTIME_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^nodejs(\d+)\.x$").expect("runtime name pattern is valid")
});

/// Oldest Node.js major version that can load ECMAScript module handlers.
const ESM_MIN_MAJOR: u32 = 14;

/// First Node.js major version whose base image ships SDK v3 instead of v2.
const SDK_V3_MIN_MAJOR: u32 = 18;

/// Node.js runtime the handler targets, written as `nodejsNN.x`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Runtime {
    major: u32,
}

impl Runtime {
    /// Runtime used when none is configured.
    pub const DEFAULT: Runtime = Runtime { major: 20 };

    /// Creates a runtime for a Node.js major version.
    pub fn nodejs(major: u32) -> Self {
        Self { major }
    }

    /// Node.js major version.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Runtime identifier, e.g. `nodejs18.x`.
    pub fn name(&self) -> String {
        format!("nodejs{}.x", self.major)
    }

    /// Whether the runtime can load `.mjs` handlers.
    pub fn supports_esm(&self) -> bool {
        self.major >= ESM_MIN_MAJOR
    }

    /// Default esbuild `--target` for this runtime.
    pub fn esbuild_target(&self) -> String {
        format!("node{}", self.major)
    }

    /// Base image for container bundling.
    pub fn bundling_image(&self) -> String {
        format!("public.ecr.aws/sam/build-nodejs{}.x", self.major)
    }

    /// Modules already provided by the runtime and excluded from the bundle by default.
    pub fn default_externals(&self) -> Vec<String> {
        if self.major >= SDK_V3_MIN_MAJOR {
            vec!["@aws-sdk/*".to_string()]
        } else {
            vec!["aws-sdk".to_string()]
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Runtime {
    type Err = crate::bundler::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RUNTIME_NAME
            .captures(s.trim())
            .and_then(|caps| caps[1].parse().ok())
            .map(Runtime::nodejs)
            .ok_or_else(|| {
                crate::bundler::Error::configuration(format!(
                    "Unsupported runtime `{s}`: only `nodejsNN.x` runtimes are supported"
                ))
            })
    }
}

impl<'de> serde::Deserialize<'de> for Runtime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
