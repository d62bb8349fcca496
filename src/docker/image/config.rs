//! Docker image configuration and constants.

use std::time::Duration;

/// Repository name for images built from the embedded Dockerfile.
pub const BUNDLING_IMAGE_REPOSITORY: &str = "handler-bundler";

/// Dockerfile for the default bundling image.
///
/// Build args: `IMAGE` (runtime base image), `ESBUILD_VERSION`.
pub const BUNDLING_DOCKERFILE: &str = include_str!("Dockerfile");

/// Environment variable naming the docker executable (`docker` when unset).
pub const DOCKER_EXECUTABLE_ENV: &str = "HANDLER_BUNDLER_DOCKER";

/// Docker executable used for every `docker` invocation.
pub fn docker_executable() -> String {
    std::env::var(DOCKER_EXECUTABLE_ENV)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "docker".to_string())
}

/// Timeout for Docker info check (5 seconds)
/// Quick daemon availability check shouldn't take long
pub const DOCKER_INFO_TIMEOUT: Duration = Duration::from_secs(5);

/// Platform-specific Docker startup instructions
#[cfg(target_os = "macos")]
pub const DOCKER_START_HELP: &str = "Start Docker Desktop from Applications or Spotlight";

#[cfg(target_os = "linux")]
pub const DOCKER_START_HELP: &str = "Start Docker daemon: sudo systemctl start docker";

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub const DOCKER_START_HELP: &str = "Start Docker Desktop";
