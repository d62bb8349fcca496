//! Docker image management for container bundling.
//!
//! Handles the default bundling image built from the embedded Dockerfile and
//! caller-provided registry images.

mod availability;
mod builder;
mod config;
mod manager;

// Re-export public API
pub use availability::check_docker_available;
pub use config::{
    BUNDLING_DOCKERFILE, BUNDLING_IMAGE_REPOSITORY, DOCKER_EXECUTABLE_ENV, docker_executable,
};
pub use manager::DockerImage;
