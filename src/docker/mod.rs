//! Docker container integration for bundling.
//!
//! Used whenever esbuild cannot run on the host or container bundling is forced.
//!
//! # Module Structure
//!
//! - `bundler` - Container execution strategy of a bundling request
//! - `container_runner` - `docker run` argument assembly and execution
//! - `image` - Default image build and availability checks

mod bundler;
mod container_runner;
pub mod image;

pub use bundler::ContainerBundling;
pub use container_runner::{
    BUNDLING_INPUT_DIR, BUNDLING_OUTPUT_DIR, ContainerRunner, RunOptions, Volume, default_user,
};
pub use image::DockerImage;
