//! Shared helpers: file system, shell fragments and process execution.

pub mod exec;
pub mod fs;
pub mod os_command;
