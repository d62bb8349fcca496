#![cfg(unix)]

mod common;

use common::Project;
use handler_bundler::bundler::{Installation, ToolCache};
use std::os::unix::fs::PermissionsExt;

/// Puts `tool` in the project's `node_modules/.bin`. Every run appends a line
/// to `<tool>.calls`.
fn local_tool(project: &Project, tool: &str, body: &str) {
    let calls = project.path(&format!("{tool}.calls"));
    let script = project.write(
        &format!("node_modules/.bin/{tool}"),
        &format!("#!/bin/sh\necho \"$@\" >> \"{}\"\n{body}\n", calls.display()),
    );
    let mut permissions = std::fs::metadata(&script).expect("metadata").permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&script, permissions).expect("chmod");
}

fn calls(project: &Project, tool: &str) -> Vec<String> {
    std::fs::read_to_string(project.path(&format!("{tool}.calls")))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_project_local_tool_is_probed_once() {
    let project = Project::new();
    local_tool(&project, "tsc", "echo 'Version 5.4.5'");
    let tools = ToolCache::new();

    let expected = Some(Installation {
        local: true,
        version: "5.4.5".to_string(),
    });
    assert_eq!(tools.detect("tsc", project.root()), expected);
    assert_eq!(tools.detect("tsc", project.root()), expected);
    assert_eq!(calls(&project, "tsc"), ["--version"]);

    tools.reset();
    assert_eq!(tools.detect("tsc", project.root()), expected);
    assert_eq!(calls(&project, "tsc").len(), 2);
}

#[test]
fn test_local_version_output_is_trimmed() {
    let project = Project::new();
    local_tool(&project, "esbuild", "printf '0.21.5\\n\\n'");

    let installation = ToolCache::new()
        .detect("esbuild", project.root())
        .expect("esbuild");
    assert!(installation.local);
    assert_eq!(installation.version, "0.21.5");
    assert_eq!(installation.major(), Some(0));
}

#[test]
fn test_failed_probe_is_cached_as_missing() {
    let project = Project::new();
    local_tool(&project, "handler-bundler-broken-tool", "exit 1");
    let tools = ToolCache::new();

    assert_eq!(tools.detect("handler-bundler-broken-tool", project.root()), None);
    assert_eq!(tools.detect("handler-bundler-broken-tool", project.root()), None);
    assert_eq!(calls(&project, "handler-bundler-broken-tool").len(), 1);
}
