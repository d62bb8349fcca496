#![allow(dead_code)]

use handler_bundler::bundler::{BundlingEngine, Installation, ToolCache};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Node.js project in a temp dir.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Project with `lib/handler.ts`, a `package.json` and the given lock file.
    pub fn with_lock_file(lock_file: &str) -> Self {
        let project = Self::new();
        project.write("lib/handler.ts", "export const handler = async () => 'ok';\n");
        project.write(
            "package.json",
            r#"{"name":"demo","dependencies":{"delay":"5.0.0"},"devDependencies":{"esbuild":"0.21.5"}}"#,
        );
        project.write(lock_file, "");
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write fixture file");
        path
    }

    pub fn entry(&self) -> PathBuf {
        self.path("lib/handler.ts")
    }
}

/// Engine that believes neither esbuild nor tsc is installed.
pub fn engine_without_host_tools() -> BundlingEngine {
    let tools = ToolCache::new();
    tools.insert("esbuild", None);
    tools.insert("tsc", None);
    BundlingEngine::with_tools(tools)
}

/// Engine that believes esbuild `version` is on PATH (and tsc too).
pub fn engine_with_esbuild(version: &str, local: bool) -> BundlingEngine {
    let tools = ToolCache::new();
    tools.insert(
        "esbuild",
        Some(Installation {
            local,
            version: version.to_string(),
        }),
    );
    tools.insert(
        "tsc",
        Some(Installation {
            local,
            version: "5.4.5".to_string(),
        }),
    );
    BundlingEngine::with_tools(tools)
}
