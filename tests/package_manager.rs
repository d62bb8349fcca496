use handler_bundler::bundler::{
    Error, LOCK_FILES, LockFile, PackageManager, utils::os_command::OsPlatform,
};
use std::path::Path;

// ── lock file selection ──

#[test]
fn test_every_lock_file_selects_its_package_manager() {
    let cases = [
        ("package-lock.json", PackageManager::Npm),
        ("yarn.lock", PackageManager::Yarn),
        ("pnpm-lock.yaml", PackageManager::Pnpm),
        ("bun.lockb", PackageManager::Bun),
        ("bun.lock", PackageManager::Bun),
    ];
    for (name, expected) in cases {
        let path = Path::new("/project").join(name);
        let pm = PackageManager::from_lock_file(&path).expect("known lock file");
        assert_eq!(pm, expected, "wrong package manager for {name}");
    }
    assert_eq!(LOCK_FILES.len(), cases.len());
}

#[test]
fn test_lock_file_names_match_exactly() {
    assert_eq!(LockFile::from_file_name("yarn.lock"), Some(LockFile::Yarn));
    assert_eq!(LockFile::from_file_name("Yarn.lock"), None);
    assert_eq!(LockFile::from_file_name("package-lock.json.bak"), None);
}

#[test]
fn test_unknown_lock_file_is_a_resource_error() {
    let err = PackageManager::from_lock_file(Path::new("/project/deps.lock"))
        .expect_err("unknown lock file");
    assert!(matches!(err, Error::ResourceResolution(_)), "got {err:?}");
    assert!(err.to_string().contains("deps.lock"));
}

#[test]
fn test_yarn_berry_detected_from_metadata_header() {
    let dir = tempfile::tempdir().expect("temp dir");
    let lock = dir.path().join("yarn.lock");
    std::fs::write(
        &lock,
        "# This file is generated by running \"yarn install\"\n\n__metadata:\n  version: 6\n",
    )
    .expect("write lock file");
    assert_eq!(
        PackageManager::from_lock_file(&lock).expect("berry lock"),
        PackageManager::YarnBerry
    );

    std::fs::write(&lock, "# yarn lockfile v1\n\n\"delay@^5.0.0\":\n  version \"5.0.0\"\n")
        .expect("write lock file");
    assert_eq!(
        PackageManager::from_lock_file(&lock).expect("classic lock"),
        PackageManager::Yarn
    );
}

// ── command templates ──

#[test]
fn test_install_command_templates() {
    assert_eq!(PackageManager::Npm.install_command().join(" "), "npm ci");
    assert_eq!(
        PackageManager::Yarn.install_command().join(" "),
        "yarn install --no-immutable"
    );
    assert_eq!(PackageManager::YarnBerry.install_command().join(" "), "yarn install");
    assert_eq!(
        PackageManager::Pnpm.install_command().join(" "),
        "pnpm install --config.node-linker=hoisted --config.package-import-method=clone-or-copy --no-prefer-frozen-lockfile"
    );
    assert_eq!(
        PackageManager::Bun.install_command().join(" "),
        "bun install --frozen-lockfile --backend copyfile"
    );
}

#[test]
fn test_run_local_binary_templates() {
    assert_eq!(
        PackageManager::Npm.run_bin_command("esbuild", OsPlatform::Unix),
        "npx --no-install esbuild"
    );
    assert_eq!(
        PackageManager::Yarn.run_bin_command("esbuild", OsPlatform::Unix),
        "yarn run esbuild"
    );
    assert_eq!(
        PackageManager::Pnpm.run_bin_command("tsc", OsPlatform::Unix),
        "pnpm exec -- tsc"
    );
    assert_eq!(
        PackageManager::Npm.run_bin_command("esbuild", OsPlatform::Windows),
        "npx --no-install esbuild.cmd"
    );
}
