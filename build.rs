// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=QUICKSHOT_VERSION");

    // Packaged builds (flatpak, distro) pin the version explicitly
    let version = std::env::var("QUICKSHOT_VERSION")
        .ok()
        .or_else(describe_head)
        .unwrap_or_else(|| std::env::var("CARGO_PKG_VERSION").unwrap_or_default());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version from `git describe`, formatted as `0.1.0-abcdef1` on a tag and
/// `0.1.0-dirty-abcdef1` for commits after it.
fn describe_head() -> Option<String> {
    let describe = git(&["describe", "--tags", "--always", "--match", "v*"])?;
    let describe = describe.strip_prefix('v').unwrap_or(&describe).to_string();
    let hash = git(&["rev-parse", "--short", "HEAD"])?;

    let parts: Vec<&str> = describe.rsplitn(3, '-').collect();
    match parts.as_slice() {
        [_hash, _commits, base] => Some(format!("{}-dirty-{}", base, hash)),
        _ if describe == hash => Some(hash),
        _ => Some(format!("{}-{}", describe, hash)),
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
