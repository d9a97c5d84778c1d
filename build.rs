use std::process::Command;

/// Short commit hash of the checkout, when built from a git tree.
fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    let package_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let app_version = match git_short_hash() {
        Some(hash) => format!("{}-{}", package_version, hash),
        None => package_version,
    };
    println!("cargo:rustc-env=APP_VERSION={}", app_version);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
