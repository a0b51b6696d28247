//! Embeds the build date and git revision shown by `eveset version`

use std::process::Command;

fn main() {
    println!(
        "cargo:rustc-env=BUILD_DATE={}",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    let sha = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string());
    if let Some(sha) = sha {
        println!("cargo:rustc-env=GIT_SHA={}", sha);
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
}
