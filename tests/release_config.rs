//! Packaging checks for the shipped binary.

const CARGO_TOML: &str = include_str!("../Cargo.toml");

#[test]
fn release_profile_is_size_optimized() {
    let profile = CARGO_TOML
        .split("[profile.release]")
        .nth(1)
        .expect("Cargo.toml must have a [profile.release] section");

    for setting in ["lto = true", "strip = true", "codegen-units = 1", "opt-level = \"z\""] {
        assert!(profile.contains(setting), "release profile is missing `{}`", setting);
    }
}

#[test]
fn binary_is_named_wrkmon_setup() {
    let bin = CARGO_TOML
        .split("[[bin]]")
        .nth(1)
        .expect("Cargo.toml must declare a [[bin]] target");
    assert!(bin.contains("name = \"wrkmon-setup\""));
    assert!(bin.contains("path = \"src/main.rs\""));
}

#[test]
fn http_client_avoids_native_tls() {
    let reqwest = CARGO_TOML
        .lines()
        .find(|l| l.starts_with("reqwest"))
        .expect("reqwest dependency");
    assert!(reqwest.contains("default-features = false"));
    assert!(reqwest.contains("rustls"));
}
