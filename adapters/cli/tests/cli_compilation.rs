use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "shoko-rocket"])
        .status()
        .expect("failed to invoke cargo check for shoko-rocket CLI binary");

    assert!(status.success(), "cargo check --bin shoko-rocket should succeed");
}
