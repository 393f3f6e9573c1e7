mod fixture;

use fixture::{MANIFEST, MANIFEST_SYNCED};

#[test]
fn test_check_out_of_sync() {
    let env = fixture::Environment::default_project();
    let res = env.run_version_sync(["--check"]);

    insta::assert_snapshot!(res.output(), @r"
    --- CODE: 1
    --- STDOUT:

    --- STDERR:
    error: Manifest 'lib/Cargo.toml' is out of sync with version 1.2.3
    hint: Run version-sync without --check to update it

    --- END
    ");
    assert_eq!(env.read("lib/Cargo.toml"), MANIFEST);
}

#[test]
fn test_check_in_sync() {
    let env = fixture::Environment::default_project();
    env.write("lib/Cargo.toml", MANIFEST_SYNCED);
    let res = env.run_version_sync(["--check"]);

    insta::assert_snapshot!(res.output(), @r"
    --- CODE: 0
    --- STDOUT:

    --- STDERR:

    --- END
    ");
}

#[test]
fn test_check_after_sync() {
    let env = fixture::Environment::default_project();
    env.command().assert().success();
    env.command().arg("--check").assert().success();
}

#[test]
fn test_check_conflicts_with_dry_run() {
    let env = fixture::Environment::default_project();
    env.command()
        .args(["--check", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("cannot be used with"));

    assert_eq!(env.read("lib/Cargo.toml"), MANIFEST);
}
