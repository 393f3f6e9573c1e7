mod fixture;

use fixture::MANIFEST;

#[test]
fn test_dry_run() {
    let env = fixture::Environment::default_project();
    let res = env.run_version_sync(["--dry-run"]);

    insta::assert_snapshot!(res.output(), @r#"
    --- CODE: 0
    --- STDOUT:
    [package]
    name = "foo"
    version = "1.2.3"
    edition = "2021"

    --- STDERR:

    --- END
    "#);
    assert_eq!(env.read("lib/Cargo.toml"), MANIFEST);
}

#[cfg(unix)]
#[test]
fn test_dry_run_closed_stdout() {
    let env = fixture::Environment::default_project();

    let (reader, writer) = std::io::pipe().unwrap();
    drop(reader);

    let output = env
        .std_command()
        .arg("--dry-run")
        .stdout(writer)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(output.stderr.is_empty(), "{output:?}");
    assert_eq!(env.read("lib/Cargo.toml"), MANIFEST);
}
