#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use orca_relax::engine::error::OrcaError;
use orca_relax::engine::runner::{resolve_executable, ProcessRunner, SystemRunner};
use tempfile::tempdir;

#[test]
fn test_resolve_on_path() {
    let sh = resolve_executable("sh").expect("sh on PATH");
    assert!(sh.is_absolute());

    assert!(matches!(
        resolve_executable("definitely-not-orca-xyz"),
        Err(OrcaError::ExecutableNotFound(_))
    ));
    assert!(resolve_executable("/no/such/dir/orca").is_err());
}

#[test]
fn test_stdout_and_stderr_share_sink() {
    let dir = tempdir().unwrap();
    let sink = dir.path().join("job.out");

    let code = SystemRunner
        .run("sh", &["-c", "echo to-stdout; echo to-stderr 1>&2; exit 3"], dir.path(), &sink, None)
        .unwrap();

    assert_eq!(code, 3);
    let out = fs::read_to_string(&sink).unwrap();
    assert!(out.contains("to-stdout"));
    assert!(out.contains("to-stderr"));
}

#[test]
fn test_runs_in_work_dir() {
    let dir = tempdir().unwrap();
    let sink = dir.path().join("pwd.out");

    let code = SystemRunner
        .run("sh", &["-c", "touch marker"], dir.path(), &sink, Some(Duration::from_secs(30)))
        .unwrap();

    assert_eq!(code, 0);
    assert!(dir.path().join("marker").exists());
}

#[test]
fn test_timeout_kills_child() {
    let dir = tempdir().unwrap();
    let sink = dir.path().join("slow.out");

    let result = SystemRunner.run(
        "sh",
        &["-c", "sleep 10"],
        dir.path(),
        &sink,
        Some(Duration::from_millis(200)),
    );

    assert!(matches!(result, Err(OrcaError::Timeout { .. })));
}

#[test]
fn test_relative_executable_runs_from_job_dir() {
    // A script reachable only relative to the test's own directory.
    let tools = tempfile::tempdir_in(".").unwrap();
    let script = tools.path().join("fake_orca");
    fs::write(&script, "#!/bin/sh\necho \"ran with $1\"\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let relative = script.to_str().unwrap().to_string();
    assert!(Path::new(&relative).is_relative());
    assert!(resolve_executable(&relative).unwrap().is_absolute());

    let job = tempdir().unwrap();
    let sink = job.path().join("x.out");
    let code = SystemRunner
        .run(&relative, &["x.inp"], job.path(), &sink, None)
        .unwrap();

    assert_eq!(code, 0);
    assert!(fs::read_to_string(&sink).unwrap().contains("ran with x.inp"));
}
