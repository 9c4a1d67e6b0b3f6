use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::error::{OrcaError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Exit code reported when the child was terminated by a signal.
pub const SIGNALLED: i32 = -1;

/// Launches an external program and blocks until it exits.
///
/// The adapter only talks to this seam, so tests can substitute a scripted
/// runner that writes canned output files.
pub trait ProcessRunner: Send + Sync {
    /// Runs `executable args...` inside `work_dir` with stdout and stderr both
    /// redirected to `sink`, returning the exit code.
    fn run(
        &self,
        executable: &str,
        args: &[&str],
        work_dir: &Path,
        sink: &Path,
        timeout: Option<Duration>,
    ) -> Result<i32>;
}

/// Runs real processes via `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        executable: &str,
        args: &[&str],
        work_dir: &Path,
        sink: &Path,
        timeout: Option<Duration>,
    ) -> Result<i32> {
        // ORCA insists on an absolute path when it starts its parallel workers.
        let program = resolve_executable(executable)?;

        let out = File::create(sink)?;
        let err = out.try_clone()?;

        let mut child = Command::new(&program)
            .args(args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(out))
            .stderr(Stdio::from(err))
            .spawn()?;

        let status = match timeout {
            None => child.wait()?,
            Some(limit) => {
                let start = Instant::now();
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if start.elapsed() >= limit {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(OrcaError::Timeout {
                            executable: executable.to_string(),
                            limit,
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        Ok(status.code().unwrap_or(SIGNALLED))
    }
}

/// Resolves an executable name against `PATH`.
///
/// Names containing a path separator are taken as paths relative to the
/// current directory. The result is always absolute, since the child runs in
/// the job's working directory.
pub fn resolve_executable(name: &str) -> Result<PathBuf> {
    let not_found = || OrcaError::ExecutableNotFound(name.to_string());

    let candidate = Path::new(name);
    let found = if candidate.components().count() > 1 {
        Some(candidate.to_path_buf()).filter(|p| p.is_file())
    } else {
        let path_var = env::var_os("PATH").ok_or_else(not_found)?;
        env::split_paths(&path_var)
            .map(|dir| dir.join(name))
            .find(|p| p.is_file())
    };

    let path = found.ok_or_else(not_found)?;
    fs::canonicalize(&path).map_err(|_| not_found())
}
