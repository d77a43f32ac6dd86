//! Subprocess helpers shared by the kustomize and flux runners

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

/// Resolve a command name to its full path using `which` / `where`.
pub fn find_executable(command: &str) -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let which_cmd = "where";
    #[cfg(not(target_os = "windows"))]
    let which_cmd = "which";

    let output = Command::new(which_cmd).arg(command).output().ok()?;

    if output.status.success() {
        let path_str = String::from_utf8_lossy(&output.stdout);
        let first_line = path_str.lines().next()?.trim();
        if !first_line.is_empty() {
            return Some(PathBuf::from(first_line));
        }
    }
    None
}

/// Like [`find_executable`], but a missing binary is an error.
pub fn require_executable(command: &str) -> Result<PathBuf> {
    find_executable(command).ok_or_else(|| Error::ExecutableNotFound {
        name: command.to_string(),
    })
}

/// Printable command line, used in errors and logs.
pub fn command_line(program: &Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Run `program` with `args` and capture its output.
///
/// With `keep_stderr == false` stderr goes to the null device; kustomize
/// prints deprecation noise there that nobody asked for.
pub fn run(program: &Path, args: &[String], keep_stderr: bool) -> Result<Output> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if !keep_stderr {
        cmd.stderr(Stdio::null());
    }
    tracing::debug!(command = %command_line(program, args), "Running");
    cmd.output().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::ExecutableNotFound {
            name: program.display().to_string(),
        },
        _ => Error::Io(e),
    })
}

/// Turn a finished process into its stdout, or [`Error::CommandFailed`].
pub fn stdout_or_failure(program: &Path, args: &[String], output: Output) -> Result<String> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        Err(Error::CommandFailed {
            command: command_line(program, args),
            code,
            stderr,
        })
    }
}
