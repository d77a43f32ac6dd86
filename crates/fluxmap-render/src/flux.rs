//! `flux build kustomization` / `flux diff kustomization` runner

use std::path::PathBuf;

use fluxmap_core::Manifest;
use fluxmap_fs::NormalizedPath;

use crate::error::{Error, Result};
use crate::exec;

/// Stderr suffix of `flux diff` when the diff is non-empty. The command
/// exits non-zero in that case but its stdout is the diff we want.
pub const CHANGE_DETECTED: &str = "identified at least one change, exiting with non-zero exit code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluxAction {
    Build,
    Diff,
}

impl FluxAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Diff => "diff",
        }
    }
}

/// Runs the `flux` CLI against a resolved manifest.
#[derive(Debug, Clone)]
pub struct FluxCli {
    program: PathBuf,
}

impl FluxCli {
    /// Locate `flux` on `PATH`.
    pub fn discover() -> Result<Self> {
        let program = exec::find_executable("flux").ok_or_else(|| {
            tracing::error!("unable to find flux in path. is this installed?");
            Error::ExecutableNotFound {
                name: "flux".to_string(),
            }
        })?;
        Ok(Self { program })
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for `flux <action> kustomization` on `manifest`.
    pub fn args(action: FluxAction, manifest: &Manifest, root: &NormalizedPath) -> Vec<String> {
        let spec_path = manifest
            .absolute_spec_path(root)
            .map(|p| p.as_str().to_string())
            .unwrap_or_default();
        let mut args = vec![
            action.as_str().to_string(),
            "kustomization".to_string(),
            manifest.name.clone(),
            "-n".to_string(),
            manifest.namespace_or_default().to_string(),
            "--path".to_string(),
            spec_path,
            "--kustomization-file".to_string(),
            manifest.path.as_str().to_string(),
        ];
        match action {
            FluxAction::Build => {
                args.push("--dry-run".to_string());
                args.push("--strict-substitute".to_string());
            }
            FluxAction::Diff => {
                args.push("--strict-substitute".to_string());
                args.push("--progress-bar=false".to_string());
            }
        }
        args
    }

    pub fn build_args(manifest: &Manifest, root: &NormalizedPath) -> Vec<String> {
        Self::args(FluxAction::Build, manifest, root)
    }

    pub fn diff_args(manifest: &Manifest, root: &NormalizedPath) -> Vec<String> {
        Self::args(FluxAction::Diff, manifest, root)
    }

    pub fn build(&self, manifest: &Manifest, root: &NormalizedPath) -> Result<String> {
        self.run(&Self::build_args(manifest, root))
    }

    pub fn diff(&self, manifest: &Manifest, root: &NormalizedPath) -> Result<String> {
        self.run(&Self::diff_args(manifest, root))
    }

    /// Run `flux` with `args` and return its stdout.
    ///
    /// A failing `flux diff` that only reports detected changes counts as
    /// success.
    pub fn run(&self, args: &[String]) -> Result<String> {
        let output = exec::run(&self.program, args, true)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.trim_end().ends_with(CHANGE_DETECTED) {
                tracing::debug!("flux reported changes");
                return Ok(String::from_utf8_lossy(&output.stdout).to_string());
            }
        }
        let result = exec::stdout_or_failure(&self.program, args, output);
        if let Err(e) = &result {
            tracing::error!(error = %e, "flux exec");
        }
        result
    }
}
