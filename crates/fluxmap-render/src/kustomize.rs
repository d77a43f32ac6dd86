//! `kustomize build` executor

use std::path::PathBuf;

use fluxmap_fs::NormalizedPath;

use crate::error::Result;
use crate::exec;

/// Renders a kustomize build directory into a YAML stream.
pub trait KustomizeBuilder {
    fn build(&self, dir: &NormalizedPath) -> Result<String>;
}

/// [`KustomizeBuilder`] backed by the `kustomize` binary.
#[derive(Debug, Clone)]
pub struct KustomizeCli {
    program: PathBuf,
    helm: Option<PathBuf>,
}

impl KustomizeCli {
    /// Locate `kustomize` and, optionally, a helm binary on `PATH`.
    ///
    /// Helm charts are only inflated when `helm` (or `helmV3`) is found.
    pub fn discover() -> Result<Self> {
        let program = exec::require_executable("kustomize")?;
        let helm = exec::find_executable("helm").or_else(|| exec::find_executable("helmV3"));
        if helm.is_none() {
            tracing::info!("helm binary not found. helm will be disabled");
        }
        Ok(Self { program, helm })
    }

    pub fn with_program(program: impl Into<PathBuf>, helm: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            helm,
        }
    }

    pub fn helm_enabled(&self) -> bool {
        self.helm.is_some()
    }

    /// Arguments for building `dir`.
    pub fn args(&self, dir: &NormalizedPath) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            dir.as_str().to_string(),
            "--load-restrictor".to_string(),
            "LoadRestrictionsNone".to_string(),
        ];
        if let Some(helm) = &self.helm {
            args.push("--enable-helm".to_string());
            args.push("--helm-command".to_string());
            args.push(helm.display().to_string());
        }
        args
    }
}

impl KustomizeBuilder for KustomizeCli {
    fn build(&self, dir: &NormalizedPath) -> Result<String> {
        let args = self.args(dir);
        let output = exec::run(&self.program, &args, false)?;
        exec::stdout_or_failure(&self.program, &args, output)
    }
}
