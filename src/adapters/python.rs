use crate::domain::ports::ScriptRunner;
use crate::utils::error::{ReqrunError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::ExitStatus;
use tokio::process::Command;

/// Runs the target script with inherited stdio.
#[derive(Debug, Clone)]
pub struct PythonRunner {
    python: String,
}

impl PythonRunner {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }
}

#[async_trait]
impl ScriptRunner for PythonRunner {
    async fn run_script(&self, script: &Path) -> Result<Option<i32>> {
        let status = Command::new(&self.python)
            .arg(script)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| ReqrunError::SpawnError {
                program: self.python.clone(),
                source,
            })?;

        Ok(exit_code(status))
    }
}

/// Shell convention: a child killed by signal N reports 128 + N.
fn exit_code(status: ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(128 + signal);
        }
    }
    status.code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_interpreter() {
        let runner = PythonRunner::new("/nonexistent/reqrun-python");
        let result = runner.run_script(Path::new("main.py")).await;
        assert!(matches!(result, Err(ReqrunError::SpawnError { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_death_maps_to_shell_code() {
        use std::os::unix::process::ExitStatusExt;

        // SIGINT (2) 以 raw wait status 表示
        assert_eq!(exit_code(ExitStatus::from_raw(2)), Some(130));
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), Some(3));
    }
}
