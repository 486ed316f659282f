// Runs a confirmed command in a shell subprocess with a bounded timeout

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::error::NlshError;

/// Default wall-clock limit for an executed command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Exit code reported when the timeout fires, matching coreutils
/// `timeout`.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

#[derive(Debug)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// Run `command` under `sh -c`, capturing output. Blocks the request
/// flow until the subprocess exits or the timeout elapses; on timeout
/// the child is killed and the result carries `timed_out = true`.
pub async fn run(command: &str, limit: Duration) -> Result<ExecutionResult, NlshError> {
    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // Dropping the wait future on timeout must take the child with it.
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| NlshError::Execution(format!("failed to spawn shell: {}", e)))?;

    match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(ExecutionResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            timed_out: false,
        }),
        Ok(Err(e)) => Err(NlshError::Execution(format!(
            "failed to collect command output: {}",
            e
        ))),
        Err(_) => Ok(ExecutionResult {
            exit_code: TIMEOUT_EXIT_CODE,
            stdout: String::new(),
            stderr: format!("command exceeded the {}s timeout", limit.as_secs()),
            timed_out: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout_and_exit_code() {
        let result = run("echo hello world", DEFAULT_TIMEOUT).await.unwrap();
        assert!(result.success());
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "hello world");
        assert!(result.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_run_captures_failure() {
        let result = run("echo oops >&2; exit 3", DEFAULT_TIMEOUT).await.unwrap();
        assert!(!result.success());
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stderr.trim(), "oops");
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let result = run("sleep 5", Duration::from_millis(100)).await.unwrap();
        assert!(result.timed_out);
        assert_eq!(result.exit_code, TIMEOUT_EXIT_CODE);
    }
}
