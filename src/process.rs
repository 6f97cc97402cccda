//! Process runner - shell command execution with streamed output
//!
//! The scanner CLI, Docker and the dependency-check tool are all driven through
//! shell command lines. [`CommandRunner`] is the seam the workflows depend on so
//! tests can record commands instead of running them.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Captured result of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
}

/// Executes shell command lines
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command, failing on a non-zero exit
    async fn run(&self, command: &str) -> Result<CommandOutput>;

    /// Run a best-effort command; failures are logged and swallowed
    async fn run_quiet(&self, command: &str) {
        if let Err(e) = self.run(command).await {
            tracing::warn!("Ignoring failure of `{}`: {}", command, e);
        }
    }
}

/// Runs commands through `bash -lc`, logging stdout line by line
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
        }
    }
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        tracing::debug!("Running: {}", command);

        let mut child = Command::new(&self.shell)
            .arg("-lc")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn `{}`", command))?;
        let pid = child.id();

        let stdout = child.stdout.take().context("stdout not captured")?;
        let mut stderr = child.stderr.take().context("stderr not captured")?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).into_owned()
        });

        // Tools print non UTF-8 bytes now and then; decode lossily instead of failing
        let mut output = String::new();
        let mut reader = BufReader::new(stdout);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            let read = reader
                .read_until(b'\n', &mut raw)
                .await
                .with_context(|| format!("Failed to read output of `{}`", command))?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            tracing::info!("{}", line);
            output.push_str(line);
            output.push('\n');
        }

        let status = child
            .wait()
            .await
            .with_context(|| format!("Failed to wait for `{}`", command))?;
        let err = stderr_task.await.unwrap_or_default();

        tracing::info!("PROCESS: {:?} return {:?}", pid, status.code());
        if !status.success() {
            tracing::error!("ERROR: {}", err.trim_end());
            bail!(
                "`{}` exited with {}: {}",
                command,
                status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                err.trim_end()
            );
        }

        Ok(CommandOutput {
            code: status.code(),
            stdout: output,
        })
    }
}

/// Quote a value for safe interpolation into a shell command line
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
pub mod testing {
    //! Recording runner for workflow tests

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    type Hook = Box<dyn Fn(&str) + Send + Sync>;

    #[derive(Default)]
    pub struct RecordingRunner {
        pub commands: Mutex<Vec<String>>,
        /// Canned stdout keyed by a command substring
        pub responses: Mutex<HashMap<String, String>>,
        /// Commands containing one of these substrings fail
        pub failures: Mutex<Vec<String>>,
        /// Side effect run for every successful command, e.g. creating output files
        pub hook: Mutex<Option<Hook>>,
    }

    impl RecordingRunner {
        pub fn on_run(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
            *self.hook.lock().expect("lock") = Some(Box::new(hook));
        }

        pub fn respond(&self, needle: &str, stdout: &str) {
            self.responses
                .lock()
                .expect("lock")
                .insert(needle.to_string(), stdout.to_string());
        }

        pub fn fail_on(&self, needle: &str) {
            self.failures.lock().expect("lock").push(needle.to_string());
        }

        pub fn recorded(&self) -> Vec<String> {
            self.commands.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, command: &str) -> Result<CommandOutput> {
            self.commands
                .lock()
                .expect("lock")
                .push(command.to_string());
            if self
                .failures
                .lock()
                .expect("lock")
                .iter()
                .any(|f| command.contains(f.as_str()))
            {
                bail!("`{}` exited with 1", command);
            }
            if let Some(hook) = self.hook.lock().expect("lock").as_ref() {
                hook(command);
            }
            let stdout = self
                .responses
                .lock()
                .expect("lock")
                .iter()
                .find(|(needle, _)| command.contains(needle.as_str()))
                .map(|(_, out)| out.clone())
                .unwrap_or_default();
            Ok(CommandOutput {
                code: Some(0),
                stdout,
            })
        }
    }
}
