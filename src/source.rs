//! Where fresh diff text comes from.

use crate::error::ExecutionError;
use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use std::path::PathBuf;

/// Reserved watched path meaning "any save in the repository".
pub const WHOLE_REPOSITORY: &str = ".";

/// How a refresh obtains diff text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshSource {
    /// Re-run this command on every refresh
    Command(String),
    /// Use this text as-is
    DirectContent(String),
}

impl RefreshSource {
    /// The generating command, shown in the page for traceability
    pub fn command(&self) -> Option<&str> {
        match self {
            RefreshSource::Command(cmd) => Some(cmd),
            RefreshSource::DirectContent(_) => None,
        }
    }

    /// Resolve the current diff text. Only command sources suspend.
    pub async fn resolve(&self, runner: &dyn CommandRunner) -> Result<String, ExecutionError> {
        match self {
            RefreshSource::Command(cmd) => runner.run(cmd).await,
            RefreshSource::DirectContent(text) => Ok(text.clone()),
        }
    }
}

/// Which saves should refresh the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchedPath {
    WholeRepository,
    /// Matched as a plain suffix of the saved path, so both absolute and
    /// root-relative notifications work.
    Suffix(String),
}

impl WatchedPath {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        if path == WHOLE_REPOSITORY {
            WatchedPath::WholeRepository
        } else {
            WatchedPath::Suffix(path)
        }
    }

    pub fn matches(&self, saved_path: &str) -> bool {
        match self {
            WatchedPath::WholeRepository => true,
            WatchedPath::Suffix(suffix) => saved_path.ends_with(suffix.as_str()),
        }
    }
}

impl std::fmt::Display for WatchedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchedPath::WholeRepository => f.write_str(WHOLE_REPOSITORY),
            WatchedPath::Suffix(path) => f.write_str(path),
        }
    }
}

/// Produces diff text by executing a command.
pub trait CommandRunner {
    fn run(&self, command: &str) -> LocalBoxFuture<'static, Result<String, ExecutionError>>;
}

/// Runs commands through a shell in a fixed working directory.
pub struct ShellRunner {
    shell: String,
    cwd: PathBuf,
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
            cwd: cwd.into(),
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> LocalBoxFuture<'static, Result<String, ExecutionError>> {
        let shell = self.shell.clone();
        let cwd = self.cwd.clone();
        let command = command.to_string();

        async move {
            log::debug!("Running `{}` in {}", command, cwd.display());
            let output = tokio::process::Command::new(&shell)
                .arg("-c")
                .arg(&command)
                .current_dir(&cwd)
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|source| ExecutionError::Spawn {
                    command: command.clone(),
                    source,
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                return Err(ExecutionError::Failed {
                    command,
                    status: output.status.to_string(),
                    stderr,
                });
            }

            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        .boxed_local()
    }
}
