use thiserror::Error;

/// Errors raised while producing diff text from a command.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The command could not be started at all.
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Errors raised while turning diff text into markup.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The configured syntax theme does not exist.
    #[error("Unknown syntax theme: {0}")]
    UnknownTheme(String),

    /// Highlighting failed on the given input.
    #[error("Highlighting failed: {0}")]
    Highlight(#[from] syntect::Error),
}

/// Why a refresh left the panel content untouched.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// The host rejected the new document.
    #[error("Failed to update panel: {0}")]
    Host(String),
}

/// Errors from panel construction and stale access.
#[derive(Debug, Error)]
pub enum PanelError {
    /// The panel was already disposed and cannot be used again.
    #[error("Panel has been disposed")]
    Disposed,

    /// The host could not create or update the panel.
    #[error("Host error: {0}")]
    Host(String),
}
