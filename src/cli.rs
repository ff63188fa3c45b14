use crate::host::ViewColumn;
use crate::source::{RefreshSource, WatchedPath, WHOLE_REPOSITORY};
use clap::{CommandFactory, Parser, ValueHint};
use clap_complete::{generate, Shell};
use std::io;
use std::path::{Component, Path, PathBuf};

/// diffpane - live HTML preview of a git diff
#[derive(Parser, Debug)]
#[command(name = "diffpane", version, about, long_about = None)]
pub struct Args {
    /// Git ref to diff the work tree against.
    /// If omitted, shows unstaged changes.
    #[arg(value_hint = ValueHint::Other)]
    pub target: Option<String>,

    /// Limit the diff to this path; only saves of this path refresh the preview
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: Option<String>,

    /// Run this command instead of the generated git diff
    #[arg(short, long, conflicts_with = "stdin")]
    pub command: Option<String>,

    /// Read diff text from stdin instead of running a command
    #[arg(long)]
    pub stdin: bool,

    /// Directory the preview is written to
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub out: Option<PathBuf>,

    /// Column to show the preview in: active, beside or a number
    #[arg(long)]
    pub column: Option<ViewColumn>,

    /// Render once and exit instead of watching for saves
    #[arg(long)]
    pub once: bool,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub completions: Option<Shell>,
}

/// What the preview shows and which saves refresh it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTarget {
    pub source: RefreshSource,
    pub watched_path: WatchedPath,
}

impl PreviewTarget {
    /// Build the target from the arguments. `base_command` is the configured
    /// diff command; `stdin_text` is only used with `--stdin`.
    pub fn from_args(args: &Args, base_command: &str, stdin_text: Option<String>) -> Self {
        let watched_path = WatchedPath::new(args.file.as_deref().unwrap_or(WHOLE_REPOSITORY));

        let source = match (stdin_text, &args.command) {
            (Some(text), _) if args.stdin => RefreshSource::DirectContent(text),
            (_, Some(command)) => RefreshSource::Command(command.clone()),
            _ => RefreshSource::Command(diff_command(
                base_command,
                args.target.as_deref(),
                args.file.as_deref(),
            )),
        };

        Self {
            source,
            watched_path,
        }
    }

    /// Rewrite a watched file typed relative to `cwd` as a path relative to
    /// the work tree at `root`, which is how saves under `root` end.
    pub fn anchored(mut self, cwd: &Path, root: &Path) -> Self {
        if let WatchedPath::Suffix(file) = &self.watched_path {
            if let Some(relative) = repo_relative_path(file, cwd, root) {
                self.watched_path = WatchedPath::new(relative);
            }
        }
        self
    }
}

/// `file` resolved against `cwd` and made relative to `root`, with `/`
/// separators. `None` if it lies outside `root`. Purely lexical, since the
/// file may not exist.
pub fn repo_relative_path(file: &str, cwd: &Path, root: &Path) -> Option<String> {
    let mut absolute = PathBuf::new();
    for component in cwd.join(file).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                absolute.pop();
            }
            other => absolute.push(other),
        }
    }

    let relative = absolute.strip_prefix(root).ok()?;
    if relative.as_os_str().is_empty() {
        return Some(WHOLE_REPOSITORY.to_string());
    }
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

/// `git diff [TARGET] [-- FILE]`, quoting what needs it for the shell
pub fn diff_command(base: &str, target: Option<&str>, file: Option<&str>) -> String {
    let mut command = base.to_string();
    if let Some(target) = target {
        command.push(' ');
        command.push_str(&shell_quote(target));
    }
    if let Some(file) = file.filter(|f| *f != WHOLE_REPOSITORY) {
        command.push_str(" -- ");
        command.push_str(&shell_quote(file));
    }
    command
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./~^@:+=,".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Generate shell completions to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    generate(shell, &mut cmd, "diffpane", &mut io::stdout());
}
