use crate::cli::{Args, PreviewTarget};
use crate::config::Config;
use crate::git::Repository;
use crate::host::{is_relevant_save, FileHost, PanelHost, SaveFeed, SaveWatcher};
use crate::panel::PanelContext;
use crate::registry::{PanelRegistry, ShowRequest};
use crate::render::{
    SyntectRenderer, PREVIEW_CSS, PREVIEW_JS, SCRIPT_ASSETS, STYLESHEET_ASSETS,
};
use crate::source::ShellRunner;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tokio::task::LocalSet;

pub struct App {
    args: Args,
    config: Config,
    repo: Option<Repository>,
    cwd: PathBuf,
    target: PreviewTarget,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = crate::config::load();

        // Piped diffs don't need a repository; everything else does.
        let repo = match Repository::open_current_dir() {
            Ok(repo) => Some(repo),
            Err(e) if args.stdin => {
                log::debug!("No repository, watching the current directory: {:#}", e);
                None
            }
            Err(e) => return Err(e),
        };

        let stdin_text = if args.stdin {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read diff from stdin")?;
            Some(text)
        } else {
            None
        };

        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let cwd = std::fs::canonicalize(&cwd).unwrap_or(cwd);
        let target = preview_target(&args, &config, stdin_text, &cwd, repo.as_ref())?;

        Ok(Self {
            args,
            config,
            repo,
            cwd,
            target,
        })
    }

    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start runtime")?;
        let local = LocalSet::new();
        local.block_on(&runtime, self.serve())
    }

    async fn serve(self) -> Result<()> {
        let root = match &self.repo {
            Some(repo) => repo.workdir()?,
            None => self.cwd.clone(),
        };
        let out_dir = self
            .args
            .out
            .clone()
            .unwrap_or_else(|| self.config.output_dir());

        let renderer = Rc::new(SyntectRenderer::new());
        let theme_css = renderer
            .stylesheet(&self.config.syntax_theme)
            .with_context(|| {
                let known: Vec<&str> = renderer.theme_names().collect();
                format!("Failed to load syntax theme (available: {})", known.join(", "))
            })?;
        let host = Rc::new(FileHost::new(
            &out_dir,
            vec![
                (STYLESHEET_ASSETS[0].to_string(), theme_css),
                (STYLESHEET_ASSETS[1].to_string(), PREVIEW_CSS.to_string()),
                (SCRIPT_ASSETS[0].to_string(), PREVIEW_JS.to_string()),
            ],
        ));

        let save_feed = SaveFeed::new();
        let registry = PanelRegistry::new(Rc::new(PanelContext {
            host: Rc::clone(&host) as Rc<dyn PanelHost>,
            runner: Rc::new(ShellRunner::new(&self.config.shell, &self.cwd)),
            renderer,
            save_feed: save_feed.clone(),
            title: self.config.panel_title.clone(),
        }));

        registry
            .create_or_show(ShowRequest {
                column: self.args.column,
                source: self.target.source.clone(),
                watched_path: self.target.watched_path.clone(),
            })
            .await
            .context("Failed to open preview")?;
        println!("Preview: {}", host.index_path().display());

        if self.args.once {
            registry.dispose_active();
            return Ok(());
        }

        let ignored = vec![std::fs::canonicalize(&out_dir).unwrap_or(out_dir)];
        let mut watcher = SaveWatcher::start(&root).context("Failed to watch work tree")?;
        println!("Watching {} (Ctrl-C to stop)", root.display());

        loop {
            tokio::select! {
                saved = watcher.next_save() => {
                    let Some(path) = saved else {
                        log::warn!("File watcher stopped");
                        break;
                    };
                    if self.should_publish(&path, &ignored) {
                        save_feed.publish(&path.to_string_lossy());
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    log::debug!("Interrupted");
                    break;
                }
            }

            if registry.active().is_none() {
                break;
            }
        }

        registry.dispose_active();
        Ok(())
    }

    fn should_publish(&self, path: &Path, ignored: &[PathBuf]) -> bool {
        if !is_relevant_save(path, ignored) {
            return false;
        }
        match &self.repo {
            Some(repo) => !repo.is_ignored(path),
            None => true,
        }
    }
}

/// The command runs in `cwd` as typed; the watched file is re-anchored on the
/// work tree so it matches what the watcher reports.
fn preview_target(
    args: &Args,
    config: &Config,
    stdin_text: Option<String>,
    cwd: &Path,
    repo: Option<&Repository>,
) -> Result<PreviewTarget> {
    let target = PreviewTarget::from_args(args, &config.diff_command, stdin_text);
    match repo {
        Some(repo) => Ok(target.anchored(cwd, &repo.workdir()?)),
        None => Ok(target),
    }
}
