use anyhow::{anyhow, Context, Result};
use git2::Repository as Git2Repo;
use std::path::{Path, PathBuf};

pub struct Repository {
    repo: Git2Repo,
}

impl Repository {
    /// Open the repository containing the current directory
    pub fn open_current_dir() -> Result<Self> {
        let repo = Git2Repo::discover(".").context("Not a git repository")?;
        Ok(Self { repo })
    }

    /// Open the repository containing `path`
    #[cfg(test)]
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path).context("Failed to open repository")?;
        Ok(Self { repo })
    }

    /// Root of the work tree, canonicalized so watcher paths compare cleanly
    pub fn workdir(&self) -> Result<PathBuf> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| anyhow!("Repository has no work tree (bare repository?)"))?;
        std::fs::canonicalize(workdir)
            .with_context(|| format!("Failed to resolve {}", workdir.display()))
    }

    /// Whether git ignores `path`. Paths outside the work tree count as ignored.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Ok(workdir) = self.workdir() else {
            return false;
        };
        let Ok(relative) = path.strip_prefix(&workdir) else {
            return true;
        };
        self.repo.is_path_ignored(relative).unwrap_or(false)
    }
}
