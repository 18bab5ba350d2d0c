//! Configuration types for dist
//!
//! This module defines the configuration threaded into the persistence
//! layer and the allocation engine. Nothing here is process-global: the
//! binary builds one `DistConfig` at startup for the repository, and an
//! `AllocationConfig` plus `LinkConfig` from the flags of each allocation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default repository directory (before `~` expansion)
pub const DEFAULT_REPO: &str = "~/.dist";

/// Root configuration for dist
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistConfig {
    /// Directory holding the snapshot files
    pub repo: PathBuf,
    /// Org snapshot file name, relative to `repo`
    pub orgs_file: String,
    /// Dataset snapshot file name, relative to `repo`
    pub datasets_file: String,
    /// Single-instance lock file
    pub lock_path: PathBuf,
}

impl Default for DistConfig {
    fn default() -> Self {
        Self {
            repo: PathBuf::from(DEFAULT_REPO),
            orgs_file: "users.json".to_string(),
            datasets_file: "datasets.json".to_string(),
            lock_path: std::env::temp_dir().join("dist.lock"),
        }
    }
}

impl DistConfig {
    /// Config rooted at `repo`, with `~` expanded to the home directory
    pub fn with_repo(repo: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            repo: expand_home(repo.as_ref())?,
            ..Self::default()
        })
    }

    /// Path to the org snapshot
    #[must_use]
    pub fn orgs_path(&self) -> PathBuf {
        self.repo.join(&self.orgs_file)
    }

    /// Path to the dataset snapshot
    #[must_use]
    pub fn datasets_path(&self) -> PathBuf {
        self.repo.join(&self.datasets_file)
    }
}

/// Replication bounds applied by the allocation engine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Maximum distinct SPs per piece; `None` or `Some(0)` uses the
    /// dataset's declared factor
    pub duplicate: Option<u32>,
    /// Maximum re-assignments of one piece to one SP
    pub repeat: u32,
}

impl AllocationConfig {
    /// Duplicate bound in effect for a dataset declaring `declared`
    #[must_use]
    pub fn effective_duplicate(&self, declared: u32) -> u32 {
        match self.duplicate {
            Some(d) if d > 0 => d,
            _ => declared,
        }
    }
}

/// Download link formatting: `prefix + pieceCid + suffix`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub prefix: String,
    pub suffix: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: ".car".to_string(),
        }
    }
}

impl LinkConfig {
    /// Render the download link for a piece CID
    #[must_use]
    pub fn link(&self, cid: &str) -> String {
        format!("{}{}{}", self.prefix, cid, self.suffix)
    }
}

/// Expand a leading `~` to the current user's home directory
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs_next::home_dir()
        .ok_or_else(|| Error::configuration("failed to resolve home directory"))?;
    Ok(home.join(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DistConfig::default();
        assert_eq!(config.orgs_file, "users.json");
        assert_eq!(config.datasets_file, "datasets.json");
        assert!(config.lock_path.ends_with("dist.lock"));
    }

    #[test]
    fn test_snapshot_paths() {
        let config = DistConfig::with_repo("/srv/dist").unwrap();
        assert_eq!(config.orgs_path(), PathBuf::from("/srv/dist/users.json"));
        assert_eq!(config.datasets_path(), PathBuf::from("/srv/dist/datasets.json"));
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(
            expand_home(Path::new("/tmp/dist")).unwrap(),
            PathBuf::from("/tmp/dist")
        );
        assert_eq!(
            expand_home(Path::new("rel/~dist")).unwrap(),
            PathBuf::from("rel/~dist")
        );
    }

    #[test]
    fn test_effective_duplicate() {
        let mut alloc = AllocationConfig::default();
        assert_eq!(alloc.repeat, 0);
        assert_eq!(alloc.effective_duplicate(10), 10);
        alloc.duplicate = Some(0);
        assert_eq!(alloc.effective_duplicate(10), 10);
        alloc.duplicate = Some(3);
        assert_eq!(alloc.effective_duplicate(10), 3);
    }

    #[test]
    fn test_link() {
        let links = LinkConfig {
            prefix: "http://host/".into(),
            ..LinkConfig::default()
        };
        assert_eq!(links.link("baga"), "http://host/baga.car");
        assert_eq!(LinkConfig::default().link("baga"), "baga.car");
    }
}
