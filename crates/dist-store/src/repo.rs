//! Repository directory holding both snapshots

use crate::error::{StoreError, StoreResult};
use crate::snapshot::{load_or_create, save};
use dist_common::{DatasetCatalog, DistConfig, OrgDirectory};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle on the snapshot files of one repository directory
#[derive(Clone, Debug)]
pub struct Repo {
    root: PathBuf,
    orgs_path: PathBuf,
    datasets_path: PathBuf,
}

impl Repo {
    /// Open the repository described by `config`, creating its directory if
    /// it does not exist yet
    pub fn open(config: &DistConfig) -> StoreResult<Self> {
        if !config.repo.exists() {
            fs::create_dir_all(&config.repo).map_err(|e| StoreError::io(&config.repo, e))?;
            info!(repo = %config.repo.display(), "created repository directory");
        }
        Ok(Self {
            root: config.repo.clone(),
            orgs_path: config.orgs_path(),
            datasets_path: config.datasets_path(),
        })
    }

    /// Repository directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_orgs(&self) -> StoreResult<OrgDirectory> {
        load_or_create(&self.orgs_path)
    }

    pub fn save_orgs(&self, orgs: &OrgDirectory) -> StoreResult<()> {
        save(&self.orgs_path, orgs)
    }

    pub fn load_datasets(&self) -> StoreResult<DatasetCatalog> {
        load_or_create(&self.datasets_path)
    }

    pub fn save_datasets(&self, datasets: &DatasetCatalog) -> StoreResult<()> {
        save(&self.datasets_path, datasets)
    }
}
