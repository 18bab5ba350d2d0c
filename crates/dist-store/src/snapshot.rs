//! Whole-document JSON snapshots
//!
//! `save` writes to a sibling `.tmp` file, syncs it, and renames it over the
//! target, so readers see either the old or the new document.

use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load the snapshot at `path`, creating it with `T::default()` if the file
/// does not exist. An existing file that fails to parse is an error.
pub fn load_or_create<T>(path: &Path) -> StoreResult<T>
where
    T: DeserializeOwned + Serialize + Default,
{
    match fs::read(path) {
        Ok(bytes) => {
            debug!(path = %path.display(), bytes = bytes.len(), "loading snapshot");
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let empty = T::default();
            save(path, &empty)?;
            info!(path = %path.display(), "created empty snapshot");
            Ok(empty)
        }
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Atomically replace the snapshot at `path`
pub fn save<T: Serialize>(path: &Path, snapshot: &T) -> StoreResult<()> {
    let data = serde_json::to_vec(snapshot).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let temp_path = temp_path(path);
    {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| StoreError::io(&temp_path, e))?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(&data)
            .map_err(|e| StoreError::io(&temp_path, e))?;
        writer.flush().map_err(|e| StoreError::io(&temp_path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| StoreError::io(&temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| StoreError::io(path, e))?;
    debug!(path = %path.display(), bytes = data.len(), "saved snapshot");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dist_common::{
        Dataset, DatasetCatalog, OrgDirectory, Organization, Piece, PieceCid, SpId, SpInfo,
    };
    use tempfile::tempdir;

    fn catalog() -> DatasetCatalog {
        let mut ds = Dataset::new("D", 3);
        let mut piece = Piece::new(PieceCid::new_unchecked("P1"), 10, 9);
        piece.sp_infos.push(SpInfo { sp: SpId::new_unchecked("f02"), num: 2 });
        piece.sp_infos.push(SpInfo::first(SpId::new_unchecked("f01")));
        ds.add(piece);
        ds.add(Piece::new(PieceCid::new_unchecked("P0"), 20, 19));
        let mut catalog = DatasetCatalog::new();
        catalog.add(ds);
        catalog.add(Dataset::new("A", 1));
        catalog
    }

    #[test]
    fn test_load_or_create_writes_empty_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");

        let orgs: OrgDirectory = load_or_create(&path).unwrap();
        assert!(orgs.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"list":[]}"#);

        // Second load parses the created file instead of recreating it.
        let again: OrgDirectory = load_or_create(&path).unwrap();
        assert_eq!(again, orgs);
    }

    #[test]
    fn test_round_trip_preserves_order_and_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("datasets.json");
        let saved = catalog();
        save(&path, &saved).unwrap();
        let loaded: DatasetCatalog = load_or_create(&path).unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.list[0].pieces[0].piece_cid.as_str(), "P1");
        assert_eq!(loaded.list[1].data_set_name, "A");
    }

    #[test]
    fn test_save_replaces_and_cleans_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let mut orgs = OrgDirectory::new();
        save(&path, &orgs).unwrap();
        orgs.add(Organization::new("ORG", vec![SpId::new_unchecked("f01")]));
        save(&path, &orgs).unwrap();

        let loaded: OrgDirectory = load_or_create(&path).unwrap();
        assert_eq!(loaded, orgs);
        assert!(!dir.path().join("users.json.tmp").exists());
    }

    #[test]
    fn test_malformed_snapshot_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("datasets.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_or_create::<DatasetCatalog>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        // The broken file is left as-is.
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_empty_existing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, "").unwrap();
        assert!(load_or_create::<OrgDirectory>(&path).is_err());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("users.json");
        let err = load_or_create::<OrgDirectory>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
