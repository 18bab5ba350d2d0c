//! Dataset catalog
//!
//! A dataset is a named, ordered collection of pieces. Each piece records
//! which SPs have been handed a copy and how many times.

use crate::error::{Error, Result};
use crate::types::{PieceCid, SpId, null_as_empty};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// "This SP has received this piece `num` times"
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpInfo {
    pub sp: SpId,
    pub num: u32,
}

impl SpInfo {
    /// First assignment of a piece to `sp`
    #[must_use]
    pub const fn first(sp: SpId) -> Self {
        Self { sp, num: 1 }
    }
}

/// A content-addressed unit of data
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Piece {
    pub piece_cid: PieceCid,
    /// Nominal (padded) piece size in bytes
    pub piece_size: u64,
    /// Size of the packaged CAR archive in bytes
    pub car_size: u64,
    #[serde(deserialize_with = "null_as_empty")]
    pub sp_infos: Vec<SpInfo>,
}

impl Piece {
    /// Create a piece with no assignments
    #[must_use]
    pub const fn new(piece_cid: PieceCid, piece_size: u64, car_size: u64) -> Self {
        Self {
            piece_cid,
            piece_size,
            car_size,
            sp_infos: Vec::new(),
        }
    }

    /// Create a piece already held once by each of `sps`
    #[must_use]
    pub fn with_sps(piece_cid: PieceCid, piece_size: u64, car_size: u64, sps: Vec<SpId>) -> Self {
        Self {
            piece_cid,
            piece_size,
            car_size,
            sp_infos: sps.into_iter().map(SpInfo::first).collect(),
        }
    }

    /// Assignment record for `sp`, if any
    #[must_use]
    pub fn record(&self, sp: &SpId) -> Option<&SpInfo> {
        self.sp_infos.iter().find(|i| &i.sp == sp)
    }

    /// Number of distinct SPs holding this piece
    #[must_use]
    pub fn distinct_sps(&self) -> usize {
        self.sp_infos.iter().map(|i| &i.sp).collect::<BTreeSet<_>>().len()
    }

    /// SP identifiers in record order
    pub fn sps(&self) -> impl Iterator<Item = &SpId> {
        self.sp_infos.iter().map(|i| &i.sp)
    }
}

/// A named collection of pieces
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Dataset {
    /// Replication target for pieces when no override is given
    pub duplicate: u32,
    pub data_set_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub pieces: Vec<Piece>,
}

impl Dataset {
    /// Create an empty dataset
    #[must_use]
    pub fn new(name: impl Into<String>, duplicate: u32) -> Self {
        Self {
            duplicate,
            data_set_name: name.into(),
            pieces: Vec::new(),
        }
    }

    /// Dataset name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.data_set_name
    }

    /// Append a piece without any existence check
    pub fn add(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    /// Add a piece, replacing an existing piece with the same CID only when
    /// `force` is set. Returns `true` if a piece was replaced.
    pub fn insert(&mut self, piece: Piece, force: bool) -> Result<bool> {
        if self.get(&piece.piece_cid).is_some() {
            if !force {
                return Err(Error::PieceAlreadyExists {
                    dataset: self.data_set_name.clone(),
                    cid: piece.piece_cid.to_string(),
                });
            }
            self.update(piece);
            return Ok(true);
        }
        self.add(piece);
        Ok(false)
    }

    /// Get a piece by CID
    #[must_use]
    pub fn get(&self, cid: &PieceCid) -> Option<&Piece> {
        self.pieces.iter().find(|p| &p.piece_cid == cid)
    }

    /// Replace the first piece with the same CID
    pub fn update(&mut self, piece: Piece) -> bool {
        match self.pieces.iter_mut().find(|p| p.piece_cid == piece.piece_cid) {
            Some(slot) => {
                *slot = piece;
                true
            }
            None => false,
        }
    }

    /// Remove the first piece with this CID
    pub fn delete(&mut self, cid: &PieceCid) -> bool {
        match self.pieces.iter().position(|p| &p.piece_cid == cid) {
            Some(i) => {
                self.pieces.remove(i);
                true
            }
            None => false,
        }
    }

    /// Sum of nominal piece sizes
    #[must_use]
    pub fn total_piece_size(&self) -> u64 {
        self.pieces.iter().map(|p| p.piece_size).sum()
    }

    /// Sum of CAR sizes
    #[must_use]
    pub fn total_car_size(&self) -> u64 {
        self.pieces.iter().map(|p| p.car_size).sum()
    }

    /// Number of distinct SPs holding at least one piece
    #[must_use]
    pub fn distinct_sps(&self) -> usize {
        self.pieces
            .iter()
            .flat_map(|p| p.sps())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Ordered list of datasets, persisted as one snapshot document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetCatalog {
    #[serde(deserialize_with = "null_as_empty")]
    pub list: Vec<Dataset>,
}

impl DatasetCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dataset without any existence check
    pub fn add(&mut self, dataset: Dataset) {
        self.list.push(dataset);
    }

    /// Add a dataset, replacing an existing one of the same name only when
    /// `force` is set. Returns `true` if a dataset was replaced.
    pub fn insert(&mut self, dataset: Dataset, force: bool) -> Result<bool> {
        if self.get(dataset.name()).is_some() {
            if !force {
                return Err(Error::DatasetAlreadyExists(dataset.data_set_name));
            }
            self.update(dataset);
            return Ok(true);
        }
        self.add(dataset);
        Ok(false)
    }

    /// Get a dataset by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.list.iter().find(|d| d.data_set_name == name)
    }

    /// Get a dataset by name, or `DatasetNotFound`
    pub fn require(&self, name: &str) -> Result<&Dataset> {
        self.get(name)
            .ok_or_else(|| Error::DatasetNotFound(name.to_string()))
    }

    /// Get a mutable dataset by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Dataset> {
        self.list.iter_mut().find(|d| d.data_set_name == name)
    }

    /// Get a mutable dataset by name, or `DatasetNotFound`
    pub fn require_mut(&mut self, name: &str) -> Result<&mut Dataset> {
        self.get_mut(name)
            .ok_or_else(|| Error::DatasetNotFound(name.to_string()))
    }

    /// Replace the first dataset with the same name
    pub fn update(&mut self, dataset: Dataset) -> bool {
        match self
            .list
            .iter_mut()
            .find(|d| d.data_set_name == dataset.data_set_name)
        {
            Some(slot) => {
                *slot = dataset;
                true
            }
            None => false,
        }
    }

    /// Remove the first dataset with this name
    pub fn delete(&mut self, name: &str) -> bool {
        match self.list.iter().position(|d| d.data_set_name == name) {
            Some(i) => {
                self.list.remove(i);
                true
            }
            None => false,
        }
    }

    /// Iterate datasets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.list.iter()
    }

    /// Number of datasets
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
