//! Allocation plans
//!
//! A plan is the ordered set of assignment deltas produced by one
//! allocation call. It references pieces by their position in the
//! dataset's piece list and carries the CID so a plan applied to a dataset
//! that changed underneath it is rejected instead of misapplied.

use dist_common::{Dataset, Error, Piece, PieceCid, Result, SpId, SpInfo};
use serde::Serialize;

/// How a selected piece is handed to the requesting SP
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentKind {
    /// First copy for this SP: append `{sp, 1}`
    New,
    /// Another copy for an SP that already holds `from` copies
    Repeat { from: u32 },
}

/// One selected piece
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Position in the dataset's piece list
    pub index: usize,
    pub piece_cid: PieceCid,
    pub piece_size: u64,
    pub car_size: u64,
    pub kind: AssignmentKind,
}

/// Result of planning an allocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPlan {
    pub data_set_name: String,
    pub sp: SpId,
    /// Requested nominal size in bytes
    pub budget: u64,
    /// Duplicate bound in effect for this call
    pub duplicate: u32,
    /// Repeat bound in effect for this call
    pub repeat: u32,
    /// Selected pieces in scan order
    pub assignments: Vec<Assignment>,
    /// Cumulative nominal size of the selection
    pub piece_size: u64,
    /// Cumulative CAR size of the selection
    pub car_size: u64,
}

impl AllocationPlan {
    pub(crate) fn new(dataset: &Dataset, sp: SpId, budget: u64, duplicate: u32, repeat: u32) -> Self {
        Self {
            data_set_name: dataset.data_set_name.clone(),
            sp,
            budget,
            duplicate,
            repeat,
            assignments: Vec::new(),
            piece_size: 0,
            car_size: 0,
        }
    }

    pub(crate) fn push(&mut self, index: usize, piece: &Piece, kind: AssignmentKind) {
        self.piece_size = self.piece_size.saturating_add(piece.piece_size);
        self.car_size = self.car_size.saturating_add(piece.car_size);
        self.assignments.push(Assignment {
            index,
            piece_cid: piece.piece_cid.clone(),
            piece_size: piece.piece_size,
            car_size: piece.car_size,
            kind,
        });
    }

    /// Number of selected pieces
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Check if nothing was selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Bytes of the budget the selection could not cover
    #[must_use]
    pub fn shortfall(&self) -> u64 {
        self.budget.saturating_sub(self.piece_size)
    }

    /// CIDs of the selected pieces in scan order
    pub fn cids(&self) -> impl Iterator<Item = &PieceCid> {
        self.assignments.iter().map(|a| &a.piece_cid)
    }

    /// Selected pieces as they currently exist in `dataset`
    pub fn pieces<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a Piece> + 'a {
        self.assignments
            .iter()
            .filter_map(|a| dataset.pieces.get(a.index))
    }

    /// Commit the plan's deltas to `dataset`.
    ///
    /// Every delta is checked before anything is written: the piece at each
    /// index must carry the planned CID, a `New` target must not already
    /// hold a record for the SP, and a `Repeat` target's count must still be
    /// the planned `from`. On error the dataset is left untouched.
    pub fn apply(&self, dataset: &mut Dataset) -> Result<()> {
        if dataset.data_set_name != self.data_set_name {
            return Err(Error::invalid_argument(format!(
                "plan for dataset {} applied to {}",
                self.data_set_name, dataset.data_set_name
            )));
        }

        for a in &self.assignments {
            let stale = || Error::StalePlan {
                index: a.index,
                expected: a.piece_cid.to_string(),
            };
            let piece = dataset
                .pieces
                .get(a.index)
                .filter(|p| p.piece_cid == a.piece_cid)
                .ok_or_else(stale)?;
            let current = piece.record(&self.sp).map(|r| r.num);
            match (a.kind, current) {
                (AssignmentKind::New, None) => {}
                (AssignmentKind::Repeat { from }, Some(num)) if num == from => {}
                _ => return Err(stale()),
            }
        }

        for a in &self.assignments {
            let piece = &mut dataset.pieces[a.index];
            match a.kind {
                AssignmentKind::New => piece.sp_infos.push(SpInfo::first(self.sp.clone())),
                AssignmentKind::Repeat { .. } => {
                    if let Some(record) = piece.sp_infos.iter_mut().find(|r| r.sp == self.sp) {
                        record.num = record.num.saturating_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}
