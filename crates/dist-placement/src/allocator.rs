//! Piece selection
//!
//! Pieces are scanned in their stored order. A piece is skipped once the
//! selection has reached the budget, when it is already held by
//! `duplicate` distinct SPs, when the requester has exhausted its repeat
//! allowance on it, or when a sibling SP holds it more than `repeat` times.
//! The scan does not stop at the budget: later pieces are still visited
//! and skipped, so the piece that crosses the budget is the last one taken.

use crate::plan::{AllocationPlan, AssignmentKind};
use dist_common::{AllocationConfig, Dataset, Piece, Result, SpId};
use tracing::{debug, info, warn};

/// Inputs of one allocation call
#[derive(Clone, Debug)]
pub struct AllocationRequest {
    /// Requesting SP
    pub sp: SpId,
    /// All SPs of the requester's organization (usually includes `sp`)
    pub siblings: Vec<SpId>,
    /// Target nominal size in bytes
    pub budget: u64,
    /// Duplicate and repeat bounds
    pub bounds: AllocationConfig,
}

impl AllocationRequest {
    /// Request with default bounds (dataset duplicate factor, repeat 0)
    #[must_use]
    pub fn new(sp: SpId, siblings: Vec<SpId>, budget: u64) -> Self {
        Self {
            sp,
            siblings,
            budget,
            bounds: AllocationConfig::default(),
        }
    }

    /// Override the replication bounds
    #[must_use]
    pub const fn with_bounds(mut self, bounds: AllocationConfig) -> Self {
        self.bounds = bounds;
        self
    }
}

/// Why a piece was not selected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Selection already reached the budget
    BudgetReached,
    /// Held by `duplicate` or more distinct SPs
    FullyReplicated,
    /// Requester already holds `repeat + 1` copies
    RepeatExhausted,
    /// A sibling SP holds more than `repeat` copies
    HeldByOrganization,
}

enum Decision {
    Take(AssignmentKind),
    Skip(SkipReason),
}

fn classify(piece: &Piece, request: &AllocationRequest, duplicate: u32, repeat: u32) -> Decision {
    let holders = piece.distinct_sps();
    if holders >= duplicate as usize {
        if holders > duplicate as usize {
            warn!(
                piece = %piece.piece_cid,
                holders,
                duplicate,
                "piece is held by more SPs than the duplicate bound"
            );
        }
        return Decision::Skip(SkipReason::FullyReplicated);
    }

    if let Some(own) = piece.record(&request.sp) {
        return if own.num <= repeat {
            Decision::Take(AssignmentKind::Repeat { from: own.num })
        } else {
            Decision::Skip(SkipReason::RepeatExhausted)
        };
    }

    let held_by_sibling = piece
        .sp_infos
        .iter()
        .any(|r| r.num > repeat && request.siblings.contains(&r.sp));
    if held_by_sibling {
        return Decision::Skip(SkipReason::HeldByOrganization);
    }

    Decision::Take(AssignmentKind::New)
}

/// Select pieces for `request` without touching `dataset`.
#[must_use]
pub fn plan(dataset: &Dataset, request: &AllocationRequest) -> AllocationPlan {
    let duplicate = request.bounds.effective_duplicate(dataset.duplicate);
    let repeat = request.bounds.repeat;
    let mut plan = AllocationPlan::new(
        dataset,
        request.sp.clone(),
        request.budget,
        duplicate,
        repeat,
    );

    for (index, piece) in dataset.pieces.iter().enumerate() {
        let decision = if plan.piece_size >= request.budget {
            Decision::Skip(SkipReason::BudgetReached)
        } else {
            classify(piece, request, duplicate, repeat)
        };
        match decision {
            Decision::Take(kind) => {
                debug!(piece = %piece.piece_cid, ?kind, "selected");
                plan.push(index, piece, kind);
            }
            Decision::Skip(reason) => {
                debug!(piece = %piece.piece_cid, ?reason, "skipped");
            }
        }
    }
    plan
}

/// Select pieces for `request` and record the assignments on `dataset`.
pub fn allocate(dataset: &mut Dataset, request: &AllocationRequest) -> Result<AllocationPlan> {
    let plan = plan(dataset, request);
    plan.apply(dataset)?;
    info!(
        dataset = %dataset.data_set_name,
        sp = %request.sp,
        pieces = plan.len(),
        piece_size = plan.piece_size,
        shortfall = plan.shortfall(),
        "allocated pieces"
    );
    Ok(plan)
}
