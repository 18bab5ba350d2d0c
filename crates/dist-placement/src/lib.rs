//! dist Placement - piece allocation engine
//!
//! Decides which pieces of a dataset a requesting SP should fetch next,
//! under two replication bounds:
//!
//! - **duplicate**: maximum number of distinct SPs that may hold a piece
//! - **repeat**: maximum number of times one SP may be re-assigned the
//!   same piece; a sibling SP (same organization) holding a piece more
//!   than `repeat` times blocks a new assignment to the requester
//!
//! Allocation is split into a pure planning step and an apply step, so the
//! caller can show the selection before committing it.
//!
//! # Example
//! ```ignore
//! use dist_placement::{AllocationRequest, allocate};
//!
//! let siblings = directory.siblings(&sp).to_vec();
//! let request = AllocationRequest::new(sp, siblings, budget).with_bounds(bounds);
//! let plan = allocate(dataset, &request)?;
//! for piece in plan.pieces(dataset) {
//!     println!("{}", piece.piece_cid);
//! }
//! ```

pub mod allocator;
pub mod plan;

pub use allocator::{AllocationRequest, SkipReason, allocate, plan};
pub use plan::{AllocationPlan, Assignment, AssignmentKind};
