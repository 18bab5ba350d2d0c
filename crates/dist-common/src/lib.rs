//! dist Common - Shared types and utilities
//!
//! This crate provides the data model (organizations, datasets, pieces and
//! their SP assignment records), error definitions, and configuration
//! used across all dist components.

pub mod config;
pub mod dataset;
pub mod error;
pub mod org;
pub mod types;

pub use config::{AllocationConfig, DistConfig, LinkConfig};
pub use dataset::{Dataset, DatasetCatalog, Piece, SpInfo};
pub use error::{Error, Result};
pub use org::{OrgDirectory, Organization};
pub use types::*;
