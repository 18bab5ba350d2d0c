//! dist Store - snapshot persistence
//!
//! The organization directory and the dataset catalog are each stored as
//! one JSON document under the repository directory. Every command loads
//! the whole document, and mutating commands write the whole document back.

pub mod error;
pub mod import;
#[cfg(unix)]
pub mod lock;
pub mod repo;
pub mod snapshot;

pub use error::{StoreError, StoreResult};
pub use import::{import_pieces, parse_pieces};
#[cfg(unix)]
pub use lock::InstanceLock;
pub use repo::Repo;
pub use snapshot::{load_or_create, save};
