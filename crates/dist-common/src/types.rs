//! Core type definitions for dist
//!
//! This module defines the identifiers shared by the organization
//! directory, the dataset catalog and the allocation engine, plus the
//! byte-unit helpers used when reporting sizes.

use derive_more::{Display, From};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Bytes in one GiB
pub const GIB: u64 = 1 << 30;
/// Bytes in one TiB
pub const TIB: u64 = 1 << 40;

/// Storage provider identifier (e.g. `f01234`)
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
#[serde(transparent)]
pub struct SpId(String);

impl SpId {
    /// Create a new SP identifier (must be non-empty, no whitespace or commas)
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        validate_token(&id)?;
        Ok(Self(id))
    }

    /// Create without validation (internal use only)
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma-separated SP list, ignoring surrounding whitespace and
    /// empty entries (`"f01, f02,"` yields two ids).
    pub fn parse_list(list: &str) -> Result<Vec<Self>, IdError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::new)
            .collect()
    }
}

impl fmt::Debug for SpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpId({:?})", self.0)
    }
}

impl PartialEq<str> for SpId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Content identifier of a piece
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
#[serde(transparent)]
pub struct PieceCid(String);

impl PieceCid {
    /// Create a new piece CID (must be non-empty, no whitespace or commas)
    pub fn new(cid: impl Into<String>) -> Result<Self, IdError> {
        let cid = cid.into();
        validate_token(&cid)?;
        Ok(Self(cid))
    }

    /// Create without validation (internal use only)
    #[must_use]
    pub fn new_unchecked(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    /// Get the CID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PieceCid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PieceCid({:?})", self.0)
    }
}

/// Errors that can occur when creating an identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("identifier must not be empty")]
    Empty,
    #[error("identifier contains invalid character: {0:?}")]
    InvalidChar(char),
}

fn validate_token(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if let Some(c) = s.chars().find(|c| c.is_whitespace() || *c == ',') {
        return Err(IdError::InvalidChar(c));
    }
    Ok(())
}

/// Convert a fractional TiB amount into whole bytes (truncating).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn tib_to_bytes(tib: f64) -> u64 {
    if tib <= 0.0 || !tib.is_finite() {
        return 0;
    }
    (tib * TIB as f64) as u64
}

/// Express a byte count in TiB
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bytes_to_tib(bytes: u64) -> f64 {
    bytes as f64 / TIB as f64
}

/// Express a byte count in GiB
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / GIB as f64
}

/// Deserialize a sequence where an explicit JSON `null` means empty.
///
/// Older snapshot files carry `null` for collections that were never
/// populated. A missing field is still an error.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sp_id_validation() {
        assert!(SpId::new("f01234").is_ok());
        assert_eq!(SpId::new(""), Err(IdError::Empty));
        assert_eq!(SpId::new("f01 234"), Err(IdError::InvalidChar(' ')));
        assert_eq!(SpId::new("f01,f02"), Err(IdError::InvalidChar(',')));
    }

    #[test]
    fn test_sp_id_parse_list() {
        let sps = SpId::parse_list(" f01, f02,,").unwrap();
        assert_eq!(sps, vec![SpId::new_unchecked("f01"), SpId::new_unchecked("f02")]);
        assert!(SpId::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let sp = SpId::new_unchecked("f01");
        assert_eq!(serde_json::to_string(&sp).unwrap(), "\"f01\"");
        let cid: PieceCid = serde_json::from_str("\"baga6ea4sea\"").unwrap();
        assert_eq!(cid.as_str(), "baga6ea4sea");
    }

    #[test]
    fn test_tib_conversion() {
        assert_eq!(tib_to_bytes(1.0), TIB);
        assert_eq!(tib_to_bytes(0.5), TIB / 2);
        assert_eq!(tib_to_bytes(-1.0), 0);
        assert_eq!(tib_to_bytes(f64::NAN), 0);
        assert!((bytes_to_tib(TIB * 3) - 3.0).abs() < f64::EPSILON);
        assert!((bytes_to_gib(GIB / 2) - 0.5).abs() < f64::EPSILON);
    }
}
