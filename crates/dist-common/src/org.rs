//! Organization directory
//!
//! An organization groups the SPs that share an operational boundary. The
//! allocation engine uses the directory to find an SP's siblings.

use crate::error::{Error, Result};
use crate::types::{SpId, null_as_empty};
use serde::{Deserialize, Serialize};

/// A named group of storage providers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Organization {
    /// Organization name, unique within the directory
    pub org: String,
    /// Member SPs in insertion order (duplicates are not rejected)
    #[serde(deserialize_with = "null_as_empty")]
    pub sps: Vec<SpId>,
}

impl Organization {
    /// Create a new organization
    #[must_use]
    pub fn new(org: impl Into<String>, sps: Vec<SpId>) -> Self {
        Self {
            org: org.into(),
            sps,
        }
    }

    /// Check whether `sp` is a member
    #[must_use]
    pub fn contains(&self, sp: &SpId) -> bool {
        self.sps.contains(sp)
    }
}

/// Ordered list of organizations, persisted as one snapshot document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrgDirectory {
    #[serde(deserialize_with = "null_as_empty")]
    pub list: Vec<Organization>,
}

impl OrgDirectory {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an organization without any existence check
    pub fn add(&mut self, org: Organization) {
        self.list.push(org);
    }

    /// Add an organization, replacing an existing entry of the same name
    /// only when `force` is set. Returns `true` if an entry was replaced.
    pub fn insert(&mut self, org: Organization, force: bool) -> Result<bool> {
        if self.get(&org.org).is_some() {
            if !force {
                return Err(Error::OrgAlreadyExists(org.org));
            }
            self.update(org);
            return Ok(true);
        }
        self.add(org);
        Ok(false)
    }

    /// Get an organization by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Organization> {
        self.list.iter().find(|o| o.org == name)
    }

    /// Replace the first organization with the same name. Returns `false` if
    /// nothing matched.
    pub fn update(&mut self, org: Organization) -> bool {
        match self.list.iter_mut().find(|o| o.org == org.org) {
            Some(slot) => {
                *slot = org;
                true
            }
            None => false,
        }
    }

    /// Remove the first organization with this name
    pub fn delete(&mut self, name: &str) -> bool {
        match self.list.iter().position(|o| o.org == name) {
            Some(i) => {
                self.list.remove(i);
                true
            }
            None => false,
        }
    }

    /// Full SP list of the first organization containing `sp`, or an empty
    /// slice if `sp` belongs to none.
    #[must_use]
    pub fn siblings(&self, sp: &SpId) -> &[SpId] {
        self.list
            .iter()
            .find(|o| o.contains(sp))
            .map(|o| o.sps.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate organizations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Organization> {
        self.list.iter()
    }

    /// Number of organizations
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sps(ids: &[&str]) -> Vec<SpId> {
        ids.iter().map(|s| SpId::new_unchecked(*s)).collect()
    }

    fn directory() -> OrgDirectory {
        let mut dir = OrgDirectory::new();
        dir.add(Organization::new("ORG", sps(&["f01", "f02"])));
        dir.add(Organization::new("OTHER", sps(&["f03"])));
        dir
    }

    #[test]
    fn test_insert_rejects_duplicate_without_force() {
        let mut dir = directory();
        let err = dir
            .insert(Organization::new("ORG", sps(&["f09"])), false)
            .unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(dir.get("ORG").unwrap().sps, sps(&["f01", "f02"]));
    }

    #[test]
    fn test_insert_with_force_replaces() {
        let mut dir = directory();
        let replaced = dir
            .insert(Organization::new("ORG", sps(&["f09"])), true)
            .unwrap();
        assert!(replaced);
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.list[0].sps, sps(&["f09"]));
    }

    #[test]
    fn test_insert_new_appends() {
        let mut dir = directory();
        assert!(!dir.insert(Organization::new("NEW", vec![]), false).unwrap());
        assert_eq!(dir.list.last().unwrap().org, "NEW");
    }

    #[test]
    fn test_delete() {
        let mut dir = directory();
        assert!(dir.delete("ORG"));
        assert!(!dir.delete("ORG"));
        assert!(dir.get("ORG").is_none());
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_siblings() {
        let dir = directory();
        assert_eq!(dir.siblings(&SpId::new_unchecked("f02")), sps(&["f01", "f02"]));
        assert_eq!(dir.siblings(&SpId::new_unchecked("f03")), sps(&["f03"]));
        assert!(dir.siblings(&SpId::new_unchecked("f99")).is_empty());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&directory()).unwrap();
        assert_eq!(
            json,
            r#"{"list":[{"org":"ORG","sps":["f01","f02"]},{"org":"OTHER","sps":["f03"]}]}"#
        );
    }

    #[test]
    fn test_null_collections_read_as_empty() {
        let dir: OrgDirectory = serde_json::from_str(r#"{"list":null}"#).unwrap();
        assert!(dir.is_empty());
        let dir: OrgDirectory =
            serde_json::from_str(r#"{"list":[{"org":"ORG","sps":null}]}"#).unwrap();
        assert!(dir.list[0].sps.is_empty());
    }

    #[test]
    fn test_unknown_and_missing_fields_rejected() {
        assert!(serde_json::from_str::<OrgDirectory>(r#"{"list":[],"extra":1}"#).is_err());
        assert!(serde_json::from_str::<OrgDirectory>(r#"{"list":[{"org":"ORG"}]}"#).is_err());
        assert!(serde_json::from_str::<OrgDirectory>("{}").is_err());
    }
}
