//! Common types used throughout BranchHQ.

use serde::{Deserialize, Serialize};

/// Primary key type for all entities
pub type Id = i64;

/// Optional zone/branch scoping for list queries.
///
/// The UI sends the literal string "All" to mean unfiltered; this type
/// normalizes that away so repositories only see real filters.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ZoneFilter {
    pub zone: Option<String>,
    pub branch: Option<String>,
}

impl ZoneFilter {
    pub fn new(zone: Option<String>, branch: Option<String>) -> Self {
        Self {
            zone: Self::normalize(zone),
            branch: Self::normalize(branch),
        }
    }

    fn normalize(value: Option<String>) -> Option<String> {
        value.filter(|v| !v.is_empty() && v != "All")
    }

    pub fn is_unfiltered(&self) -> bool {
        self.zone.is_none() && self.branch.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_means_unfiltered() {
        let filter = ZoneFilter::new(Some("All".into()), Some("All".into()));
        assert!(filter.is_unfiltered());
    }

    #[test]
    fn test_real_values_kept() {
        let filter = ZoneFilter::new(Some("Zone A".into()), None);
        assert_eq!(filter.zone.as_deref(), Some("Zone A"));
        assert!(!filter.is_unfiltered());
    }
}
