//! File metadata model.

use hq_core::types::Id;
use serde::{Deserialize, Serialize};

use crate::storage::BlobId;

/// The (category, zone, branch) triple scoping listing and numbering.
///
/// Every query against the metadata index and every file number is scoped
/// by this key; two partitions never see each other's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileScope {
    pub category: String,
    pub zone: String,
    pub branch: String,
}

impl FileScope {
    pub fn new(
        category: impl Into<String>,
        zone: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            zone: zone.into(),
            branch: branch.into(),
        }
    }
}

impl std::fmt::Display for FileScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.zone, self.branch)
    }
}

/// A file metadata record.
///
/// Created once on upload and never updated in place; `file_id` is the
/// exclusively-owned handle of the backing blob object. `last_modified` is
/// the upload timestamp as an ISO-8601 string, set at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub filename: String,
    pub filetype: String,
    pub last_modified: String,
    pub file_id: BlobId,
    pub category: String,
    pub file_number: String,
    pub zone: String,
    pub branch: String,
}

impl FileRecord {
    pub fn new(
        filename: impl Into<String>,
        filetype: impl Into<String>,
        file_id: BlobId,
        scope: &FileScope,
        file_number: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            filename: filename.into(),
            filetype: filetype.into(),
            last_modified: chrono::Utc::now().to_rfc3339(),
            file_id,
            category: scope.category.clone(),
            file_number: file_number.into(),
            zone: scope.zone.clone(),
            branch: scope.branch.clone(),
        }
    }

    /// The partition this record belongs to
    pub fn scope(&self) -> FileScope {
        FileScope::new(&self.category, &self.zone, &self.branch)
    }

    pub fn in_scope(&self, scope: &FileScope) -> bool {
        self.category == scope.category && self.zone == scope.zone && self.branch == scope.branch
    }
}

/// Format a partition-relative file number as zero-padded 5-digit decimal.
pub fn format_file_number(n: i64) -> String {
    format!("{:05}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_number() {
        assert_eq!(format_file_number(1), "00001");
        assert_eq!(format_file_number(42), "00042");
        assert_eq!(format_file_number(99999), "99999");
        assert_eq!(format_file_number(123456), "123456");
    }

    #[test]
    fn test_record_scope() {
        let scope = FileScope::new("licenses", "Zone A", "Headquarters");
        let record = FileRecord::new("permit.pdf", "application/pdf", 7, &scope, "00001");

        assert!(record.in_scope(&scope));
        assert!(!record.in_scope(&FileScope::new("licenses", "Zone A", "I-8")));
        assert_eq!(record.scope(), scope);
    }

    #[test]
    fn test_record_serializes_with_wire_field_names() {
        let scope = FileScope::new("menus", "Zone B", "F-10");
        let record = FileRecord::new("menu.pdf", "application/pdf", 3, &scope, "00002");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fileId"], 3);
        assert_eq!(json["fileNumber"], "00002");
        assert!(json.get("lastModified").is_some());
        assert!(json.get("id").is_none());
    }
}
