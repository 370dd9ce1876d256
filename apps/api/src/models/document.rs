use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Verification lifecycle of a tracked document.
///
/// Normal flow is pending → draft → uploaded → review → verified | rejected, but any
/// status may be set to any other; nothing here restricts transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Draft,
    Uploaded,
    Review,
    Verified,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Draft => "draft",
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::Review => "review",
            DocumentStatus::Verified => "verified",
            DocumentStatus::Rejected => "rejected",
        }
    }

    /// Still waiting on the student or a reviewer.
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Pending
                | DocumentStatus::Draft
                | DocumentStatus::Uploaded
                | DocumentStatus::Review
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for DocumentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(DocumentStatus::Pending),
            "draft" => Ok(DocumentStatus::Draft),
            "uploaded" => Ok(DocumentStatus::Uploaded),
            "review" => Ok(DocumentStatus::Review),
            "verified" => Ok(DocumentStatus::Verified),
            "rejected" => Ok(DocumentStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One required template tracked for one placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentInstance {
    pub id: Uuid,
    pub siswa_magang_id: Uuid,
    pub document_template_id: Uuid,
    pub status: DocumentStatus,
    pub catatan: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw row as stored; `status` is validated on conversion.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentInstanceRow {
    pub id: Uuid,
    pub siswa_magang_id: Uuid,
    pub document_template_id: Uuid,
    pub status: String,
    pub catatan: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentInstanceRow> for DocumentInstance {
    type Error = UnknownStatus;

    fn try_from(row: DocumentInstanceRow) -> Result<Self, Self::Error> {
        Ok(DocumentInstance {
            id: row.id,
            siswa_magang_id: row.siswa_magang_id,
            document_template_id: row.document_template_id,
            status: row.status.parse()?,
            catatan: row.catatan,
            verified_at: row.verified_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewDocumentInstance {
    pub siswa_magang_id: Uuid,
    pub document_template_id: Uuid,
    pub status: DocumentStatus,
}

/// Partial update. `None` leaves a field untouched; `verified_at: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub status: Option<DocumentStatus>,
    pub catatan: Option<String>,
    pub verified_at: Option<Option<DateTime<Utc>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display_agree() {
        for status in [
            DocumentStatus::Pending,
            DocumentStatus::Draft,
            DocumentStatus::Uploaded,
            DocumentStatus::Review,
            DocumentStatus::Verified,
            DocumentStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse::<DocumentStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "approved".parse::<DocumentStatus>().unwrap_err();
        assert_eq!(err, UnknownStatus("approved".to_string()));
    }

    #[test]
    fn test_outstanding_excludes_terminal_states() {
        assert!(DocumentStatus::Review.is_outstanding());
        assert!(DocumentStatus::Pending.is_outstanding());
        assert!(!DocumentStatus::Verified.is_outstanding());
        assert!(!DocumentStatus::Rejected.is_outstanding());
    }

    #[test]
    fn test_row_with_bad_status_fails_conversion() {
        let row = DocumentInstanceRow {
            id: Uuid::new_v4(),
            siswa_magang_id: Uuid::new_v4(),
            document_template_id: Uuid::new_v4(),
            status: "lost".to_string(),
            catatan: None,
            verified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(DocumentInstance::try_from(row).is_err());
    }
}
