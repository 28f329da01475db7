//! Canonical workflow status enumeration.
//!
//! One shared set of workflow states covers submissions, speakers,
//! sponsors, and tasks, with a per-entity allow-list because not every
//! state applies to every entity. Task rows persist two of the states
//! under historical column keys; that translation belongs to the
//! persistence layer, which uses [`Status::task_storage_key`] and
//! [`Status::from_task_storage_key`].

use serde::{Deserialize, Serialize};

/// Workflow state shared across entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
    PaymentPending,
    PaymentConfirmed,
    InProgress,
    Completed,
}

/// Entity kinds that carry a status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEntity {
    Submission,
    Speaker,
    Sponsor,
    Task,
}

impl Status {
    /// Canonical wire key, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
            Status::PaymentPending => "payment_pending",
            Status::PaymentConfirmed => "payment_confirmed",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }

    /// Parses a canonical wire key.
    pub fn parse(value: &str) -> Option<Status> {
        match value {
            "pending" => Some(Status::Pending),
            "approved" => Some(Status::Approved),
            "rejected" => Some(Status::Rejected),
            "payment_pending" => Some(Status::PaymentPending),
            "payment_confirmed" => Some(Status::PaymentConfirmed),
            "in_progress" => Some(Status::InProgress),
            "completed" => Some(Status::Completed),
            _ => None,
        }
    }

    /// Human-readable label for messages and rendered documents.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Approved => "Approved",
            Status::Rejected => "Rejected",
            Status::PaymentPending => "Payment Pending",
            Status::PaymentConfirmed => "Payment Confirmed",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    /// The states valid for a given entity kind.
    pub fn allowed_for(entity: StatusEntity) -> &'static [Status] {
        match entity {
            StatusEntity::Submission => &[
                Status::Pending,
                Status::Approved,
                Status::Rejected,
                Status::PaymentPending,
                Status::PaymentConfirmed,
            ],
            StatusEntity::Speaker => &[Status::Pending, Status::Approved, Status::Rejected],
            StatusEntity::Sponsor => &[
                Status::Pending,
                Status::Approved,
                Status::Rejected,
                Status::PaymentPending,
                Status::PaymentConfirmed,
            ],
            StatusEntity::Task => &[Status::Pending, Status::InProgress, Status::Completed],
        }
    }

    /// Whether this state is valid for the entity kind.
    pub fn is_allowed_for(&self, entity: StatusEntity) -> bool {
        Status::allowed_for(entity).contains(self)
    }

    /// Column key used when persisting a task status. Tasks store the two
    /// active states under historical keys; everything else is canonical.
    pub fn task_storage_key(&self) -> &'static str {
        match self {
            Status::InProgress => "doing",
            Status::Completed => "done",
            other => other.as_str(),
        }
    }

    /// Parses a task status column value, accepting both the historical
    /// keys and the canonical spellings.
    pub fn from_task_storage_key(value: &str) -> Option<Status> {
        match value {
            "doing" => Some(Status::InProgress),
            "done" => Some(Status::Completed),
            other => Status::parse(other),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_keys_roundtrip() {
        for status in [
            Status::Pending,
            Status::Approved,
            Status::Rejected,
            Status::PaymentPending,
            Status::PaymentConfirmed,
            Status::InProgress,
            Status::Completed,
        ] {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Status::parse("cancelled"), None);
        assert_eq!(Status::parse(""), None);
        assert_eq!(Status::parse("Pending"), None);
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&Status::PaymentPending).unwrap();
        assert_eq!(json, "\"payment_pending\"");
        let parsed: Status = serde_json::from_str("\"payment_confirmed\"").unwrap();
        assert_eq!(parsed, Status::PaymentConfirmed);
    }

    #[test]
    fn test_submission_allow_list() {
        assert!(Status::Pending.is_allowed_for(StatusEntity::Submission));
        assert!(Status::PaymentConfirmed.is_allowed_for(StatusEntity::Submission));
        assert!(!Status::InProgress.is_allowed_for(StatusEntity::Submission));
        assert!(!Status::Completed.is_allowed_for(StatusEntity::Submission));
    }

    #[test]
    fn test_speaker_allow_list() {
        assert!(Status::Approved.is_allowed_for(StatusEntity::Speaker));
        assert!(!Status::PaymentPending.is_allowed_for(StatusEntity::Speaker));
    }

    #[test]
    fn test_task_allow_list() {
        assert!(Status::InProgress.is_allowed_for(StatusEntity::Task));
        assert!(Status::Completed.is_allowed_for(StatusEntity::Task));
        assert!(!Status::Approved.is_allowed_for(StatusEntity::Task));
    }

    #[test]
    fn test_task_storage_keys() {
        assert_eq!(Status::InProgress.task_storage_key(), "doing");
        assert_eq!(Status::Completed.task_storage_key(), "done");
        assert_eq!(Status::Pending.task_storage_key(), "pending");
    }

    #[test]
    fn test_task_storage_key_parse_accepts_both_spellings() {
        assert_eq!(
            Status::from_task_storage_key("doing"),
            Some(Status::InProgress)
        );
        assert_eq!(Status::from_task_storage_key("done"), Some(Status::Completed));
        assert_eq!(
            Status::from_task_storage_key("in_progress"),
            Some(Status::InProgress)
        );
        assert_eq!(
            Status::from_task_storage_key("completed"),
            Some(Status::Completed)
        );
        assert_eq!(
            Status::from_task_storage_key("pending"),
            Some(Status::Pending)
        );
        assert_eq!(Status::from_task_storage_key("archived"), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Status::PaymentPending.label(), "Payment Pending");
        assert_eq!(Status::InProgress.label(), "In Progress");
    }

    #[test]
    fn test_display_uses_wire_key() {
        assert_eq!(Status::PaymentConfirmed.to_string(), "payment_confirmed");
    }
}
