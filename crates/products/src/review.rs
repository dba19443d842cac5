//! Admin review decisions on pending products.
//!
//! A decision is what the review modal produces and what
//! `PATCH /admin/products/:id/status` carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::DomainError;

use crate::product::{
    ApproveProduct, ProductCommand, ProductId, ProductStatus, RejectProduct, RequestChanges,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Approved {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    Rejected {
        #[serde(rename = "rejectionReason")]
        reason: String,
    },
    /// "Request changes": the product goes back to DRAFT.
    #[serde(rename = "DRAFT")]
    ChangesRequested {
        #[serde(rename = "reviewNote")]
        note: String,
    },
}

impl ReviewDecision {
    pub fn approve(note: Option<String>) -> Self {
        Self::Approved { note }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn request_changes(note: impl Into<String>) -> Self {
        Self::ChangesRequested { note: note.into() }
    }

    /// Status the product ends up in.
    pub fn target_status(&self) -> ProductStatus {
        match self {
            ReviewDecision::Approved { .. } => ProductStatus::Approved,
            ReviewDecision::Rejected { .. } => ProductStatus::Rejected,
            ReviewDecision::ChangesRequested { .. } => ProductStatus::Draft,
        }
    }

    /// Form validation run before anything is sent.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            ReviewDecision::Approved { .. } => Ok(()),
            ReviewDecision::Rejected { reason } if reason.trim().is_empty() => {
                Err(DomainError::validation("rejection reason is required"))
            }
            ReviewDecision::ChangesRequested { note } if note.trim().is_empty() => Err(
                DomainError::validation("a note describing the changes is required"),
            ),
            _ => Ok(()),
        }
    }

    pub fn into_command(self, product_id: ProductId, occurred_at: DateTime<Utc>) -> ProductCommand {
        match self {
            ReviewDecision::Approved { note } => ProductCommand::ApproveProduct(ApproveProduct {
                product_id,
                note,
                occurred_at,
            }),
            ReviewDecision::Rejected { reason } => ProductCommand::RejectProduct(RejectProduct {
                product_id,
                reason,
                occurred_at,
            }),
            ReviewDecision::ChangesRequested { note } => {
                ProductCommand::RequestChanges(RequestChanges {
                    product_id,
                    note,
                    occurred_at,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_reason_or_note_fails_validation() {
        assert!(ReviewDecision::reject("  ").validate().is_err());
        assert!(ReviewDecision::request_changes("").validate().is_err());
        assert!(ReviewDecision::approve(None).validate().is_ok());
        assert!(ReviewDecision::reject("Missing certification").validate().is_ok());
    }

    #[test]
    fn wire_shape_matches_status_patch_body() {
        assert_eq!(
            serde_json::to_value(ReviewDecision::reject("Missing certification")).unwrap(),
            json!({ "status": "REJECTED", "rejectionReason": "Missing certification" })
        );
        assert_eq!(
            serde_json::to_value(ReviewDecision::request_changes("Add photos")).unwrap(),
            json!({ "status": "DRAFT", "reviewNote": "Add photos" })
        );
        assert_eq!(
            serde_json::to_value(ReviewDecision::approve(None)).unwrap(),
            json!({ "status": "APPROVED" })
        );
        let parsed: ReviewDecision =
            serde_json::from_value(json!({ "status": "APPROVED", "note": "looks good" })).unwrap();
        assert_eq!(parsed, ReviewDecision::approve(Some("looks good".to_string())));
    }

    #[test]
    fn target_status_follows_decision() {
        assert_eq!(ReviewDecision::approve(None).target_status(), ProductStatus::Approved);
        assert_eq!(ReviewDecision::reject("x").target_status(), ProductStatus::Rejected);
        assert_eq!(ReviewDecision::request_changes("x").target_status(), ProductStatus::Draft);
    }
}
