use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::snapshot::QuotationSnapshot;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotationId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotationStatus {
    Draft,
    Priced,
    Sent,
    Accepted,
    Rejected,
    Revised,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    pub client_name: String,
    pub status: QuotationStatus,
    pub snapshot: QuotationSnapshot,
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    pub fn draft(
        id: QuotationId,
        client_name: impl Into<String>,
        snapshot: QuotationSnapshot,
    ) -> Self {
        Self {
            id,
            client_name: client_name.into(),
            status: QuotationStatus::Draft,
            snapshot,
            created_at: Utc::now(),
        }
    }

    pub fn can_transition_to(&self, next: QuotationStatus) -> bool {
        matches!(
            (&self.status, next),
            (QuotationStatus::Draft, QuotationStatus::Priced)
                | (QuotationStatus::Revised, QuotationStatus::Priced)
                | (QuotationStatus::Priced, QuotationStatus::Sent)
                | (QuotationStatus::Sent, QuotationStatus::Accepted)
                | (QuotationStatus::Sent, QuotationStatus::Rejected)
                | (
                    QuotationStatus::Draft
                        | QuotationStatus::Priced
                        | QuotationStatus::Sent
                        | QuotationStatus::Rejected,
                    QuotationStatus::Revised
                )
                | (
                    QuotationStatus::Draft
                        | QuotationStatus::Priced
                        | QuotationStatus::Sent
                        | QuotationStatus::Rejected
                        | QuotationStatus::Revised,
                    QuotationStatus::Cancelled
                )
        )
    }

    pub fn transition_to(&mut self, next: QuotationStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next.clone()) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidQuotationTransition { from: self.status.clone(), to: next })
    }

    /// Replaces the form values. Only drafts and revisions are editable.
    pub fn update_snapshot(&mut self, snapshot: QuotationSnapshot) -> Result<(), DomainError> {
        match self.status {
            QuotationStatus::Draft | QuotationStatus::Revised => {
                self.snapshot = snapshot;
                Ok(())
            }
            _ => Err(DomainError::QuotationLocked { status: self.status.clone() }),
        }
    }
}
