//! # Persisted Dispute Record
//!
//! The dispute entity owned by a consumer: identity, target creditor and
//! bureau, the canonical status, the rendered letter body, and the mailing /
//! delivery / response timestamps the display-progress derivation reads.
//!
//! ## Design Choice: Loose Fields, Mechanical Transitions
//!
//! The workflow timestamps are independent `Option` fields, deliberately NOT
//! encoded as a typestate chain. The status field and the timestamps are
//! maintained independently and may disagree (a record imported from legacy
//! data can carry `RESOLVED` with sparse timestamps); the progress
//! derivation in `dflow-workflow` computes a best-effort display ordinal
//! without validating consistency. The transition methods here are
//! mechanical field updates with exactly one rule: a terminal record
//! (`CLOSED`/`DELETED`) rejects further mutation.
//!
//! Eligibility rules (creation throttling, escalation gating) live in
//! `dflow-workflow::guards` and are applied by callers before these methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bureau::Bureau;
use crate::identity::{DisputeId, UserId};
use crate::status::{DisputeStatus, InvestigationOutcome};

/// Errors from dispute record mutation.
#[derive(Error, Debug)]
pub enum DisputeError {
    /// The record is in a terminal status and cannot be mutated.
    #[error("dispute {id} is {status} and cannot be modified")]
    Terminal {
        /// The dispute identifier.
        id: DisputeId,
        /// The terminal status the record is parked in.
        status: DisputeStatus,
    },
}

/// A consumer's dispute against one creditor line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    /// Unique dispute identifier.
    pub id: DisputeId,
    /// The consumer who owns this dispute.
    pub user_id: UserId,
    /// Name of the creditor or furnisher being disputed.
    pub creditor_name: String,
    /// Account number with the creditor, if known.
    pub account_number: Option<String>,
    /// Target bureau (or `ALL`).
    pub bureau: Bureau,
    /// Canonical lifecycle status.
    pub status: DisputeStatus,
    /// The selected dispute reason.
    pub reason: String,
    /// Free-text elaboration of the reason, if any.
    pub custom_reason: Option<String>,
    /// Rendered letter body, once generated.
    pub letter_content: Option<String>,
    /// When the letter was handed to the carrier.
    pub mailed_at: Option<DateTime<Utc>>,
    /// Carrier tracking number, once assigned.
    pub tracking_number: Option<String>,
    /// When the carrier confirmed delivery.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the bureau's response is due.
    pub response_deadline: Option<DateTime<Utc>>,
    /// When the investigation outcome was recorded.
    pub response_received_at: Option<DateTime<Utc>>,
    /// Debt-validation letter sent to the collector.
    pub dv_sent: bool,
    /// Collector answered the debt-validation letter.
    pub dv_response_received: bool,
    /// Follow-up dispute filed with the bureau over the collection item.
    pub cra_dispute_sent: bool,
    /// When the dispute was created.
    pub created_at: DateTime<Utc>,
    /// When the dispute was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Dispute {
    /// Create a dispute in `DRAFT` against the given creditor and bureau.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        creditor_name: impl Into<String>,
        account_number: Option<String>,
        bureau: Bureau,
        reason: impl Into<String>,
        custom_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DisputeId::new(),
            user_id,
            creditor_name: creditor_name.into(),
            account_number,
            bureau,
            status: DisputeStatus::Draft,
            reason: reason.into(),
            custom_reason,
            letter_content: None,
            mailed_at: None,
            tracking_number: None,
            delivered_at: None,
            response_deadline: None,
            response_received_at: None,
            dv_sent: false,
            dv_response_received: false,
            cra_dispute_sent: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Store a rendered letter body and move to `GENERATED`.
    pub fn attach_letter(
        &mut self,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DisputeError> {
        self.require_mutable()?;
        self.letter_content = Some(content.into());
        self.status = DisputeStatus::Generated;
        self.updated_at = now;
        Ok(())
    }

    /// Record the mailing event: tracking number, mail timestamp, and the
    /// response deadline computed by the caller from the template stage.
    pub fn record_mailing(
        &mut self,
        tracking_number: impl Into<String>,
        mailed_at: DateTime<Utc>,
        response_deadline: DateTime<Utc>,
    ) -> Result<(), DisputeError> {
        self.require_mutable()?;
        self.tracking_number = Some(tracking_number.into());
        self.mailed_at = Some(mailed_at);
        self.response_deadline = Some(response_deadline);
        self.status = DisputeStatus::Mailed;
        self.updated_at = mailed_at;
        Ok(())
    }

    /// Record carrier-confirmed delivery. The statutory window runs from
    /// receipt, so the deadline is re-anchored and the status moves to
    /// `IN_INVESTIGATION`.
    pub fn record_delivery(
        &mut self,
        delivered_at: DateTime<Utc>,
        response_deadline: DateTime<Utc>,
    ) -> Result<(), DisputeError> {
        self.require_mutable()?;
        self.delivered_at = Some(delivered_at);
        self.response_deadline = Some(response_deadline);
        self.status = DisputeStatus::InInvestigation;
        self.updated_at = delivered_at;
        Ok(())
    }

    /// Record how the investigation concluded. A removal or correction
    /// resolves the dispute; verification or silence leaves it eligible for
    /// escalation.
    pub fn record_outcome(
        &mut self,
        outcome: InvestigationOutcome,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), DisputeError> {
        self.require_mutable()?;
        self.response_received_at = Some(recorded_at);
        self.status = outcome.resulting_status();
        self.updated_at = recorded_at;
        Ok(())
    }

    /// Move the dispute into the escalation workflow.
    ///
    /// Callers must have checked `escalation_allowed` first; this method is
    /// mechanical.
    pub fn mark_escalated(&mut self, now: DateTime<Utc>) -> Result<(), DisputeError> {
        self.require_mutable()?;
        self.status = DisputeStatus::Escalated;
        self.updated_at = now;
        Ok(())
    }

    /// Soft-delete the record. The row survives with status `DELETED`.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> Result<(), DisputeError> {
        self.require_mutable()?;
        self.status = DisputeStatus::Deleted;
        self.updated_at = now;
        Ok(())
    }

    /// Whether the record still participates in workflow views (counters,
    /// deadline notices, listings).
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    fn require_mutable(&self) -> Result<(), DisputeError> {
        if self.status.is_terminal() {
            return Err(DisputeError::Terminal {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }
}
