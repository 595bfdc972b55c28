//! # Dispute Status Lifecycle
//!
//! One canonical status vocabulary for the whole stack.
//!
//! The system this replaces accumulated two disjoint vocabularies for the
//! same lifecycle — one written by the mailing workflow
//! (`SENT`/`IN_PROGRESS`/…) and one by the investigation tracker
//! (`READY_TO_MAIL`/`VERIFIED`/`NO_RESPONSE`/…). Handlers disagreed about
//! which was authoritative. Here there is exactly one enum; both legacy
//! vocabularies map onto it via [`DisputeStatus::from_legacy`], and unknown
//! strings fail closed.
//!
//! ## Lifecycle
//!
//! ```text
//! DRAFT ──▶ GENERATED ──▶ READY_TO_MAIL ──▶ MAILED ──▶ DELIVERED
//!                                                          │
//!                                                          ▼
//!                                                   IN_INVESTIGATION
//!                                                          │
//!                          ┌───────────────┬───────────────┤
//!                          ▼               ▼               ▼
//!                   REMOVED/CORRECTED   VERIFIED      NO_RESPONSE
//!                          │               └───────┬───────┘
//!                          ▼                       ▼
//!                      RESOLVED                ESCALATED
//!
//! CLOSED and DELETED are terminal bookkeeping states reachable from
//! anywhere; they are soft-delete markers, never row removal.
//! ```

use serde::{Deserialize, Serialize};

/// The canonical lifecycle status of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    /// Dispute created; no letter generated yet.
    Draft,
    /// Letter body rendered and stored.
    Generated,
    /// Letter printed and queued for mailing.
    ReadyToMail,
    /// Letter handed to the carrier.
    Mailed,
    /// Carrier confirmed delivery to the bureau.
    Delivered,
    /// Statutory investigation window is running.
    InInvestigation,
    /// Bureau response received, outcome not yet classified.
    ResponseReceived,
    /// Bureau removed the disputed item.
    Removed,
    /// Bureau corrected the disputed item.
    Corrected,
    /// Bureau verified the item and refused to change it.
    Verified,
    /// Investigation window elapsed with no bureau response.
    NoResponse,
    /// Dispute concluded in the consumer's favor.
    Resolved,
    /// Moved to the AI-assisted escalation workflow.
    Escalated,
    /// Dispute closed without further action. Terminal.
    Closed,
    /// Soft-deleted by the consumer. Terminal.
    Deleted,
}

impl DisputeStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Generated => "GENERATED",
            Self::ReadyToMail => "READY_TO_MAIL",
            Self::Mailed => "MAILED",
            Self::Delivered => "DELIVERED",
            Self::InInvestigation => "IN_INVESTIGATION",
            Self::ResponseReceived => "RESPONSE_RECEIVED",
            Self::Removed => "REMOVED",
            Self::Corrected => "CORRECTED",
            Self::Verified => "VERIFIED",
            Self::NoResponse => "NO_RESPONSE",
            Self::Resolved => "RESOLVED",
            Self::Escalated => "ESCALATED",
            Self::Closed => "CLOSED",
            Self::Deleted => "DELETED",
        }
    }

    /// Parse a canonical status name. Fails closed on anything else —
    /// including the legacy vocabularies, which must go through
    /// [`DisputeStatus::from_legacy`] so the mapping stays explicit.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "GENERATED" => Some(Self::Generated),
            "READY_TO_MAIL" => Some(Self::ReadyToMail),
            "MAILED" => Some(Self::Mailed),
            "DELIVERED" => Some(Self::Delivered),
            "IN_INVESTIGATION" => Some(Self::InInvestigation),
            "RESPONSE_RECEIVED" => Some(Self::ResponseReceived),
            "REMOVED" => Some(Self::Removed),
            "CORRECTED" => Some(Self::Corrected),
            "VERIFIED" => Some(Self::Verified),
            "NO_RESPONSE" => Some(Self::NoResponse),
            "RESOLVED" => Some(Self::Resolved),
            "ESCALATED" => Some(Self::Escalated),
            "CLOSED" => Some(Self::Closed),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Map a legacy status string (either historical vocabulary) onto the
    /// canonical enum.
    ///
    /// The mailing-workflow vocabulary: `SENT`, `IN_PROGRESS`, `RESOLVED`,
    /// `ESCALATED`, `DELETED`. The investigation-tracker vocabulary:
    /// `READY_TO_MAIL`, `MAILED`, `DELIVERED`, `IN_INVESTIGATION`,
    /// `REMOVED`, `VERIFIED`, `NO_RESPONSE`, `ESCALATION_AVAILABLE`,
    /// `CLOSED`.
    ///
    /// `ESCALATION_AVAILABLE` folds into `VERIFIED`: escalation eligibility
    /// is a derivable property of the status, not a status of its own.
    pub fn from_legacy(s: &str) -> Option<Self> {
        match s {
            // Mailing-workflow vocabulary.
            "SENT" => Some(Self::Mailed),
            "IN_PROGRESS" => Some(Self::InInvestigation),
            "RESOLVED" => Some(Self::Resolved),
            "ESCALATED" => Some(Self::Escalated),
            "DELETED" => Some(Self::Deleted),
            // Investigation-tracker vocabulary.
            "READY_TO_MAIL" => Some(Self::ReadyToMail),
            "MAILED" => Some(Self::Mailed),
            "DELIVERED" => Some(Self::Delivered),
            "IN_INVESTIGATION" => Some(Self::InInvestigation),
            "REMOVED" => Some(Self::Removed),
            "VERIFIED" => Some(Self::Verified),
            "NO_RESPONSE" => Some(Self::NoResponse),
            "ESCALATION_AVAILABLE" => Some(Self::Verified),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Whether this status is terminal: the record is dead bookkeeping and
    /// rejects further workflow mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Deleted)
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Investigation Outcome ──────────────────────────────────────────────

/// How a bureau investigation concluded.
///
/// Recorded by the consumer (or a mail-tracking import) when the
/// investigation window ends. Each outcome maps to the status the dispute
/// lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestigationOutcome {
    /// The disputed item was removed from the report.
    Removed,
    /// The disputed item was corrected.
    Corrected,
    /// The bureau verified the item and kept it.
    Verified,
    /// The bureau never responded within the window.
    NoResponse,
}

impl InvestigationOutcome {
    /// The canonical string name of this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Removed => "REMOVED",
            Self::Corrected => "CORRECTED",
            Self::Verified => "VERIFIED",
            Self::NoResponse => "NO_RESPONSE",
        }
    }

    /// Parse an outcome name. Fails closed.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "REMOVED" => Some(Self::Removed),
            "CORRECTED" => Some(Self::Corrected),
            "VERIFIED" => Some(Self::Verified),
            "NO_RESPONSE" => Some(Self::NoResponse),
            _ => None,
        }
    }

    /// The status a dispute lands in when this outcome is recorded.
    ///
    /// A removal or correction resolves the dispute outright; a
    /// verification or silence leaves it eligible for escalation.
    pub fn resulting_status(&self) -> DisputeStatus {
        match self {
            Self::Removed | Self::Corrected => DisputeStatus::Resolved,
            Self::Verified => DisputeStatus::Verified,
            Self::NoResponse => DisputeStatus::NoResponse,
        }
    }
}

impl std::fmt::Display for InvestigationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_every_status() {
        let all = [
            DisputeStatus::Draft,
            DisputeStatus::Generated,
            DisputeStatus::ReadyToMail,
            DisputeStatus::Mailed,
            DisputeStatus::Delivered,
            DisputeStatus::InInvestigation,
            DisputeStatus::ResponseReceived,
            DisputeStatus::Removed,
            DisputeStatus::Corrected,
            DisputeStatus::Verified,
            DisputeStatus::NoResponse,
            DisputeStatus::Resolved,
            DisputeStatus::Escalated,
            DisputeStatus::Closed,
            DisputeStatus::Deleted,
        ];
        for status in all {
            assert_eq!(DisputeStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_parse_fails_closed() {
        assert_eq!(DisputeStatus::parse("SENT"), None);
        assert_eq!(DisputeStatus::parse("bogus"), None);
        assert_eq!(DisputeStatus::parse(""), None);
    }

    #[test]
    fn test_legacy_mailing_vocabulary() {
        assert_eq!(DisputeStatus::from_legacy("SENT"), Some(DisputeStatus::Mailed));
        assert_eq!(
            DisputeStatus::from_legacy("IN_PROGRESS"),
            Some(DisputeStatus::InInvestigation)
        );
        assert_eq!(
            DisputeStatus::from_legacy("DELETED"),
            Some(DisputeStatus::Deleted)
        );
    }

    #[test]
    fn test_legacy_tracker_vocabulary() {
        assert_eq!(
            DisputeStatus::from_legacy("READY_TO_MAIL"),
            Some(DisputeStatus::ReadyToMail)
        );
        assert_eq!(
            DisputeStatus::from_legacy("ESCALATION_AVAILABLE"),
            Some(DisputeStatus::Verified)
        );
        assert_eq!(
            DisputeStatus::from_legacy("NO_RESPONSE"),
            Some(DisputeStatus::NoResponse)
        );
    }

    #[test]
    fn test_legacy_fails_closed() {
        assert_eq!(DisputeStatus::from_legacy("DRAFT_V2"), None);
        assert_eq!(DisputeStatus::from_legacy(""), None);
    }

    #[test]
    fn test_terminality() {
        assert!(DisputeStatus::Closed.is_terminal());
        assert!(DisputeStatus::Deleted.is_terminal());
        assert!(!DisputeStatus::Resolved.is_terminal());
        assert!(!DisputeStatus::Escalated.is_terminal());
        assert!(!DisputeStatus::Draft.is_terminal());
    }

    #[test]
    fn test_outcome_resulting_status() {
        assert_eq!(
            InvestigationOutcome::Removed.resulting_status(),
            DisputeStatus::Resolved
        );
        assert_eq!(
            InvestigationOutcome::Corrected.resulting_status(),
            DisputeStatus::Resolved
        );
        assert_eq!(
            InvestigationOutcome::Verified.resulting_status(),
            DisputeStatus::Verified
        );
        assert_eq!(
            InvestigationOutcome::NoResponse.resulting_status(),
            DisputeStatus::NoResponse
        );
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&DisputeStatus::InInvestigation).unwrap();
        assert_eq!(json, "\"IN_INVESTIGATION\"");
        let parsed: DisputeStatus = serde_json::from_str("\"NO_RESPONSE\"").unwrap();
        assert_eq!(parsed, DisputeStatus::NoResponse);
    }
}
