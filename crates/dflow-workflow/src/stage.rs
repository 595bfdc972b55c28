//! # Letter-Template Stages
//!
//! The fixed six-step escalation ladder a consumer walks through:
//!
//! ```text
//! INVESTIGATION_REQUEST ──▶ PERSONAL_INFO_REMOVER ──▶ VALIDATION_OF_DEBT
//!                                                            │
//!                                                            ▼
//!      AI_ESCALATION ◀── TERMINATION_LETTER ◀── FACTUAL_LETTER
//! ```
//!
//! Declaration order IS the progression order: [`TemplateStage::next`] is a
//! pure ordinal lookup and the sole basis for "what comes after". No stage
//! may be skipped going forward, and the final stage has no successor.
//!
//! String input is validated at [`TemplateStage::parse`], which fails
//! closed. Because a `TemplateStage` value cannot be out of range, the
//! sequencer answers only terminality — membership and terminality are
//! separate questions with separate answers.

use serde::{Deserialize, Serialize};

/// A position in the fixed six-step letter-escalation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TemplateStage {
    /// Step 1: initial investigation request to the bureau.
    InvestigationRequest = 0,
    /// Step 2: removal of outdated or inaccurate personal identifiers.
    PersonalInfoRemover = 1,
    /// Step 3: debt-validation demand to the collector.
    ValidationOfDebt = 2,
    /// Step 4: item-specific factual dispute with documentation.
    FactualLetter = 3,
    /// Step 5: final demand citing accumulated compliance failures.
    TerminationLetter = 4,
    /// Step 6: AI-assisted escalation, generated out-of-band.
    AiEscalation = 5,
}

impl TemplateStage {
    /// Total number of stages in the sequence.
    pub const STAGE_COUNT: u8 = 6;

    /// All stages in progression order.
    pub fn all() -> &'static [TemplateStage] {
        &[
            Self::InvestigationRequest,
            Self::PersonalInfoRemover,
            Self::ValidationOfDebt,
            Self::FactualLetter,
            Self::TerminationLetter,
            Self::AiEscalation,
        ]
    }

    /// The zero-based ordinal of this stage.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// The stage immediately following this one, or `None` at the end of
    /// the sequence.
    pub fn next(&self) -> Option<TemplateStage> {
        match self {
            Self::InvestigationRequest => Some(Self::PersonalInfoRemover),
            Self::PersonalInfoRemover => Some(Self::ValidationOfDebt),
            Self::ValidationOfDebt => Some(Self::FactualLetter),
            Self::FactualLetter => Some(Self::TerminationLetter),
            Self::TerminationLetter => Some(Self::AiEscalation),
            Self::AiEscalation => None,
        }
    }

    /// Whether this is the final stage.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::AiEscalation)
    }

    /// The canonical string name of this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvestigationRequest => "INVESTIGATION_REQUEST",
            Self::PersonalInfoRemover => "PERSONAL_INFO_REMOVER",
            Self::ValidationOfDebt => "VALIDATION_OF_DEBT",
            Self::FactualLetter => "FACTUAL_LETTER",
            Self::TerminationLetter => "TERMINATION_LETTER",
            Self::AiEscalation => "AI_ESCALATION",
        }
    }

    /// Parse a canonical stage name. Fails closed on anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "INVESTIGATION_REQUEST" => Some(Self::InvestigationRequest),
            "PERSONAL_INFO_REMOVER" => Some(Self::PersonalInfoRemover),
            "VALIDATION_OF_DEBT" => Some(Self::ValidationOfDebt),
            "FACTUAL_LETTER" => Some(Self::FactualLetter),
            "TERMINATION_LETTER" => Some(Self::TerminationLetter),
            "AI_ESCALATION" => Some(Self::AiEscalation),
            _ => None,
        }
    }

    /// Percentage of the ladder completed once this stage is reached,
    /// rounded to the nearest integer.
    pub fn completion_percent(&self) -> u8 {
        let position = f64::from(self.ordinal()) + 1.0;
        (position / f64::from(Self::STAGE_COUNT) * 100.0).round() as u8
    }

    /// Static reference data for this stage.
    pub fn descriptor(&self) -> &'static StageDescriptor {
        &DESCRIPTORS[self.ordinal() as usize]
    }
}

impl std::fmt::Display for TemplateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Descriptors ────────────────────────────────────────────────────────

/// Static reference data for one stage: display strings and the advised
/// bureau-response wait. Never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageDescriptor {
    /// The stage this descriptor belongs to.
    pub stage: TemplateStage,
    /// Short display title.
    pub title: &'static str,
    /// One-sentence description shown in the workflow UI.
    pub description: &'static str,
    /// Days a consumer is advised to wait for a bureau response before
    /// advancing to the next stage.
    pub wait_days: u32,
}

/// Descriptor table, indexed by stage ordinal.
static DESCRIPTORS: [StageDescriptor; TemplateStage::STAGE_COUNT as usize] = [
    StageDescriptor {
        stage: TemplateStage::InvestigationRequest,
        title: "Investigation Request",
        description: "Ask the bureau to investigate the disputed item under FCRA Section 611.",
        wait_days: 30,
    },
    StageDescriptor {
        stage: TemplateStage::PersonalInfoRemover,
        title: "Personal Information Removal",
        description: "Request removal of outdated addresses, names, and employers from the file.",
        wait_days: 30,
    },
    StageDescriptor {
        stage: TemplateStage::ValidationOfDebt,
        title: "Debt Validation",
        description: "Demand validation of the alleged debt from the collector under FDCPA Section 809.",
        wait_days: 30,
    },
    StageDescriptor {
        stage: TemplateStage::FactualLetter,
        title: "Factual Dispute",
        description: "Challenge the item on specific factual grounds with supporting documentation.",
        wait_days: 30,
    },
    StageDescriptor {
        stage: TemplateStage::TerminationLetter,
        title: "Final Demand",
        description: "Put the bureau on notice of accumulated FCRA violations before escalation.",
        wait_days: 15,
    },
    StageDescriptor {
        stage: TemplateStage::AiEscalation,
        title: "AI Escalation",
        description: "A personalized escalation letter generated from the full dispute history.",
        wait_days: 30,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_advances_by_one_ordinal() {
        for stage in TemplateStage::all() {
            match stage.next() {
                Some(next) => assert_eq!(next.ordinal(), stage.ordinal() + 1),
                None => assert!(stage.is_final()),
            }
        }
    }

    #[test]
    fn test_termination_advances_to_escalation() {
        assert_eq!(
            TemplateStage::TerminationLetter.next(),
            Some(TemplateStage::AiEscalation)
        );
    }

    #[test]
    fn test_final_stage_has_no_successor() {
        assert_eq!(TemplateStage::AiEscalation.next(), None);
    }

    #[test]
    fn test_parse_fails_closed() {
        assert_eq!(TemplateStage::parse("NOT_A_STAGE"), None);
        assert_eq!(TemplateStage::parse("investigation_request"), None);
        assert_eq!(TemplateStage::parse(""), None);
    }

    #[test]
    fn test_parse_roundtrips_every_stage() {
        for stage in TemplateStage::all() {
            assert_eq!(TemplateStage::parse(stage.as_str()), Some(*stage));
        }
    }

    #[test]
    fn test_ordering_matches_progression() {
        assert!(TemplateStage::InvestigationRequest < TemplateStage::PersonalInfoRemover);
        assert!(TemplateStage::TerminationLetter < TemplateStage::AiEscalation);
    }

    #[test]
    fn test_completion_percent() {
        assert_eq!(TemplateStage::InvestigationRequest.completion_percent(), 17);
        assert_eq!(TemplateStage::PersonalInfoRemover.completion_percent(), 33);
        assert_eq!(TemplateStage::ValidationOfDebt.completion_percent(), 50);
        assert_eq!(TemplateStage::FactualLetter.completion_percent(), 67);
        assert_eq!(TemplateStage::TerminationLetter.completion_percent(), 83);
        assert_eq!(TemplateStage::AiEscalation.completion_percent(), 100);
    }

    #[test]
    fn test_descriptors_align_with_stages() {
        for stage in TemplateStage::all() {
            assert_eq!(stage.descriptor().stage, *stage);
            assert!(stage.descriptor().wait_days > 0);
        }
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&TemplateStage::AiEscalation).unwrap();
        assert_eq!(json, "\"AI_ESCALATION\"");
        let parsed: TemplateStage = serde_json::from_str("\"VALIDATION_OF_DEBT\"").unwrap();
        assert_eq!(parsed, TemplateStage::ValidationOfDebt);
    }
}
