//! # Credit Bureau Registry
//!
//! The three national consumer reporting agencies plus the `ALL` sentinel,
//! with the fixed mailing-address table used when rendering dispute letters.
//!
//! Bureau codes arriving over the wire are matched case-insensitively. An
//! unrecognized code is NOT an error at the rendering layer: the raw code is
//! echoed back as the address block so a letter can still be produced for a
//! regional or specialty agency the table does not know about.

use serde::{Deserialize, Serialize};

/// A consumer credit reporting agency, or the `ALL` sentinel meaning all
/// three national bureaus at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bureau {
    /// Experian Information Solutions.
    Experian,
    /// Equifax Information Services.
    Equifax,
    /// TransUnion.
    Transunion,
    /// All three national bureaus.
    All,
}

impl Bureau {
    /// The three real bureaus, excluding the `ALL` sentinel.
    pub fn nationals() -> &'static [Bureau] {
        &[Self::Experian, Self::Equifax, Self::Transunion]
    }

    /// The canonical string code for this bureau.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Experian => "EXPERIAN",
            Self::Equifax => "EQUIFAX",
            Self::Transunion => "TRANSUNION",
            Self::All => "ALL",
        }
    }

    /// Parse a bureau code, case-insensitively. Fails closed on anything
    /// outside the four known codes.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "EXPERIAN" => Some(Self::Experian),
            "EQUIFAX" => Some(Self::Equifax),
            "TRANSUNION" => Some(Self::Transunion),
            "ALL" => Some(Self::All),
            _ => None,
        }
    }

    /// The dispute mailing address for this bureau.
    ///
    /// `None` for the `ALL` sentinel — a letter is always addressed to a
    /// single bureau; fan-out across bureaus happens above this layer.
    pub fn mailing_address(&self) -> Option<&'static str> {
        match self {
            Self::Experian => Some("Experian\nP.O. Box 4500\nAllen, TX 75013"),
            Self::Equifax => {
                Some("Equifax Information Services LLC\nP.O. Box 740256\nAtlanta, GA 30374")
            }
            Self::Transunion => Some(
                "TransUnion LLC Consumer Dispute Center\nP.O. Box 2000\nChester, PA 19016",
            ),
            Self::All => None,
        }
    }

    /// Whether this dispute target covers the given national bureau.
    ///
    /// `ALL` covers every bureau; `ALL` as the queried target is covered by
    /// any code. Used by the creation-throttle counter views.
    pub fn covers(&self, other: Bureau) -> bool {
        *self == other || *self == Self::All || other == Self::All
    }
}

impl std::fmt::Display for Bureau {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the address block for a raw bureau code.
///
/// Known codes (case-insensitive) resolve to the canonical mailing address;
/// anything else — including `ALL` — echoes the raw code through unchanged.
pub fn mailing_address_block(code: &str) -> String {
    match Bureau::parse(code).and_then(|b| b.mailing_address()) {
        Some(address) => address.to_string(),
        None => code.to_string(),
    }
}
