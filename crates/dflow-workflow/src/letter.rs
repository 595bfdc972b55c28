//! # Letter Rendering
//!
//! Deterministic plain-text rendering of the five renderable dispute
//! letters. Each letter shares a frame — sender block, long-format date,
//! bureau mailing address, subject, salutation, closing signature — and
//! differs in the framing language and the statute invoked:
//!
//! | Stage                   | Citation                                   |
//! |-------------------------|--------------------------------------------|
//! | `INVESTIGATION_REQUEST` | FCRA § 1681i(a)                            |
//! | `PERSONAL_INFO_REMOVER` | FCRA § 1681e(b)                            |
//! | `VALIDATION_OF_DEBT`    | FDCPA § 1692g + FCRA § 1681s-2             |
//! | `FACTUAL_LETTER`        | FCRA § 1681i(a)                            |
//! | `TERMINATION_LETTER`    | FCRA §§ 1681e(b), 1681i(a), 1681n, 1681o   |
//!
//! The sixth stage, `AI_ESCALATION`, is never rendered here — it is
//! produced out-of-band by the escalation service for authenticated
//! dashboard users, and this module answers it with a typed error so the
//! caller branches before any text is produced.
//!
//! Rendering never validates field presence. Missing optional fields
//! degrade to the literal `"Unknown"` or to an omitted conditional line;
//! required-field validation belongs to the caller. The render date is a
//! parameter, so output is a pure function of its inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dflow_core::bureau::mailing_address_block;

use crate::stage::TemplateStage;

/// Rendering errors. Expected invalid input never panics.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// The escalation stage is generated by the escalation service, not
    /// this renderer.
    #[error("AI_ESCALATION letters are generated by the escalation service")]
    EscalationStage,
}

/// Consumer-supplied parameters for rendering one letter.
///
/// `full_name`, `creditor_name`, `bureau`, and `dispute_reason` must be
/// non-empty for the output to be meaningful; the renderer does not
/// enforce this. The bureau is a free-form code on purpose: unrecognized
/// codes are echoed as the address block so letters can target agencies
/// outside the fixed table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LetterData {
    /// Consumer's full legal name.
    pub full_name: String,
    /// Street address line.
    pub street_address: String,
    /// City.
    pub city: String,
    /// State abbreviation.
    pub state: String,
    /// ZIP code.
    pub zip: String,
    /// Last four digits of the SSN, if the consumer chose to include them.
    pub ssn_last4: Option<String>,
    /// Four-digit birth year, if included.
    pub birth_year: Option<String>,
    /// Creditor or furnisher being disputed.
    pub creditor_name: String,
    /// Account number with the creditor, if known.
    pub account_number: Option<String>,
    /// Target bureau code (free-form; matched case-insensitively against
    /// the known table).
    pub bureau: String,
    /// The selected dispute reason.
    pub dispute_reason: String,
    /// Free-text elaboration, rendered as a conditional line.
    pub custom_reason: Option<String>,
    /// Reported balance as a decimal string, rendered as a conditional line.
    pub balance: Option<String>,
    /// Date the account was opened, rendered as a conditional line.
    pub date_opened: Option<String>,
}

/// Render the letter for `stage` from `data`, dated `today`.
///
/// Deterministic: identical inputs produce byte-identical output. The five
/// renderable stages produce a complete letter; `AI_ESCALATION` returns
/// [`RenderError::EscalationStage`].
pub fn render_letter(
    stage: TemplateStage,
    data: &LetterData,
    today: NaiveDate,
) -> Result<String, RenderError> {
    let body = match stage {
        TemplateStage::InvestigationRequest => investigation_request_body(data),
        TemplateStage::PersonalInfoRemover => personal_info_body(data),
        TemplateStage::ValidationOfDebt => debt_validation_body(data),
        TemplateStage::FactualLetter => factual_dispute_body(data),
        TemplateStage::TerminationLetter => final_demand_body(data),
        TemplateStage::AiEscalation => return Err(RenderError::EscalationStage),
    };

    Ok(format!(
        "{header}\n{body}\n{signature}",
        header = header(data, today),
        signature = signature(data),
    ))
}

// ── Shared frame ───────────────────────────────────────────────────────

/// Long-format date line, e.g. "January 5, 2026".
fn long_date(today: NaiveDate) -> String {
    today.format("%B %-d, %Y").to_string()
}

fn header(data: &LetterData, today: NaiveDate) -> String {
    format!(
        "{name}\n{street}\n{city}, {state} {zip}\n\n{date}\n\n{bureau}\n",
        name = data.full_name,
        street = data.street_address,
        city = data.city,
        state = data.state,
        zip = data.zip,
        date = long_date(today),
        bureau = mailing_address_block(&data.bureau),
    )
}

fn signature(data: &LetterData) -> String {
    format!(
        "Sincerely,\n\n{name}\nSSN (last four): {ssn}\nYear of birth: {birth}\n",
        name = data.full_name,
        ssn = unknown_or(&data.ssn_last4),
        birth = unknown_or(&data.birth_year),
    )
}

/// The disputed-item block common to every letter body.
fn item_block(data: &LetterData) -> String {
    let mut block = format!(
        "Creditor: {creditor}\nAccount number: {account}\nReason for dispute: {reason}\n",
        creditor = data.creditor_name,
        account = unknown_or(&data.account_number),
        reason = data.dispute_reason,
    );
    if let Some(custom) = present(&data.custom_reason) {
        block.push_str(&format!("Additional details: {custom}\n"));
    }
    if let Some(balance) = present(&data.balance) {
        block.push_str(&format!("Reported balance: {balance}\n"));
    }
    if let Some(opened) = present(&data.date_opened) {
        block.push_str(&format!("Date opened: {opened}\n"));
    }
    block
}

/// The literal placeholder for an absent optional field.
fn unknown_or(value: &Option<String>) -> &str {
    present(value).unwrap_or("Unknown")
}

/// Treat empty strings the same as absent fields.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

// ── Stage bodies ───────────────────────────────────────────────────────

fn investigation_request_body(data: &LetterData) -> String {
    format!(
        "Re: Request for investigation of inaccurate information\n\n\
         To Whom It May Concern:\n\n\
         I am writing to dispute the following information in my credit file. The item \
         identified below is inaccurate, and I request that it be investigated and corrected \
         or deleted under Section 611 of the Fair Credit Reporting Act, 15 U.S.C. \
         \u{a7} 1681i(a).\n\n\
         {items}\n\
         Under 15 U.S.C. \u{a7} 1681i(a)(1)(A) you are required to conduct a reasonable \
         reinvestigation of this dispute, free of charge, within thirty days of receipt of \
         this letter. If the item cannot be verified, it must be promptly deleted from my \
         file as required by \u{a7} 1681i(a)(5)(A).\n\n\
         Please send written confirmation of the results of your investigation to the \
         address above, together with an updated copy of my credit report if any change \
         is made.\n",
        items = item_block(data),
    )
}

fn personal_info_body(data: &LetterData) -> String {
    format!(
        "Re: Request to remove outdated personal information\n\n\
         To Whom It May Concern:\n\n\
         I am requesting the removal of outdated and inaccurate personal information from \
         my credit file. Under Section 607(b) of the Fair Credit Reporting Act, 15 U.S.C. \
         \u{a7} 1681e(b), you must follow reasonable procedures to assure maximum possible \
         accuracy of the information you maintain and report about me.\n\n\
         Please delete all former addresses, name variations, telephone numbers, and \
         employers from my file. The only personal information that should remain is my \
         legal name and the current mailing address shown above. Stale identifiers are a \
         source of mixed-file errors and re-aging, including on the item below:\n\n\
         {items}\n\
         Confirm in writing that the outdated identifiers have been removed and send me an \
         updated copy of my credit report reflecting the change.\n",
        items = item_block(data),
    )
}

fn debt_validation_body(data: &LetterData) -> String {
    format!(
        "Re: Demand for validation of alleged debt\n\n\
         To Whom It May Concern:\n\n\
         This letter is a timely demand for validation of the alleged debt identified \
         below, made under Section 809(b) of the Fair Debt Collection Practices Act, \
         15 U.S.C. \u{a7} 1692g(b). This is not a refusal to pay; it is notice that the \
         claim is disputed and that validation is demanded.\n\n\
         {items}\n\
         Provide each of the following: (1) the amount of the alleged debt and a complete \
         accounting of how it was calculated; (2) the name and address of the original \
         creditor; (3) a copy of any signed agreement obligating me on this account; \
         (4) evidence of your authority to collect this debt in my state.\n\n\
         Until validation is provided, collection activity must cease, and the item must \
         be reported as disputed to each consumer reporting agency as required by \
         15 U.S.C. \u{a7} 1681s-2(a)(3) of the Fair Credit Reporting Act.\n",
        items = item_block(data),
    )
}

fn factual_dispute_body(data: &LetterData) -> String {
    format!(
        "Re: Factual dispute of reported account information\n\n\
         To Whom It May Concern:\n\n\
         I have reviewed my credit file and dispute the accuracy of the item identified \
         below on specific factual grounds. I request a reinvestigation under Section 611 \
         of the Fair Credit Reporting Act, 15 U.S.C. \u{a7} 1681i(a).\n\n\
         {items}\n\
         I am enclosing documentation supporting my position. You are required by \
         \u{a7} 1681i(a)(4) to review and consider all relevant information I have \
         submitted with this dispute.\n\n\
         If you nevertheless verify the item, provide a description of the procedure used \
         to determine its accuracy, including the business name, address, and telephone \
         number of each furnisher contacted, as required by \u{a7} 1681i(a)(6)(B)(iii) \
         and \u{a7} 1681i(a)(7).\n",
        items = item_block(data),
    )
}

fn final_demand_body(data: &LetterData) -> String {
    format!(
        "Re: Final notice before escalation\n\n\
         To Whom It May Concern:\n\n\
         Despite my previous disputes, you continue to report the item identified below \
         without adequate verification. This letter is my final attempt to resolve the \
         matter directly.\n\n\
         {items}\n\
         Your handling of my disputes has failed to meet the obligations the Fair Credit \
         Reporting Act places on you:\n\n\
         - 15 U.S.C. \u{a7} 1681e(b): failure to follow reasonable procedures to assure \
         maximum possible accuracy;\n\
         - 15 U.S.C. \u{a7} 1681i(a)(1)(A): failure to conduct a reasonable \
         reinvestigation within thirty days;\n\
         - 15 U.S.C. \u{a7} 1681i(a)(5)(A): failure to promptly delete information that \
         could not be verified.\n\n\
         Sections 616 and 617 of the Act, 15 U.S.C. \u{a7}\u{a7} 1681n and 1681o, provide \
         civil liability for willful and negligent noncompliance. Delete the disputed item \
         within fifteen days of receipt of this letter, or I will pursue the remedies \
         available to me, including complaints to the Consumer Financial Protection \
         Bureau and my state attorney general.\n",
        items = item_block(data),
    )
}
