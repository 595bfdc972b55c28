//! # dflow-workflow — The Dispute Workflow Engine
//!
//! The sequencing and rendering core of the disputeflow stack. Everything
//! here is a pure, synchronous function over plain data: no I/O, no clocks
//! read internally (callers pass `now`/`today`), no retained state between
//! calls. Request handlers in `dflow-api` are thin wrappers around this
//! crate.
//!
//! ## Modules
//!
//! - [`stage`] — the six ordered letter-template stages, the sequencer,
//!   and the static per-stage descriptor table.
//! - [`letter`] — deterministic plain-text rendering of the five
//!   renderable letters.
//! - [`guards`] — creation-throttle and escalation eligibility predicates.
//! - [`progress`] — derivation of the display-progress ordinal from a
//!   persisted dispute's timestamps and status.
//! - [`deadline`] — response-deadline computation and the deadline-notice
//!   view behind the notification endpoint.

pub mod deadline;
pub mod guards;
pub mod letter;
pub mod progress;
pub mod stage;

pub use deadline::{deadline_notices, response_deadline, DeadlineNotice, DeadlineUrgency};
pub use guards::{can_create_dispute, escalation_allowed, is_first_dispute, GuardError};
pub use letter::{render_letter, LetterData, RenderError};
pub use progress::{progress_label, progress_stage};
pub use stage::{StageDescriptor, TemplateStage};
