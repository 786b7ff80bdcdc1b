//! Pipeline stage controller.
//!
//! The decision logic is a pure function over (current stage, action kind):
//! `rules::next_stage` and `rules::auto_tags` decide; `PipelineController`
//! records the activity and applies the decisions against storage.
//!
//! Stage write and companion tag write are separate auto-committed
//! statements. A tag failure after a successful stage write leaves the lead
//! inconsistent-but-not-corrupt; the error is surfaced, not compensated.

pub mod controller;
pub mod rules;

pub use controller::{PipelineController, TrackOutcome};
pub use rules::{auto_tags, next_stage, AutoTag};
