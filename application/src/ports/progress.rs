//! Progress notification port
//!
//! Lets the front end observe phase progress without the coordinator
//! knowing anything about presentation.

use council_domain::{MemberId, Phase};

/// Callback for progress updates during a deliberation
pub trait DeliberationProgress: Send + Sync {
    /// Called when a phase starts, with the number of member tasks
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize);

    /// Called when one member's task in a phase completes
    fn on_member_complete(&self, phase: &Phase, member: &MemberId, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: &Phase);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DeliberationProgress for NoProgress {
    fn on_phase_start(&self, _phase: &Phase, _total_tasks: usize) {}
    fn on_member_complete(&self, _phase: &Phase, _member: &MemberId, _success: bool) {}
    fn on_phase_complete(&self, _phase: &Phase) {}
}
