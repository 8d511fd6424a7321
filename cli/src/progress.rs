//! Progress reporting during deliberation

use colored::Colorize;
use council_application::ports::progress::DeliberationProgress;
use council_domain::{MemberId, Phase};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports per-phase progress with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    fn phase_display_name(phase: &Phase) -> String {
        match phase {
            Phase::Init => "Setup".to_string(),
            Phase::Collecting => "Collecting opinions".to_string(),
            Phase::Discussing(r) => format!("Discussion round {r}"),
            Phase::Voting => "Voting".to_string(),
            Phase::Tallying => "Tallying".to_string(),
            Phase::Done => "Done".to_string(),
            Phase::Failed => "Failed".to_string(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliberationProgress for ProgressReporter {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(Self::phase_display_name(phase));
        pb.set_message("Starting...");

        *self.phase_bar.lock().unwrap() = Some(pb);
    }

    fn on_member_complete(&self, _phase: &Phase, member: &MemberId, success: bool) {
        if let Some(pb) = self.phase_bar.lock().unwrap().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), member)
            } else {
                format!("{} {}", "x".red(), member)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: &Phase) {
        if let Some(pb) = self.phase_bar.lock().unwrap().take() {
            pb.finish_with_message(format!(
                "{} {}",
                Self::phase_display_name(phase),
                "complete".green()
            ));
        }
    }
}
