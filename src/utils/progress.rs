//! Progress indicators for long-running operations

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// One spinner per parallel task, rendered together
pub struct TaskProgress {
    #[allow(dead_code)]
    multi: MultiProgress,
    bars: Vec<ProgressBar>,
}

impl TaskProgress {
    pub fn new(labels: &[String]) -> Self {
        let multi = MultiProgress::new();
        let bars = labels
            .iter()
            .map(|label| multi.add(create_spinner(label)))
            .collect();

        Self { multi, bars }
    }

    /// A progress set that draws nothing (tests, non-interactive runs)
    pub fn hidden(count: usize) -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: (0..count).map(|_| ProgressBar::hidden()).collect(),
        }
    }

    pub fn finish_task(&self, index: usize, message: String) {
        if let Some(pb) = self.bars.get(index) {
            pb.finish_with_message(message);
        }
    }
}

/// Helper to run a function with a spinner and show result
pub fn with_spinner_result<F, T, E>(message: &str, success_msg: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Display,
{
    let pb = create_spinner(message);
    match f() {
        Ok(result) => {
            pb.finish_with_message(format!("✓ {}", success_msg));
            Ok(result)
        }
        Err(e) => {
            pb.finish_with_message(format!("✗ Failed: {}", e));
            Err(e)
        }
    }
}
