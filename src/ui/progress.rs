use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Receives progress updates from the scan.
///
/// Purely informational: implementations must not influence what gets
/// merged or in which order.
pub trait ProgressSink {
    fn set_total(&self, total: usize);
    fn item_started(&self, label: &str);
    fn item_finished(&self);
}

/// Ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn set_total(&self, _total: usize) {}
    fn item_started(&self, _label: &str) {}
    fn item_finished(&self) {}
}

const MAX_MESSAGE_CHARS: usize = 120;

pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Spinner showing `processed/total` and the current item. The total is
    /// supplied later through [`ProgressSink::set_total`].
    ///
    /// The spinner redraws itself on a background tick until
    /// [`MergeProgress::finish`] is called.
    pub fn create_merge_progress(&self) -> MergeProgress {
        if !self.enabled {
            return MergeProgress {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(1);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["|", "/", "-", "\\", "|"]),
        );
        bar.set_message("Preparing...");
        bar.enable_steady_tick(Duration::from_millis(100));

        MergeProgress { bar }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

pub struct MergeProgress {
    bar: ProgressBar,
}

impl MergeProgress {
    /// Stops the redraw tick and erases the spinner line.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Items reported finished so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressSink for MergeProgress {
    fn set_total(&self, total: usize) {
        self.bar.set_length(total.max(1) as u64);
    }

    fn item_started(&self, label: &str) {
        self.bar
            .set_message(format!("Processing: {}", truncate_label(label)));
    }

    fn item_finished(&self) {
        self.bar.inc(1);
    }
}

impl Drop for MergeProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() <= MAX_MESSAGE_CHARS {
        return label.to_string();
    }

    let tail: String = label
        .chars()
        .rev()
        .take(MAX_MESSAGE_CHARS - 3)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("...{}", tail)
}
