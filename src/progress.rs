use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::events::{DownloadProgress, SetupObserver};

const BAR_TEMPLATE: &str = "{prefix} [{bar:50.cyan/blue}] {pos:>3}%";
const SPINNER_TEMPLATE: &str = "{prefix} {spinner:.cyan} {msg}";

/// Terminal rendering of pipeline events.
pub struct ProgressReporter {
    bar: ProgressBar,
    unknown_size: bool,
    errors: Vec<String>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        if let Ok(bar_style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(bar_style.progress_chars("█▓░"));
        }
        bar.set_prefix("Working");
        Self {
            bar,
            unknown_size: false,
            errors: Vec::new(),
        }
    }

    pub fn finish(&self) {
        if self.errors.is_empty() {
            self.bar.finish();
        } else {
            self.bar.abandon();
        }
    }
}

impl SetupObserver for ProgressReporter {
    fn on_progress(&mut self, progress: DownloadProgress) {
        if progress.is_known() {
            if self.unknown_size {
                if let Ok(bar_style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                    self.bar.set_style(bar_style.progress_chars("█▓░"));
                }
                self.unknown_size = false;
            }
            self.bar.set_position(progress.percent as u64);
        } else {
            if !self.unknown_size {
                if let Ok(spinner) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                    self.bar.set_style(spinner);
                }
                self.bar.set_message("size unknown");
                self.unknown_size = true;
            }
            self.bar.tick();
        }
    }

    fn on_error(&mut self, message: &str) {
        self.bar.println(style(message).red().to_string());
        self.errors.push(message.to_string());
    }
}
