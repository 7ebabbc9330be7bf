use addrgeo_core::gateways::progress::ProgressObserver;
use indicatif::{ProgressBar, ProgressStyle};

/// Renders batch progress on the terminal.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(len: u64) -> Self {
        let bar = ProgressBar::new(len).with_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:30} {pos}/{len} {wide_msg}")
                .expect("hardcoded"),
        );
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl ProgressObserver for ProgressReporter {
    fn on_progress(&self, current: usize, total: usize, message: &str) {
        log::debug!("[{current}/{total}] {message}");
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(message.to_string());
    }
}
