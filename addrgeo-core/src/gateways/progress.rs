/// Receives human-readable status messages while a batch is processed.
pub trait ProgressObserver {
    fn on_progress(&self, current: usize, total: usize, message: &str);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize, &str),
{
    fn on_progress(&self, current: usize, total: usize, message: &str) {
        self(current, total, message)
    }
}

/// Discards all progress messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_progress(&self, _: usize, _: usize, _: &str) {}
}
