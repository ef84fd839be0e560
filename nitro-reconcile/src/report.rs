/// Sink for operator-facing progress lines.
///
/// `pending` opens a line that the next `done` or `warning` closes.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn pending(&self, message: &str);
    fn done(&self);
    fn warning(&self, message: &str);
    fn success(&self, message: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn info(&self, _message: &str) {}
    fn pending(&self, _message: &str) {}
    fn done(&self) {}
    fn warning(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
}
