//! Diagnostic sinks.
//!
//! The pass reports malformed markers as plain text lines. Where they go is
//! up to the embedder: stderr for the CLI, a buffer for tests, nowhere at
//! all for silent runs. Messages never influence the rewritten tree.

/// Prefix on every diagnostic line.
pub const DIAGNOSTIC_TAG: &str = "[spoof]";

pub trait DiagnosticSink {
    fn emit(&mut self, message: &str);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn emit(&mut self, message: &str) {
        (**self).emit(message)
    }
}

/// Writes each diagnostic to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&mut self, message: &str) {
        eprintln!("{} {}", DIAGNOSTIC_TAG, message);
    }
}

/// Collects diagnostics for testing or programmatic capture.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBuffer {
    pub lines: Vec<String>,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl DiagnosticSink for DiagnosticBuffer {
    fn emit(&mut self, message: &str) {
        self.lines.push(format!("{} {}", DIAGNOSTIC_TAG, message));
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_tags_each_line() {
        let mut buffer = DiagnosticBuffer::new();
        buffer.emit("$spoof requires a parameter!");
        assert_eq!(buffer.lines, vec!["[spoof] $spoof requires a parameter!"]);
        assert!(buffer.contains("requires a parameter"));
    }

    #[test]
    fn sinks_work_through_mutable_references() {
        fn report(mut sink: impl DiagnosticSink) {
            sink.emit("one");
            sink.emit("two");
        }
        let mut buffer = DiagnosticBuffer::new();
        report(&mut buffer);
        assert_eq!(buffer.lines.len(), 2);
        report(NullSink);
    }
}
