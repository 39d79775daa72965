//! Per-session diagnostic output.
//!
//! A session writes its protocol conversation to the sink it was given when
//! verbosity is on. Nothing here is process-wide: two sessions can log to
//! two different places.

/// Receives one formatted diagnostic line at a time.
pub trait DiagnosticSink: Send {
    fn emit(&self, line: &str);
}

/// Discards everything. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn emit(&self, _line: &str) {}
}

/// Forwards lines to the `log` facade at debug level.
#[derive(Debug, Clone)]
pub struct LogSink {
    target: String,
}

impl LogSink {
    pub fn new(target: impl Into<String>) -> Self {
        LogSink {
            target: target.into(),
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        LogSink::new(module_path!())
    }
}

impl DiagnosticSink for LogSink {
    fn emit(&self, line: &str) {
        log::debug!(target: &self.target, "{}", line);
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str) + Send,
{
    fn emit(&self, line: &str) {
        self(line)
    }
}
