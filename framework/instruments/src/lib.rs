mod report;

use std::sync::Arc;
use std::time::{Duration, Instant};

pub use report::{InMemoryReporter, ReportCollector, ReportConfig, Reporter};

/// Timing of a single call made against the system under test.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub operation_id: String,
    started: Instant,
    elapsed: Option<Duration>,
    pub is_error: bool,
}

impl OperationRecord {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            started: Instant::now(),
            elapsed: None,
            is_error: false,
        }
    }

    /// How long the operation took. `None` until the record has been reported.
    pub fn duration(&self) -> Option<Duration> {
        self.elapsed
    }

    fn finish(&mut self, is_error: bool) {
        self.elapsed = Some(self.started.elapsed());
        self.is_error = is_error;
    }
}

/// Stop the clock on `record` and hand it to the `reporter`.
pub fn report_operation<T, E>(
    reporter: Arc<Reporter>,
    mut record: OperationRecord,
    response: &Result<T, E>,
) {
    record.finish(response.is_err());
    log::trace!(
        "Operation {} finished in {:?}, failed? {}",
        record.operation_id,
        record.elapsed,
        record.is_error
    );
    reporter.add_operation(&record);
}
