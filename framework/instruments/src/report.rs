mod in_memory_reporter;

use crate::OperationRecord;
use parking_lot::Mutex;

pub use in_memory_reporter::InMemoryReporter;

pub trait ReportCollector {
    fn add_operation(&mut self, operation_record: &OperationRecord);

    fn finalize(&self);
}

/// Fans operation records out to every configured collector.
///
/// With no collectors configured, reporting is a no-op.
pub struct Reporter {
    inner: Mutex<Vec<Box<dyn ReportCollector + Send>>>,
}

impl Reporter {
    pub fn new(collectors: Vec<Box<dyn ReportCollector + Send>>) -> Self {
        Self {
            inner: Mutex::new(collectors),
        }
    }

    pub fn noop() -> Self {
        Self::new(Vec::new())
    }

    pub fn add_operation(&self, operation_record: &OperationRecord) {
        for collector in self.inner.lock().iter_mut() {
            collector.add_operation(operation_record);
        }
    }

    pub fn finalize(&self) {
        for collector in self.inner.lock().iter() {
            collector.finalize();
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("collectors", &self.inner.lock().len())
            .finish()
    }
}

#[derive(Default)]
pub struct ReportConfig {
    in_memory: bool,
}

impl ReportConfig {
    /// Keep every operation in memory and print a summary table when the run finishes.
    pub fn enable_in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    pub fn init(self) -> Reporter {
        let mut collectors: Vec<Box<dyn ReportCollector + Send>> = Vec::new();
        if self.in_memory {
            collectors.push(Box::new(InMemoryReporter::new()));
        }

        Reporter::new(collectors)
    }
}
