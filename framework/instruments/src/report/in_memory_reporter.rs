mod operations_table;

use crate::report::in_memory_reporter::operations_table::OperationRow;
use crate::report::ReportCollector;
use crate::OperationRecord;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tabled::settings::Style;
use tabled::Table;

/// Keeps all of the operations in memory and prints a summary of them at the end of the run.
pub struct InMemoryReporter {
    operation_records: Arc<Mutex<Vec<OperationRecord>>>,
}

impl Default for InMemoryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReporter {
    pub fn new() -> Self {
        Self {
            operation_records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of the collected records.
    pub fn records(&self) -> Arc<Mutex<Vec<OperationRecord>>> {
        self.operation_records.clone()
    }

    fn summary_rows(&self) -> Vec<OperationRow> {
        let records = self.operation_records.lock();
        records
            .iter()
            .fold(BTreeMap::<&str, Vec<&OperationRecord>>::new(), |mut acc, record| {
                acc.entry(record.operation_id.as_str())
                    .or_default()
                    .push(record);
                acc
            })
            .into_iter()
            .map(|(operation_id, operations)| {
                let total_operations = operations.len();
                let micros = |record: &&OperationRecord| {
                    record.duration().map(|d| d.as_micros()).unwrap_or_default()
                };
                let total_duration_micro = operations.iter().map(micros).sum::<u128>();
                let successful = operations
                    .iter()
                    .filter(|op| !op.is_error)
                    .map(micros)
                    .collect::<Vec<_>>();

                OperationRow {
                    operation_id: operation_id.to_string(),
                    total_operations,
                    failed_operations: total_operations - successful.len(),
                    total_duration_ms: total_duration_micro as f64 / 1000.0,
                    avg_time_ms: (total_duration_micro as f64 / total_operations as f64) / 1000.0,
                    min_time_ms: successful.iter().min().copied().unwrap_or_default() as f64
                        / 1000.0,
                    max_time_ms: successful.iter().max().copied().unwrap_or_default() as f64
                        / 1000.0,
                }
            })
            .collect()
    }
}

impl ReportCollector for InMemoryReporter {
    fn add_operation(&mut self, operation_record: &OperationRecord) {
        self.operation_records.lock().push(operation_record.clone());
    }

    fn finalize(&self) {
        let rows = self.summary_rows();
        if rows.is_empty() {
            return;
        }

        let mut table = Table::new(rows);
        table.with(Style::modern());

        println!("\nSummary of operations");
        println!("{table}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report_operation;
    use crate::Reporter;

    #[test]
    fn summary_groups_by_operation_and_counts_failures() {
        let collector = InMemoryReporter::new();
        let records = collector.records();
        let collectors: Vec<Box<dyn ReportCollector + Send>> = vec![Box::new(collector)];
        let reporter = Arc::new(Reporter::new(collectors));

        for i in 0..3 {
            let response: Result<(), ()> = if i == 0 { Err(()) } else { Ok(()) };
            report_operation(reporter.clone(), OperationRecord::new("create_sample"), &response);
        }
        report_operation(reporter, OperationRecord::new("connect"), &Ok::<(), ()>(()));

        let view = InMemoryReporter {
            operation_records: records,
        };
        let rows = view.summary_rows();

        assert_eq!(2, rows.len());
        assert_eq!("connect", rows[0].operation_id);
        assert_eq!(1, rows[0].total_operations);
        assert_eq!("create_sample", rows[1].operation_id);
        assert_eq!(3, rows[1].total_operations);
        assert_eq!(1, rows[1].failed_operations);
    }
}
