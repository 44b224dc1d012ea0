use cloudbench_runner::prelude::{BenchResult, ContextRegistry};

use crate::ceilometer::CeilometerSampleGenerator;

/// Every context plugin this crate provides.
pub fn default_registry() -> BenchResult<ContextRegistry> {
    ContextRegistry::new().with(CeilometerSampleGenerator::plugin())
}
