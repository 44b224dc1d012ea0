mod ceilometer;
mod registry;
mod telemetry;

pub mod prelude {
    pub use crate::ceilometer::{
        CeilometerConfig, CeilometerContextError, CeilometerSampleGenerator, TenantSamples,
    };
    pub use crate::registry::default_registry;
    pub use crate::telemetry::{
        auth_options, ExecutorBoundClient, InstrumentedClientFactory, TelemetryClient,
        TelemetryClientFactory,
    };

    /// Re-export of the `cloudbench_runner` prelude.
    ///
    /// This is for convenience so that you can depend on a single crate for the runner.
    pub use cloudbench_runner::prelude::*;

    /// Re-export of the instrumented client for convenience.
    pub use ceilometer_client_instrumented::prelude::*;
}
