mod cli;
mod context;
mod executor;
mod init;
mod manager;
mod plugin;
mod run;
mod shutdown;
mod task;
mod tenants;
mod types;

pub mod prelude {
    pub use crate::cli::{BenchCli, ReporterOpt};
    pub use crate::context::{RunnerContext, TenantContext, TenantId};
    pub use crate::executor::Executor;
    pub use crate::init::init;
    pub use crate::manager::{ContextManager, ContextState};
    pub use crate::plugin::{ContextOutput, ContextPlugin, ContextRegistry};
    pub use crate::run::{run, ScenarioHook};
    pub use crate::task::{Credential, EndpointType, TaskConfig, TenantSpec, User};
    pub use crate::tenants::iterate_per_tenants;
    pub use crate::types::{BenchResult, HookResult};

    pub use cloudbench_core::prelude::*;
    pub use cloudbench_instruments::{report_operation, OperationRecord, Reporter};
}
