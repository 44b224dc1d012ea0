use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use cloudbench_instruments::Reporter;

use crate::context::{RunnerContext, TenantContext, TenantId};
use crate::executor::Executor;
use crate::manager::ContextManager;
use crate::plugin::ContextRegistry;
use crate::shutdown::start_shutdown_listener;
use crate::task::TaskConfig;
use crate::types::{BenchResult, HookResult};

/// Runs with every context set up, before any of them are cleaned up.
pub type ScenarioHook = fn(&RunnerContext) -> HookResult;

/// Run a task: set up the requested contexts, run the scenario, clean up.
///
/// Returns the tenants as they were after setup, including everything the contexts attached to
/// them. If setup fails, the contexts are still cleaned up before the error is returned. A
/// failing scenario is logged and does not fail the run.
pub fn run(
    registry: &ContextRegistry,
    task: &TaskConfig,
    reporter: Reporter,
    scenario: Option<ScenarioHook>,
) -> BenchResult<BTreeMap<TenantId, TenantContext>> {
    log::info!(
        "Running task with {} users across {} tenants",
        task.users.len(),
        task.tenants.len()
    );

    // Validate everything before anything touches the cloud.
    let mut manager = ContextManager::new(registry, &task.context)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime);
    let executor = Arc::new(Executor::new(runtime, shutdown_handle.clone()));
    let reporter = Arc::new(reporter);
    let mut runner_context =
        RunnerContext::new(executor, reporter.clone(), shutdown_handle, task);

    if let Err(e) = manager.setup(&mut runner_context) {
        manager.cleanup(&runner_context);
        reporter.finalize();
        return Err(e);
    }

    let tenants = runner_context.tenants().clone();

    if let Some(scenario) = scenario {
        if let Err(e) = scenario(&runner_context) {
            log::error!("Scenario failed: {:?}", e);
        }
    }

    manager.cleanup(&runner_context);
    reporter.finalize();

    Ok(tenants)
}
