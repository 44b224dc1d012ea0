use std::collections::BTreeMap;

use anyhow::Context;

use crate::context::RunnerContext;
use crate::plugin::{ContextPlugin, ContextRegistry};
use crate::types::BenchResult;

/// Lifecycle of a single context within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Uninitialized,
    /// Setup returned successfully.
    SetUp,
    /// Cleanup has been called, whether or not setup succeeded.
    TornDown,
}

struct ManagedContext {
    plugin: ContextPlugin,
    config: serde_json::Value,
    state: ContextState,
}

/// Sets up the contexts requested by a task in priority order and cleans them up in reverse.
pub struct ContextManager {
    contexts: Vec<ManagedContext>,
}

impl ContextManager {
    /// Resolve every requested context against the registry and validate its configuration.
    ///
    /// Nothing is set up here, so an invalid configuration for any context fails the run before
    /// any side effects happen.
    pub fn new(
        registry: &ContextRegistry,
        requested: &BTreeMap<String, serde_json::Value>,
    ) -> BenchResult<Self> {
        let mut contexts = requested
            .iter()
            .map(|(name, config)| {
                let plugin = *registry.get(name).with_context(|| {
                    format!(
                        "Unknown context [{}], known contexts are: {:?}",
                        name,
                        registry.names().collect::<Vec<_>>()
                    )
                })?;

                (plugin.validate)(config)
                    .with_context(|| format!("Invalid configuration for context [{}]", name))?;

                Ok(ManagedContext {
                    plugin,
                    config: config.clone(),
                    state: ContextState::Uninitialized,
                })
            })
            .collect::<BenchResult<Vec<_>>>()?;

        contexts.sort_by_key(|ctx| (ctx.plugin.order, ctx.plugin.name));

        Ok(Self { contexts })
    }

    /// Set up each context in order, merging its output into the runner context.
    ///
    /// Stops at the first failure. The caller is expected to call [ContextManager::cleanup]
    /// afterwards either way.
    pub fn setup(&mut self, runner_context: &mut RunnerContext) -> BenchResult<()> {
        for ctx in self.contexts.iter_mut() {
            log::debug!("Setting up context [{}]", ctx.plugin.name);

            let output = (ctx.plugin.setup)(&ctx.config, runner_context)
                .with_context(|| format!("Setup of context [{}] failed", ctx.plugin.name))?;
            runner_context.merge(output).with_context(|| {
                format!("Could not merge output of context [{}]", ctx.plugin.name)
            })?;

            ctx.state = ContextState::SetUp;
        }

        Ok(())
    }

    /// Clean up every context in reverse order.
    ///
    /// Cleanup is best effort: failures are logged and the remaining contexts are still cleaned
    /// up.
    pub fn cleanup(&mut self, runner_context: &RunnerContext) {
        for ctx in self.contexts.iter_mut().rev() {
            log::debug!("Cleaning up context [{}]", ctx.plugin.name);

            if let Err(e) = (ctx.plugin.cleanup)(&ctx.config, runner_context) {
                log::error!("Cleanup of context [{}] failed: {:?}", ctx.plugin.name, e);
            }

            ctx.state = ContextState::TornDown;
        }
    }

    /// Context names and their states, in setup order.
    pub fn states(&self) -> Vec<(&'static str, ContextState)> {
        self.contexts
            .iter()
            .map(|ctx| (ctx.plugin.name, ctx.state))
            .collect()
    }
}
