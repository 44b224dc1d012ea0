use std::collections::BTreeMap;

use anyhow::Context;
use serde::Serialize;

use crate::context::{RunnerContext, TenantId};
use crate::types::{BenchResult, HookResult};

pub type ValidateFn = fn(&serde_json::Value) -> BenchResult<()>;
pub type SetupFn = fn(&serde_json::Value, &RunnerContext) -> BenchResult<ContextOutput>;
pub type CleanupFn = fn(&serde_json::Value, &RunnerContext) -> HookResult;

/// Values a context plugin wants attached to tenants, keyed by tenant and then by value name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextOutput {
    tenants: BTreeMap<TenantId, serde_json::Map<String, serde_json::Value>>,
}

impl ContextOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `value` to `tenant_id` under `key`, replacing anything already set for that key.
    pub fn insert<T: Serialize>(
        &mut self,
        tenant_id: &str,
        key: &str,
        value: &T,
    ) -> BenchResult<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize [{key}] for tenant [{tenant_id}]"))?;
        self.tenants
            .entry(tenant_id.to_string())
            .or_default()
            .insert(key.to_string(), value);

        Ok(())
    }

    /// Attach every field of `values` to `tenant_id`. `values` must serialize to a map.
    pub fn insert_all<T: Serialize>(&mut self, tenant_id: &str, values: &T) -> BenchResult<()> {
        match serde_json::to_value(values)? {
            serde_json::Value::Object(fields) => {
                self.tenants
                    .entry(tenant_id.to_string())
                    .or_default()
                    .extend(fields);
                Ok(())
            }
            other => anyhow::bail!(
                "Context output for tenant [{tenant_id}] must be a map, got: {other}"
            ),
        }
    }

    pub fn tenants(&self) -> &BTreeMap<TenantId, serde_json::Map<String, serde_json::Value>> {
        &self.tenants
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    pub(crate) fn into_tenants(
        self,
    ) -> BTreeMap<TenantId, serde_json::Map<String, serde_json::Value>> {
        self.tenants
    }
}

/// A context plugin: a fixed name, a priority and the hooks the runner calls.
///
/// Contexts are set up in ascending `order` and cleaned up in the reverse order.
#[derive(Clone, Copy)]
pub struct ContextPlugin {
    pub name: &'static str,
    pub order: u32,
    /// Checks the raw configuration before any context is set up.
    pub validate: ValidateFn,
    pub setup: SetupFn,
    /// Best effort. Called even if setup failed.
    pub cleanup: CleanupFn,
}

impl std::fmt::Debug for ContextPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextPlugin")
            .field("name", &self.name)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// All context plugins known to the process, by name.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    plugins: BTreeMap<&'static str, ContextPlugin>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: ContextPlugin) -> BenchResult<()> {
        if self.plugins.contains_key(plugin.name) {
            anyhow::bail!("Context [{}] is already registered", plugin.name);
        }

        log::debug!(
            "Registered context [{}] with order {}",
            plugin.name,
            plugin.order
        );
        self.plugins.insert(plugin.name, plugin);

        Ok(())
    }

    /// Builder style [ContextRegistry::register].
    pub fn with(mut self, plugin: ContextPlugin) -> BenchResult<Self> {
        self.register(plugin)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&ContextPlugin> {
        self.plugins.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.keys().copied()
    }
}
