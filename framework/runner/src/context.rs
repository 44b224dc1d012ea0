use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

use cloudbench_core::prelude::ShutdownHandle;
use cloudbench_instruments::Reporter;

use crate::executor::Executor;
use crate::plugin::ContextOutput;
use crate::task::{TaskConfig, User};
use crate::types::BenchResult;

pub type TenantId = String;

/// Data attached to one tenant for the duration of a run.
///
/// Context plugins never write here directly. They return a [ContextOutput] which the runner
/// merges in, see [RunnerContext::merge].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantContext {
    pub id: TenantId,
    pub name: Option<String>,
    data: serde_json::Map<String, serde_json::Value>,
}

impl TenantContext {
    pub fn new(id: TenantId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            data: serde_json::Map::new(),
        }
    }

    /// Read a value stored under `key` by a context plugin.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> BenchResult<Option<T>> {
        self.data
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).with_context(|| {
                    format!("Unexpected shape for [{}] on tenant [{}]", key, self.id)
                })
            })
            .transpose()
    }

    pub fn data(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.data
    }
}

/// Everything the runner shares with context plugins and scenario hooks.
#[derive(Debug)]
pub struct RunnerContext {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    shutdown_handle: ShutdownHandle,
    users: Vec<User>,
    tenants: BTreeMap<TenantId, TenantContext>,
}

impl RunnerContext {
    pub fn new(
        executor: Arc<Executor>,
        reporter: Arc<Reporter>,
        shutdown_handle: ShutdownHandle,
        task: &TaskConfig,
    ) -> Self {
        let tenants = task
            .tenants
            .iter()
            .map(|tenant| {
                (
                    tenant.id.clone(),
                    TenantContext::new(tenant.id.clone(), tenant.name.clone()),
                )
            })
            .collect();

        Self {
            executor,
            reporter,
            shutdown_handle,
            users: task.users.clone(),
            tenants,
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn reporter(&self) -> Arc<Reporter> {
        self.reporter.clone()
    }

    pub fn shutdown_handle(&self) -> &ShutdownHandle {
        &self.shutdown_handle
    }

    /// Request that the run stops. In-flight work submitted through the [Executor] is cancelled.
    pub fn force_stop(&self) {
        self.shutdown_handle.shutdown();
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn tenants(&self) -> &BTreeMap<TenantId, TenantContext> {
        &self.tenants
    }

    pub fn tenant(&self, tenant_id: &str) -> Option<&TenantContext> {
        self.tenants.get(tenant_id)
    }

    /// Merge the output of a context plugin's setup into the tenants.
    ///
    /// Every tenant named in the output must already exist. Each key in the output replaces any
    /// previous value under that key and other keys are left alone. The merge is all or nothing.
    pub fn merge(&mut self, output: ContextOutput) -> BenchResult<()> {
        if let Some(unknown) = output
            .tenants()
            .keys()
            .find(|tenant_id| !self.tenants.contains_key(*tenant_id))
        {
            anyhow::bail!("Context output refers to unknown tenant [{}]", unknown);
        }

        for (tenant_id, values) in output.into_tenants() {
            if let Some(tenant) = self.tenants.get_mut(&tenant_id) {
                tenant.data.extend(values);
            }
        }

        Ok(())
    }
}
