mod config;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ceilometer_client_instrumented::prelude::NewSample;
use cloudbench_runner::prelude::{
    iterate_per_tenants, BenchResult, ContextOutput, ContextPlugin, FailurePolicy, HookResult,
    RunnerContext, TenantId, User,
};

use crate::telemetry::{InstrumentedClientFactory, TelemetryClient, TelemetryClientFactory};

pub use config::CeilometerConfig;

#[derive(derive_more::Error, derive_more::Display, Debug, PartialEq)]
pub enum CeilometerContextError {
    /// A batch finished before any sample had been created for the tenant, so there is no
    /// resource to record for it.
    #[display("No sample was created for tenant [{tenant_id}] by the end of resource batch {batch}")]
    NoSampleCreated {
        tenant_id: TenantId,
        batch: u32,
    },
}

/// What the `ceilometer` context attaches to each tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantSamples {
    /// Every sample created, as returned by the service.
    pub samples: Vec<serde_json::Map<String, serde_json::Value>>,
    /// One resource id per resource batch, taken from the last sample created by that batch.
    pub resources: Vec<String>,
}

/// Populates tenants with telemetry samples before a benchmark runs.
///
/// Samples cannot be deleted through the telemetry API so cleanup leaves them in place.
#[derive(Debug, Clone)]
pub struct CeilometerSampleGenerator {
    config: CeilometerConfig,
    policy: FailurePolicy,
}

impl CeilometerSampleGenerator {
    pub const NAME: &'static str = "ceilometer";
    pub const ORDER: u32 = 450;

    /// A single failed sample is logged and skipped, without retrying.
    pub const DEFAULT_POLICY: FailurePolicy = FailurePolicy::LOG_AND_CONTINUE;

    pub fn new(config: CeilometerConfig) -> Self {
        Self {
            config,
            policy: Self::DEFAULT_POLICY,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &CeilometerConfig {
        &self.config
    }

    /// The context plugin registration for this context.
    pub fn plugin() -> ContextPlugin {
        ContextPlugin {
            name: Self::NAME,
            order: Self::ORDER,
            validate: validate_hook,
            setup: setup_hook,
            cleanup: cleanup_hook,
        }
    }

    /// Create samples for every tenant, using the first user found for each tenant.
    ///
    /// Failing to connect as a user aborts the setup, as does a resource batch that ends before
    /// the tenant has any sample at all.
    pub fn setup<F: TelemetryClientFactory>(
        &self,
        factory: &F,
        users: &[User],
    ) -> BenchResult<BTreeMap<TenantId, TenantSamples>> {
        log::info!("Enter context: `Ceilometer`");

        let mut results = BTreeMap::new();
        for (user, tenant_id) in iterate_per_tenants(users) {
            let mut client = factory.connect(user)?;
            let tenant_samples = self.populate_tenant(&mut client, tenant_id)?;

            log::debug!(
                "Created {} samples across {} resources for tenant [{}]",
                tenant_samples.samples.len(),
                tenant_samples.resources.len(),
                tenant_id
            );
            results.insert(tenant_id.clone(), tenant_samples);
        }

        Ok(results)
    }

    fn populate_tenant<C: TelemetryClient>(
        &self,
        client: &mut C,
        tenant_id: &TenantId,
    ) -> BenchResult<TenantSamples> {
        let mut tenant_samples = TenantSamples::default();
        let mut last_resource_id: Option<String> = None;

        for batch in 0..self.config.resources_per_tenant {
            for _ in 0..self.config.samples_per_resource {
                let created = self.policy.run("Creating a sample", || {
                    let samples = client.create_sample(&self.new_sample())?;
                    let sample = samples.into_iter().next().ok_or_else(|| {
                        anyhow::anyhow!("The telemetry service returned no samples")
                    })?;
                    let record = sample.to_record()?;

                    Ok((sample.resource_id, record))
                })?;

                if let Some((resource_id, record)) = created {
                    tenant_samples.samples.push(record);
                    last_resource_id = Some(resource_id);
                }
            }

            let resource_id =
                last_resource_id
                    .clone()
                    .ok_or_else(|| CeilometerContextError::NoSampleCreated {
                        tenant_id: tenant_id.clone(),
                        batch,
                    })?;
            tenant_samples.resources.push(resource_id);
        }

        Ok(tenant_samples)
    }

    fn new_sample(&self) -> NewSample {
        NewSample {
            counter_name: self.config.counter_name.clone(),
            counter_type: self.config.counter_type.clone(),
            counter_unit: self.config.counter_unit.clone(),
            counter_volume: self.config.counter_volume,
            resource_id: format!("bench_resource_{}", nanoid::nanoid!(8)),
        }
    }

    /// There is no API for removing samples or resources, so there is nothing to undo.
    pub fn cleanup(&self) -> HookResult {
        log::info!("Exit context: `Ceilometer`");
        Ok(())
    }
}

/// Turn per-tenant results into the runner's context output, under the `samples` and
/// `resources` keys.
pub(crate) fn into_context_output(
    results: BTreeMap<TenantId, TenantSamples>,
) -> BenchResult<ContextOutput> {
    let mut output = ContextOutput::new();
    for (tenant_id, tenant_samples) in results {
        output.insert_all(&tenant_id, &tenant_samples)?;
    }

    Ok(output)
}

fn validate_hook(config: &serde_json::Value) -> BenchResult<()> {
    CeilometerConfig::from_value(config).map(|_| ())
}

fn setup_hook(config: &serde_json::Value, ctx: &RunnerContext) -> BenchResult<ContextOutput> {
    let generator = CeilometerSampleGenerator::new(CeilometerConfig::from_value(config)?);
    let factory = InstrumentedClientFactory::from_runner_context(ctx);

    into_context_output(generator.setup(&factory, ctx.users())?)
}

fn cleanup_hook(config: &serde_json::Value, _ctx: &RunnerContext) -> HookResult {
    CeilometerSampleGenerator::new(CeilometerConfig::from_value(config)?).cleanup()
}
