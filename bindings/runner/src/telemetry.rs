use std::sync::Arc;

use ceilometer_client_instrumented::prelude::{
    AuthOptions, CeilometerClient, Interface, NewSample, Sample,
};
use cloudbench_runner::prelude::{
    BenchResult, Credential, EndpointType, Executor, Reporter, RunnerContext, User,
};

/// Synchronous view of the telemetry API, as used from context setup hooks.
pub trait TelemetryClient {
    /// Create one sample, returning the samples the service stored.
    fn create_sample(&mut self, sample: &NewSample) -> BenchResult<Vec<Sample>>;
}

/// Builds a [TelemetryClient] authenticated as a given user.
pub trait TelemetryClientFactory {
    type Client: TelemetryClient;

    fn connect(&self, user: &User) -> BenchResult<Self::Client>;
}

pub fn auth_options(credential: &Credential) -> AuthOptions {
    AuthOptions {
        auth_url: credential.auth_url.clone(),
        username: credential.username.clone(),
        password: credential.password.clone(),
        tenant_name: credential.tenant_name.clone(),
        region_name: credential.region_name.clone(),
        interface: match credential.endpoint_type {
            EndpointType::Public => Interface::Public,
            EndpointType::Internal => Interface::Internal,
            EndpointType::Admin => Interface::Admin,
        },
        insecure: credential.insecure,
    }
}

/// Connects the instrumented Ceilometer client, driving it through the runner's [Executor].
pub struct InstrumentedClientFactory {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
}

impl InstrumentedClientFactory {
    pub fn new(executor: Arc<Executor>, reporter: Arc<Reporter>) -> Self {
        Self { executor, reporter }
    }

    pub fn from_runner_context(ctx: &RunnerContext) -> Self {
        Self::new(ctx.executor().clone(), ctx.reporter())
    }
}

impl TelemetryClientFactory for InstrumentedClientFactory {
    type Client = ExecutorBoundClient;

    fn connect(&self, user: &User) -> BenchResult<Self::Client> {
        let options = auth_options(&user.credential);
        let reporter = self.reporter.clone();
        log::debug!("Connecting a Ceilometer client for user [{}]", user.id);

        let client = self.executor.execute_in_place(async move {
            CeilometerClient::connect(&options, reporter).await
        })?;

        Ok(ExecutorBoundClient {
            client,
            executor: self.executor.clone(),
        })
    }
}

pub struct ExecutorBoundClient {
    client: CeilometerClient,
    executor: Arc<Executor>,
}

impl TelemetryClient for ExecutorBoundClient {
    fn create_sample(&mut self, sample: &NewSample) -> BenchResult<Vec<Sample>> {
        self.executor
            .execute_in_place(self.client.create_sample(sample))
    }
}
