use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cloudbench_instruments::{report_operation, OperationRecord, Reporter};

use crate::auth::{join_path, AuthOptions, KeystoneSession};
use crate::error::check_status;
use crate::sample::{NewSample, Sample};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Ceilometer v2 client that reports the timing of every call it makes.
pub struct CeilometerClientInstrumented {
    http: reqwest::Client,
    session: KeystoneSession,
    reporter: Arc<Reporter>,
}

impl CeilometerClientInstrumented {
    /// Authenticate against Keystone and resolve the metering endpoint.
    pub async fn connect(options: &AuthOptions, reporter: Arc<Reporter>) -> anyhow::Result<Self> {
        let record = OperationRecord::new("ceilometer_connect");
        let result = Self::connect_inner(options, reporter.clone()).await;
        report_operation(reporter, record, &result);

        result
    }

    async fn connect_inner(options: &AuthOptions, reporter: Arc<Reporter>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(options.insecure)
            .build()
            .context("Failed to build HTTP client")?;

        let session =
            KeystoneSession::authenticate(&http, options, KeystoneSession::METERING_SERVICE)
                .await?;
        log::debug!("Using metering endpoint {}", session.endpoint);

        Ok(Self {
            http,
            session,
            reporter,
        })
    }

    pub fn session(&self) -> &KeystoneSession {
        &self.session
    }

    /// Submit one sample. Ceilometer answers with the list of samples it stored.
    pub async fn create_sample(&self, sample: &NewSample) -> anyhow::Result<Vec<Sample>> {
        let record = OperationRecord::new("ceilometer_create_sample");
        let result = self.create_sample_inner(sample).await;
        report_operation(self.reporter.clone(), record, &result);

        result
    }

    async fn create_sample_inner(&self, sample: &NewSample) -> anyhow::Result<Vec<Sample>> {
        let url = join_path(
            self.session.endpoint.as_str(),
            &["v2", "meters", &sample.counter_name],
        )?;

        let response = self
            .http
            .post(url)
            .header("X-Auth-Token", &self.session.token)
            .json(&[sample])
            .send()
            .await
            .context("Failed to send create sample request")?;

        check_status("Create sample", response)
            .await?
            .json()
            .await
            .context("Failed to parse create sample response")
    }
}
