use anyhow::Context;
use serde::{Deserialize, Serialize};

/// A sample to submit to Ceilometer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSample {
    pub counter_name: String,
    pub counter_type: String,
    pub counter_unit: String,
    pub counter_volume: f64,
    pub resource_id: String,
}

/// A sample as returned by the Ceilometer v2 API.
///
/// Fields this client does not know about are kept in `extra` so that [Sample::to_record] does
/// not lose anything the service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub counter_name: String,
    pub counter_type: String,
    pub counter_unit: String,
    pub counter_volume: f64,
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Sample {
    /// The sample as a plain JSON object.
    pub fn to_record(&self) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self).context("Failed to serialize sample")? {
            serde_json::Value::Object(record) => Ok(record),
            other => anyhow::bail!("Sample serialized to a non-object value: {other}"),
        }
    }
}
