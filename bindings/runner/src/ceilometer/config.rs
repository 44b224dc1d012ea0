use anyhow::Context;
use serde::{Deserialize, Serialize};

use cloudbench_runner::prelude::BenchResult;

fn default_resources_per_tenant() -> u32 {
    5
}

fn default_samples_per_resource() -> u32 {
    5
}

/// Configuration of the `ceilometer` context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CeilometerConfig {
    pub counter_name: String,
    pub counter_type: String,
    pub counter_unit: String,
    /// Must not be negative.
    pub counter_volume: f64,
    /// At least 1.
    #[serde(default = "default_resources_per_tenant")]
    pub resources_per_tenant: u32,
    /// At least 1.
    #[serde(default = "default_samples_per_resource")]
    pub samples_per_resource: u32,
}

impl CeilometerConfig {
    /// Deserialize and validate a raw context configuration.
    pub fn from_value(value: &serde_json::Value) -> BenchResult<Self> {
        let config: CeilometerConfig = serde_json::from_value(value.clone())
            .context("Failed to parse ceilometer context configuration")?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.counter_volume.is_nan() || self.counter_volume < 0.0 {
            anyhow::bail!(
                "`counter_volume` must be a non-negative number, got {}",
                self.counter_volume
            );
        }
        if self.resources_per_tenant < 1 {
            anyhow::bail!("`resources_per_tenant` must be at least 1");
        }
        if self.samples_per_resource < 1 {
            anyhow::bail!("`samples_per_resource` must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn valid() -> serde_json::Value {
        json!({
            "counter_name": "cpu_util",
            "counter_type": "gauge",
            "counter_unit": "%",
            "counter_volume": 1.0
        })
    }

    fn error_chain(err: anyhow::Error) -> String {
        format!("{err:#}")
    }

    #[test]
    fn defaults_are_applied() {
        let config = CeilometerConfig::from_value(&valid()).unwrap();

        assert_eq!(
            CeilometerConfig {
                counter_name: "cpu_util".to_string(),
                counter_type: "gauge".to_string(),
                counter_unit: "%".to_string(),
                counter_volume: 1.0,
                resources_per_tenant: 5,
                samples_per_resource: 5,
            },
            config
        );
    }

    #[test]
    fn integer_volume_and_explicit_counts() {
        let mut value = valid();
        value["counter_volume"] = json!(0);
        value["resources_per_tenant"] = json!(2);
        value["samples_per_resource"] = json!(3);

        let config = CeilometerConfig::from_value(&value).unwrap();

        assert_eq!(0.0, config.counter_volume);
        assert_eq!(2, config.resources_per_tenant);
        assert_eq!(3, config.samples_per_resource);
    }

    #[test]
    fn every_required_field_is_required() {
        for field in ["counter_name", "counter_type", "counter_unit", "counter_volume"] {
            let mut value = valid();
            value.as_object_mut().unwrap().remove(field);

            let err = CeilometerConfig::from_value(&value).unwrap_err();
            assert!(
                error_chain(err).contains(&format!("missing field `{field}`")),
                "expected {field} to be required"
            );
        }
    }

    #[test]
    fn unknown_property_is_rejected() {
        let mut value = valid();
        value["counter_color"] = json!("blue");

        let err = CeilometerConfig::from_value(&value).unwrap_err();
        assert!(error_chain(err).contains("unknown field `counter_color`"));
    }

    #[test]
    fn negative_volume_is_rejected() {
        let mut value = valid();
        value["counter_volume"] = json!(-0.5);

        assert!(CeilometerConfig::from_value(&value).is_err());
    }

    #[test]
    fn counts_must_be_positive_integers() {
        for (field, bad) in [
            ("resources_per_tenant", json!(0)),
            ("samples_per_resource", json!(0)),
            ("resources_per_tenant", json!(-1)),
            ("samples_per_resource", json!(1.5)),
            ("resources_per_tenant", json!("5")),
        ] {
            let mut value = valid();
            value[field] = bad.clone();

            assert!(
                CeilometerConfig::from_value(&value).is_err(),
                "{field} = {bad} should be rejected"
            );
        }
    }

    #[test]
    fn wrong_types_are_rejected() {
        let mut value = valid();
        value["counter_name"] = json!(42);

        assert!(CeilometerConfig::from_value(&value).is_err());
    }
}
