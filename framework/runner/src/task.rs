use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::context::TenantId;
use crate::types::BenchResult;

/// Which URL to pick from an identity service catalogue entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    #[default]
    Public,
    Internal,
    Admin,
}

/// Endpoint credentials for one cloud user.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credential {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub tenant_name: String,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub endpoint_type: EndpointType,
    #[serde(default)]
    pub insecure: bool,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("tenant_name", &self.tenant_name)
            .field("region_name", &self.region_name)
            .field("endpoint_type", &self.endpoint_type)
            .field("insecure", &self.insecure)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: String,
    pub tenant_id: TenantId,
    pub credential: Credential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantSpec {
    pub id: TenantId,
    #[serde(default)]
    pub name: Option<String>,
}

/// A benchmark task: the users and tenants to run as, and the context plugins to set up.
///
/// Task files are YAML, which also means plain JSON task files are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub tenants: Vec<TenantSpec>,
    /// Context name to the raw configuration for that context. Each context plugin validates its
    /// own configuration.
    #[serde(default)]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl TaskConfig {
    pub fn from_file(path: &Path) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read task file: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid task file: {}", path.display()))
    }

    pub fn parse(content: &str) -> BenchResult<Self> {
        let task: TaskConfig =
            serde_yaml::from_str(content).context("Failed to parse task definition")?;
        task.validate()?;

        Ok(task)
    }

    /// Every user must belong to a declared tenant and tenant ids must be unique.
    pub fn validate(&self) -> BenchResult<()> {
        let mut tenant_ids = HashSet::new();
        for tenant in &self.tenants {
            if !tenant_ids.insert(&tenant.id) {
                anyhow::bail!("Tenant [{}] is declared more than once", tenant.id);
            }
        }

        for user in &self.users {
            if !tenant_ids.contains(&user.tenant_id) {
                anyhow::bail!(
                    "User [{}] belongs to tenant [{}] which is not declared in `tenants`",
                    user.id,
                    user.tenant_id
                );
            }
        }

        Ok(())
    }
}
