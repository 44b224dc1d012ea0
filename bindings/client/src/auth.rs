use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::check_status;

/// Which URL to use from a service catalogue entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interface {
    #[default]
    Public,
    Internal,
    Admin,
}

/// Keystone v2 password credentials scoped to a tenant.
#[derive(Clone)]
pub struct AuthOptions {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub tenant_name: String,
    pub region_name: Option<String>,
    pub interface: Interface,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

impl std::fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthOptions")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("tenant_name", &self.tenant_name)
            .field("region_name", &self.region_name)
            .field("interface", &self.interface)
            .field("insecure", &self.insecure)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    auth: TokenRequestAuth<'a>,
}

#[derive(Serialize)]
struct TokenRequestAuth<'a> {
    #[serde(rename = "tenantName")]
    tenant_name: &'a str,
    #[serde(rename = "passwordCredentials")]
    password_credentials: PasswordCredentials<'a>,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: Token,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct Token {
    id: String,
    #[serde(default)]
    tenant: Option<TokenTenant>,
}

#[derive(Deserialize)]
struct TokenTenant {
    id: String,
}

#[derive(Deserialize)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Deserialize)]
struct CatalogEndpoint {
    #[serde(default)]
    region: Option<String>,
    #[serde(rename = "publicURL", default)]
    public_url: Option<String>,
    #[serde(rename = "internalURL", default)]
    internal_url: Option<String>,
    #[serde(rename = "adminURL", default)]
    admin_url: Option<String>,
}

impl CatalogEndpoint {
    fn url(&self, interface: Interface) -> Option<&str> {
        match interface {
            Interface::Public => self.public_url.as_deref(),
            Interface::Internal => self.internal_url.as_deref(),
            Interface::Admin => self.admin_url.as_deref(),
        }
    }
}

/// An authenticated Keystone session: a token and the endpoint it resolved for one service.
#[derive(Clone)]
pub struct KeystoneSession {
    pub token: String,
    pub tenant_id: Option<String>,
    pub endpoint: Url,
}

impl std::fmt::Debug for KeystoneSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoneSession")
            .field("tenant_id", &self.tenant_id)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl KeystoneSession {
    pub const METERING_SERVICE: &'static str = "metering";

    /// Get a token from Keystone and resolve the endpoint for `service_type` from the catalogue.
    pub async fn authenticate(
        http: &reqwest::Client,
        options: &AuthOptions,
        service_type: &str,
    ) -> anyhow::Result<Self> {
        let url = join_path(&options.auth_url, &["tokens"])?;
        let request = TokenRequest {
            auth: TokenRequestAuth {
                tenant_name: &options.tenant_name,
                password_credentials: PasswordCredentials {
                    username: &options.username,
                    password: &options.password,
                },
            },
        };

        log::debug!(
            "Authenticating [{}] in tenant [{}] against {}",
            options.username,
            options.tenant_name,
            url
        );
        let response = http
            .post(url)
            .json(&request)
            .send()
            .await
            .context("Failed to send token request to Keystone")?;
        let response: TokenResponse = check_status("Keystone authentication", response)
            .await?
            .json()
            .await
            .context("Failed to parse Keystone token response")?;

        let endpoint = find_endpoint(
            &response.access.service_catalog,
            service_type,
            options.region_name.as_deref(),
            options.interface,
        )?;

        Ok(Self {
            token: response.access.token.id,
            tenant_id: response.access.token.tenant.map(|t| t.id),
            endpoint,
        })
    }
}

fn find_endpoint(
    catalog: &[CatalogEntry],
    service_type: &str,
    region_name: Option<&str>,
    interface: Interface,
) -> anyhow::Result<Url> {
    let url = catalog
        .iter()
        .filter(|entry| entry.service_type == service_type)
        .flat_map(|entry| entry.endpoints.iter())
        .filter(|endpoint| match region_name {
            Some(region) => endpoint.region.as_deref() == Some(region),
            None => true,
        })
        .find_map(|endpoint| endpoint.url(interface))
        .with_context(|| {
            format!(
                "No {:?} endpoint for service [{}] in region [{}]",
                interface,
                service_type,
                region_name.unwrap_or("any")
            )
        })?;

    Url::parse(url).with_context(|| format!("Invalid endpoint URL in catalogue: {url}"))
}

/// Append path segments to `base`, keeping any path `base` already has.
pub(crate) fn join_path(base: &str, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid URL: {base}"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("URL cannot be a base: {base}"))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
