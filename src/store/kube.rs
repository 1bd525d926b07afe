//! Kubernetes-backed store implementation
//!
//! Talks to the cluster API server over plain REST. Template and
//! TemplateInstance live under the `tmax.io/v1` API group; Service and
//! Secret are core v1 objects. Authentication is a bearer token read
//! from the environment at startup.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

use super::{ResourceStore, TemplateStore};
use crate::types::{NamespacedName, Secret, Service, Template, TemplateInstance};

/// Default in-cluster API server address
const DEFAULT_API_SERVER: &str = "https://kubernetes.default.svc";

/// Env var holding the service-account bearer token
pub const TOKEN_ENV: &str = "KUBE_TOKEN";

/// API group path for Template/TemplateInstance custom resources
const TEMPLATE_API_GROUP: &str = "apis/tmax.io/v1";

/// Store backed by the Kubernetes REST API
pub struct KubeStore {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl KubeStore {
    /// Create a store against the default in-cluster API server,
    /// picking up the bearer token from `KUBE_TOKEN` if set
    pub fn new() -> Result<Self> {
        Self::with_api_server(DEFAULT_API_SERVER)
    }

    /// Create a store against a specific API server address
    pub fn with_api_server(api_server: &str) -> Result<Self> {
        let base = Url::parse(api_server)
            .with_context(|| format!("invalid API server address: {api_server}"))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
            token: std::env::var(TOKEN_ENV).ok(),
        })
    }

    /// Override the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build the object URL for a namespaced GET
    fn object_url(&self, api_prefix: &str, plural: &str, id: &NamespacedName) -> Result<Url> {
        let path = format!(
            "{}/namespaces/{}/{}/{}",
            api_prefix, id.namespace, plural, id.name
        );
        self.base
            .join(&path)
            .with_context(|| format!("cannot build object URL for {plural} {id}"))
    }

    /// GET one object and deserialize it
    async fn get_object<T: for<'de> Deserialize<'de>>(
        &self,
        api_prefix: &str,
        plural: &str,
        id: &NamespacedName,
    ) -> Result<T> {
        let url = self.object_url(api_prefix, plural, id)?;
        tracing::debug!(%url, "fetching object from API server");

        let mut req = self.client.get(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("request to API server failed for {plural} {id}"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("API server returned {status} for {plural} {id}");
        }

        resp.json::<T>()
            .await
            .with_context(|| format!("cannot decode {plural} {id}"))
    }

    /// Ping the API server version endpoint
    pub async fn check(&self) -> Result<()> {
        let url = self.base.join("version").context("cannot build version URL")?;
        let mut req = self.client.get(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.context("API server unreachable")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("API server returned {status} on version probe");
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for KubeStore {
    async fn template_instance(&self, id: &NamespacedName) -> Result<TemplateInstance> {
        self.get_object(TEMPLATE_API_GROUP, "templateinstances", id)
            .await
    }

    async fn template(&self, id: &NamespacedName) -> Result<Template> {
        self.get_object(TEMPLATE_API_GROUP, "templates", id).await
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    async fn service(&self, id: &NamespacedName) -> Result<Service> {
        self.get_object("api/v1", "services", id).await
    }

    async fn secret(&self, id: &NamespacedName) -> Result<Secret> {
        // Secret data values are base64 strings on the wire; decode to
        // the raw bytes the extractor expects.
        let doc: Value = self.get_object("api/v1", "secrets", id).await?;
        decode_secret(&doc).with_context(|| format!("cannot decode secret {id}"))
    }
}

/// Decode the `data` map of a wire-format Secret document
fn decode_secret(doc: &Value) -> Result<Secret> {
    let mut data = HashMap::new();
    if let Some(entries) = doc.pointer("/data").and_then(Value::as_object) {
        for (key, value) in entries {
            let encoded = value
                .as_str()
                .with_context(|| format!("secret key {key} is not a string"))?;
            let bytes = BASE64
                .decode(encoded)
                .with_context(|| format!("secret key {key} is not valid base64"))?;
            data.insert(key.clone(), bytes);
        }
    }
    Ok(Secret { data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> KubeStore {
        KubeStore::with_api_server("https://api.cluster.local:6443").unwrap()
    }

    #[test]
    fn template_instance_url() {
        let url = store()
            .object_url(
                TEMPLATE_API_GROUP,
                "templateinstances",
                &NamespacedName::new("team-a", "pg.1234"),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cluster.local:6443/apis/tmax.io/v1/namespaces/team-a/templateinstances/pg.1234"
        );
    }

    #[test]
    fn service_url_uses_core_api() {
        let url = store()
            .object_url("api/v1", "services", &NamespacedName::new("team-a", "pg-svc"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.cluster.local:6443/api/v1/namespaces/team-a/services/pg-svc"
        );
    }

    #[test]
    fn rejects_invalid_api_server_address() {
        assert!(KubeStore::with_api_server("not a url").is_err());
    }

    #[test]
    fn secret_data_is_base64_decoded() {
        let doc = json!({"data": {"user": "dTE=", "pass": "cDE="}});
        let secret = decode_secret(&doc).unwrap();
        assert_eq!(secret.data["user"], b"u1");
        assert_eq!(secret.data["pass"], b"p1");
    }

    #[test]
    fn secret_without_data_decodes_empty() {
        let secret = decode_secret(&json!({"metadata": {"name": "x"}})).unwrap();
        assert!(secret.data.is_empty());
    }

    #[test]
    fn secret_with_bad_base64_fails() {
        let doc = json!({"data": {"user": "!!not-base64!!"}});
        assert!(decode_secret(&doc).is_err());
    }
}
