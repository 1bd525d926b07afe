//! Mock store for testing
//!
//! Serves seeded objects without a cluster. Records every lookup so
//! tests can assert on fetch order and abort behavior.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{ResourceStore, TemplateStore};
use crate::types::{NamespacedName, Secret, Service, Template, TemplateInstance};

/// In-memory store seeded with objects keyed by namespaced name
#[derive(Default)]
pub struct MockStore {
    instances: HashMap<String, TemplateInstance>,
    templates: HashMap<String, Template>,
    services: HashMap<String, Service>,
    secrets: HashMap<String, Secret>,
    /// Every lookup made, as "kind namespace/name"
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(mut self, id: NamespacedName, instance: TemplateInstance) -> Self {
        self.instances.insert(id.to_string(), instance);
        self
    }

    pub fn with_template(mut self, id: NamespacedName, template: Template) -> Self {
        self.templates.insert(id.to_string(), template);
        self
    }

    pub fn with_service(mut self, id: NamespacedName, service: Service) -> Self {
        self.services.insert(id.to_string(), service);
        self
    }

    pub fn with_secret(mut self, id: NamespacedName, secret: Secret) -> Self {
        self.secrets.insert(id.to_string(), secret);
        self
    }

    /// All lookups made so far, in call order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    fn record(&self, kind: &str, id: &NamespacedName) {
        self.lookups.lock().unwrap().push(format!("{kind} {id}"));
    }

    fn lookup<T: Clone>(&self, map: &HashMap<String, T>, kind: &str, id: &NamespacedName) -> Result<T> {
        self.record(kind, id);
        map.get(&id.to_string())
            .cloned()
            .ok_or_else(|| anyhow!("{kind} {id} not found"))
    }
}

#[async_trait]
impl TemplateStore for MockStore {
    async fn template_instance(&self, id: &NamespacedName) -> Result<TemplateInstance> {
        self.lookup(&self.instances, "TemplateInstance", id)
    }

    async fn template(&self, id: &NamespacedName) -> Result<Template> {
        self.lookup(&self.templates, "Template", id)
    }
}

#[async_trait]
impl ResourceStore for MockStore {
    async fn service(&self, id: &NamespacedName) -> Result<Service> {
        self.lookup(&self.services, "Service", id)
    }

    async fn secret(&self, id: &NamespacedName) -> Result<Secret> {
        self.lookup(&self.secrets, "Secret", id)
    }
}
