//! Store Abstraction Layer
//!
//! Traits and implementations for the two external collaborators of the
//! resolver:
//!
//! - [`TemplateStore`] - control-plane objects (Template, TemplateInstance)
//! - [`ResourceStore`] - live generated resources (Service, Secret)
//! - [`KubeStore`] - production implementation over the Kubernetes REST API
//! - [`MockStore`] - test implementation with seeded objects
//!
//! Both traits are `Send + Sync` so one store handle can be shared across
//! concurrently served bind requests; implementations hold no per-request
//! state.

mod kube;
mod mock;

pub use kube::KubeStore;
pub use mock::MockStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{NamespacedName, Secret, Service, Template, TemplateInstance};

/// Read access to control-plane domain objects
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Fetch a TemplateInstance by namespaced name
    async fn template_instance(&self, id: &NamespacedName) -> Result<TemplateInstance>;

    /// Fetch a Template by namespaced name
    async fn template(&self, id: &NamespacedName) -> Result<Template>;
}

/// Read access to live generated resources
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch live Service state by namespaced name
    async fn service(&self, id: &NamespacedName) -> Result<Service>;

    /// Fetch live Secret state by namespaced name
    async fn secret(&self, id: &NamespacedName) -> Result<Secret>;
}
