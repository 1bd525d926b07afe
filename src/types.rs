//! Domain types for binding resolution
//!
//! Wire shapes for the OSB bind request/response plus the control-plane
//! objects (Template, TemplateInstance) and the two live resource kinds
//! the extractor understands (Service, Secret).
//!
//! Control-plane and live-resource structs use `#[serde(default)]`
//! throughout: partial documents deserialize to zero-valued fields, and a
//! failed lookup is replaced by `Default::default()` (see resolver).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// IDENTITY
// ============================================================================

/// Namespace + name pair identifying an object in either store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// ============================================================================
// BIND REQUEST / RESPONSE
// ============================================================================

/// Incoming OSB bind request body
///
/// Only `context` is interpreted; the broker expects `instance_name` and
/// `namespace` keys. All other OSB body fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BindingRequest {
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl BindingRequest {
    /// Read a context key, treating absence as the empty string
    pub fn context_value(&self, key: &str) -> &str {
        self.context.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Host and ordered port list extracted from LoadBalancer services
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub host: String,
    pub ports: Vec<String>,
}

/// Accumulated bind result: connection endpoints plus credential entries
///
/// Starts empty and is mutated additively as descriptors are processed.
/// Credential keys are last-write-wins across resources, in template
/// definition order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingResponse {
    pub credentials: HashMap<String, String>,
    pub endpoints: Endpoints,
}

impl BindingResponse {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fixed unbind acknowledgment (serializes to `{}`)
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UnbindResponse {}

// ============================================================================
// CONTROL-PLANE OBJECTS
// ============================================================================

/// One resolved template parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Placeholder token this parameter substitutes, `${name}`
    pub fn token(&self) -> String {
        format!("${{{}}}", self.name)
    }
}

/// Standard object metadata subset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
}

/// Reference to the template an instance was created from
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplateRef {
    pub metadata: ObjectMeta,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplateInstanceSpec {
    pub template: TemplateRef,
}

/// A concrete, parameterized instantiation of a Template
///
/// Named `<instance_name>.<instance_id>` in its namespace. Owns the
/// ordered parameter values used for placeholder substitution.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplateInstance {
    pub metadata: ObjectMeta,
    pub spec: TemplateInstanceSpec,
}

impl TemplateInstance {
    /// Name of the Template this instance was created from
    pub fn template_name(&self) -> &str {
        &self.spec.template.metadata.name
    }

    /// Resolved parameters, in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.spec.template.parameters
    }
}

/// A reusable definition holding an ordered list of object descriptors
///
/// Descriptors are opaque documents; only `kind`, `metadata.name` and
/// `metadata.namespace` are ever projected out of them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Template {
    pub metadata: ObjectMeta,
    pub objects: Vec<Value>,
}

// ============================================================================
// LIVE RESOURCES
// ============================================================================

/// Service type string for load balancers
pub const SERVICE_TYPE_LOAD_BALANCER: &str = "LoadBalancer";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServicePort {
    pub port: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceSpec {
    #[serde(rename = "type")]
    pub service_type: String,
    pub ports: Vec<ServicePort>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoadBalancerIngress {
    pub ip: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoadBalancerStatus {
    pub ingress: Vec<LoadBalancerIngress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceStatus {
    pub load_balancer: LoadBalancerStatus,
}

/// Live Service state, as fetched from the resource store
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Service {
    pub spec: ServiceSpec,
    pub status: ServiceStatus,
}

impl Service {
    pub fn is_load_balancer(&self) -> bool {
        self.spec.service_type == SERVICE_TYPE_LOAD_BALANCER
    }
}

/// Live Secret state: an opaque byte-valued key/value map
#[derive(Debug, Clone, Default)]
pub struct Secret {
    pub data: HashMap<String, Vec<u8>>,
}
