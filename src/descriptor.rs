//! Object descriptor interpretation
//!
//! Template object descriptors are opaque, loosely-typed documents. Only
//! three fields are ever projected out: `kind`, `metadata.name` and
//! `metadata.namespace`. Everything else (spec bodies, labels, kind-
//! specific fields) passes through uninspected.

use serde_json::Value;

use crate::error::BrokerError;
use crate::substitute::{has_placeholder, substitute};
use crate::types::TemplateInstance;

/// Resolved identity of one descriptor: what to fetch and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

/// Project a descriptor's kind/namespace/name, applying placeholder
/// substitution against the instance's resolved parameters.
///
/// The namespace defaults to the instance namespace and is overridden
/// only when the descriptor carries a non-empty `metadata.namespace`.
/// Name and namespace strings containing a placeholder marker are run
/// through the substitutor; all other strings are used literally.
///
/// A descriptor that is not a JSON object cannot be interpreted and
/// fails the whole bind request as a client error.
pub fn interpret(
    descriptor: &Value,
    instance_namespace: &str,
    instance: &TemplateInstance,
) -> Result<ObjectRef, BrokerError> {
    if !descriptor.is_object() {
        return Err(BrokerError::Descriptor(format!(
            "descriptor is not an object document: {descriptor}"
        )));
    }

    let kind = project_str(descriptor, "/kind").to_string();

    let mut namespace = instance_namespace.to_string();
    let descriptor_ns = project_str(descriptor, "/metadata/namespace");
    if !descriptor_ns.is_empty() {
        namespace = if has_placeholder(descriptor_ns) {
            substitute(instance.parameters(), descriptor_ns)
        } else {
            descriptor_ns.to_string()
        };
    }

    let mut name = project_str(descriptor, "/metadata/name").to_string();
    if !name.is_empty() && has_placeholder(&name) {
        name = substitute(instance.parameters(), &name);
    }

    Ok(ObjectRef {
        kind,
        namespace,
        name,
    })
}

/// Read a string field at a JSON pointer path, absent or non-string
/// fields read as empty.
fn project_str<'a>(doc: &'a Value, pointer: &str) -> &'a str {
    doc.pointer(pointer).and_then(Value::as_str).unwrap_or("")
}
