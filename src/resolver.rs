//! Binding resolution pipeline
//!
//! One bind request runs a strictly sequential pipeline: compute the
//! instance identity, fetch the TemplateInstance and its Template, then
//! walk the template's object descriptors in definition order, letting
//! each supported kind contribute to a single accumulating response.
//!
//! Failure handling is deliberately asymmetric and must stay that way:
//! TemplateInstance/Template lookup failures are logged and resolution
//! continues with a zero-valued record (typically yielding an empty
//! response), while a Service/Secret fetch failure aborts the whole
//! request as a client error with no partial response.

use std::sync::Arc;

use crate::descriptor::interpret;
use crate::error::BrokerError;
use crate::extract::extract;
use crate::store::{ResourceStore, TemplateStore};
use crate::types::{BindingRequest, BindingResponse, NamespacedName};

/// Context key naming the instance (joined with the path instance id)
pub const CONTEXT_INSTANCE_NAME: &str = "instance_name";

/// Context key naming the instance's namespace
pub const CONTEXT_NAMESPACE: &str = "namespace";

/// Resolves bind requests against injected store handles
///
/// Holds no per-request state; one resolver serves any number of
/// concurrent requests.
#[derive(Clone)]
pub struct Resolver {
    templates: Arc<dyn TemplateStore>,
    resources: Arc<dyn ResourceStore>,
}

impl Resolver {
    pub fn new(templates: Arc<dyn TemplateStore>, resources: Arc<dyn ResourceStore>) -> Self {
        Self {
            templates,
            resources,
        }
    }

    /// Resolve the binding for `instance_id` per the request context
    pub async fn resolve(
        &self,
        instance_id: &str,
        request: &BindingRequest,
    ) -> Result<BindingResponse, BrokerError> {
        let mut response = BindingResponse::new();

        // TemplateInstance objects are named <instance_name>.<instance_id>
        let instance_id = NamespacedName::new(
            request.context_value(CONTEXT_NAMESPACE),
            format!(
                "{}.{}",
                request.context_value(CONTEXT_INSTANCE_NAME),
                instance_id
            ),
        );

        // Lookup failures here are non-fatal: warn and continue with a
        // zero-valued record, which resolves to an empty response.
        let instance = match self.templates.template_instance(&instance_id).await {
            Ok(instance) => instance,
            Err(e) => {
                tracing::warn!(instance = %instance_id, error = %e, "cannot get template instance");
                Default::default()
            }
        };

        let template_id =
            NamespacedName::new(&instance_id.namespace, instance.template_name());
        let template = match self.templates.template(&template_id).await {
            Ok(template) => template,
            Err(e) => {
                tracing::warn!(template = %template_id, error = %e, "cannot get template");
                Default::default()
            }
        };

        for descriptor in &template.objects {
            let object = interpret(descriptor, &instance_id.namespace, &instance)?;
            extract(self.resources.as_ref(), &object, &mut response).await?;
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockStore;
    use crate::types::{Parameter, Template, TemplateInstance};
    use serde_json::json;
    use std::collections::HashMap;

    fn request(instance_name: &str, namespace: &str) -> BindingRequest {
        let mut context = HashMap::new();
        context.insert(CONTEXT_INSTANCE_NAME.to_string(), instance_name.to_string());
        context.insert(CONTEXT_NAMESPACE.to_string(), namespace.to_string());
        BindingRequest { context }
    }

    fn instance(template_name: &str, params: &[(&str, &str)]) -> TemplateInstance {
        let mut ti = TemplateInstance::default();
        ti.spec.template.metadata.name = template_name.to_string();
        ti.spec.template.parameters = params
            .iter()
            .map(|(n, v)| Parameter::new(*n, *v))
            .collect();
        ti
    }

    fn template(objects: Vec<serde_json::Value>) -> Template {
        Template {
            objects,
            ..Default::default()
        }
    }

    fn resolver(store: MockStore) -> (Resolver, Arc<MockStore>) {
        let store = Arc::new(store);
        (
            Resolver::new(store.clone(), store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn instance_identity_joins_name_and_id() {
        let store = MockStore::new()
            .with_instance(
                NamespacedName::new("team-a", "pg.1234"),
                instance("postgres", &[]),
            )
            .with_template(
                NamespacedName::new("team-a", "postgres"),
                template(vec![]),
            );
        let (resolver, store) = resolver(store);

        let out = resolver.resolve("1234", &request("pg", "team-a")).await.unwrap();
        assert!(out.credentials.is_empty());
        assert_eq!(
            store.lookups(),
            vec![
                "TemplateInstance team-a/pg.1234",
                "Template team-a/postgres"
            ]
        );
    }

    #[tokio::test]
    async fn missing_instance_yields_empty_response_not_error() {
        // Both control-plane lookups fail; the request still succeeds
        // with an empty binding.
        let (resolver, _) = resolver(MockStore::new());
        let out = resolver.resolve("1234", &request("pg", "team-a")).await.unwrap();
        assert!(out.credentials.is_empty());
        assert_eq!(out.endpoints, Default::default());
    }

    #[tokio::test]
    async fn resource_fetch_failure_is_fatal() {
        let store = MockStore::new()
            .with_instance(
                NamespacedName::new("team-a", "pg.1234"),
                instance("postgres", &[]),
            )
            .with_template(
                NamespacedName::new("team-a", "postgres"),
                template(vec![json!({
                    "kind": "Service",
                    "metadata": {"name": "absent-svc"}
                })]),
            );
        let (resolver, _) = resolver(store);

        let err = resolver.resolve("1234", &request("pg", "team-a")).await;
        assert!(matches!(err, Err(BrokerError::ResourceFetch { .. })));
    }

    #[tokio::test]
    async fn descriptor_namespace_placeholder_resolved_before_fetch() {
        let store = MockStore::new()
            .with_instance(
                NamespacedName::new("team-a", "pg.1234"),
                instance("postgres", &[("target_ns", "team-b")]),
            )
            .with_template(
                NamespacedName::new("team-a", "postgres"),
                template(vec![json!({
                    "kind": "Secret",
                    "metadata": {"name": "creds", "namespace": "${target_ns}"}
                })]),
            )
            .with_secret(
                NamespacedName::new("team-b", "creds"),
                crate::types::Secret {
                    data: [("user".to_string(), b"u1".to_vec())].into(),
                },
            );
        let (resolver, _) = resolver(store);

        let out = resolver.resolve("1234", &request("pg", "team-a")).await.unwrap();
        assert_eq!(out.credentials["user"], "u1");
    }
}
