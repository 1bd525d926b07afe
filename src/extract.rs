//! Resource extraction, dispatched by object kind
//!
//! Each supported kind contributes entries to the accumulating
//! [`BindingResponse`]:
//!
//! | Kind | Contribution |
//! |---------|------------------------------------------------------|
//! | Service | endpoints.host/ports, `instance-ip`, `instance-port` |
//! | Secret | one credential entry per data key |
//! | other | nothing (silently skipped) |
//!
//! Service and Secret fetches are hard dependencies: a template that
//! references a resource the store cannot return fails the whole bind
//! request. Unknown kinds are not an error.

use crate::descriptor::ObjectRef;
use crate::error::BrokerError;
use crate::store::ResourceStore;
use crate::types::{BindingResponse, NamespacedName};

/// Credential key carrying the load-balancer ingress address
pub const CREDENTIAL_INSTANCE_IP: &str = "instance-ip";

/// Credential key carrying the (last declared) service port
pub const CREDENTIAL_INSTANCE_PORT: &str = "instance-port";

/// Apply one descriptor's live-resource contribution to `response`
pub async fn extract(
    store: &dyn ResourceStore,
    object: &ObjectRef,
    response: &mut BindingResponse,
) -> Result<(), BrokerError> {
    let id = NamespacedName::new(&object.namespace, &object.name);
    match object.kind.as_str() {
        "Service" => extract_service(store, &id, response).await,
        "Secret" => extract_secret(store, &id, response).await,
        other => {
            tracing::debug!(kind = other, object = %id, "skipping unsupported kind");
            Ok(())
        }
    }
}

/// Service contribution: only LoadBalancer services carry connection
/// info. Each ingress overwrites the host (last wins); each declared
/// port is appended to the port list and overwrites the single
/// `instance-port` credential (last wins).
async fn extract_service(
    store: &dyn ResourceStore,
    id: &NamespacedName,
    response: &mut BindingResponse,
) -> Result<(), BrokerError> {
    let service = store
        .service(id)
        .await
        .map_err(|e| BrokerError::resource_fetch("Service", id.to_string(), e))?;

    if !service.is_load_balancer() {
        return Ok(());
    }

    for ingress in &service.status.load_balancer.ingress {
        response.endpoints.host = ingress.ip.clone();
        response
            .credentials
            .insert(CREDENTIAL_INSTANCE_IP.to_string(), ingress.ip.clone());
    }
    for port in &service.spec.ports {
        let port = port.port.to_string();
        response
            .credentials
            .insert(CREDENTIAL_INSTANCE_PORT.to_string(), port.clone());
        response.endpoints.ports.push(port);
    }
    Ok(())
}

/// Secret contribution: every data entry becomes a credential, bytes
/// rendered as a string, overwriting any earlier key of the same name.
async fn extract_secret(
    store: &dyn ResourceStore,
    id: &NamespacedName,
    response: &mut BindingResponse,
) -> Result<(), BrokerError> {
    let secret = store
        .secret(id)
        .await
        .map_err(|e| BrokerError::resource_fetch("Secret", id.to_string(), e))?;

    for (key, value) in &secret.data {
        response
            .credentials
            .insert(key.clone(), String::from_utf8_lossy(value).into_owned());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockStore;
    use crate::types::{Secret, Service};
    use serde_json::json;

    fn object(kind: &str, name: &str) -> ObjectRef {
        ObjectRef {
            kind: kind.to_string(),
            namespace: "team-a".to_string(),
            name: name.to_string(),
        }
    }

    fn lb_service(ips: &[&str], ports: &[i32]) -> Service {
        serde_json::from_value(json!({
            "spec": {
                "type": "LoadBalancer",
                "ports": ports.iter().map(|p| json!({"port": p})).collect::<Vec<_>>()
            },
            "status": {"loadBalancer": {
                "ingress": ips.iter().map(|ip| json!({"ip": ip})).collect::<Vec<_>>()
            }}
        }))
        .unwrap()
    }

    fn secret(pairs: &[(&str, &str)]) -> Secret {
        Secret {
            data: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn load_balancer_service_contributes_endpoints_and_credentials() {
        let store = MockStore::new().with_service(
            NamespacedName::new("team-a", "pg-svc"),
            lb_service(&["10.0.0.5"], &[5432]),
        );
        let mut response = BindingResponse::new();
        extract(&store, &object("Service", "pg-svc"), &mut response)
            .await
            .unwrap();

        assert_eq!(response.endpoints.host, "10.0.0.5");
        assert_eq!(response.endpoints.ports, vec!["5432"]);
        assert_eq!(response.credentials[CREDENTIAL_INSTANCE_IP], "10.0.0.5");
        assert_eq!(response.credentials[CREDENTIAL_INSTANCE_PORT], "5432");
    }

    #[tokio::test]
    async fn last_ingress_and_last_port_win() {
        let store = MockStore::new().with_service(
            NamespacedName::new("team-a", "pg-svc"),
            lb_service(&["10.0.0.5", "10.0.0.6"], &[5432, 6432]),
        );
        let mut response = BindingResponse::new();
        extract(&store, &object("Service", "pg-svc"), &mut response)
            .await
            .unwrap();

        assert_eq!(response.endpoints.host, "10.0.0.6");
        // All ports are kept in order; the single credential keeps only
        // the last one.
        assert_eq!(response.endpoints.ports, vec!["5432", "6432"]);
        assert_eq!(response.credentials[CREDENTIAL_INSTANCE_PORT], "6432");
    }

    #[tokio::test]
    async fn non_load_balancer_service_contributes_nothing() {
        let store = MockStore::new().with_service(
            NamespacedName::new("team-a", "pg-svc"),
            serde_json::from_value(json!({
                "spec": {"type": "ClusterIP", "ports": [{"port": 5432}]}
            }))
            .unwrap(),
        );
        let mut response = BindingResponse::new();
        extract(&store, &object("Service", "pg-svc"), &mut response)
            .await
            .unwrap();

        assert!(response.credentials.is_empty());
        assert_eq!(response.endpoints, Default::default());
    }

    #[tokio::test]
    async fn missing_service_aborts() {
        let store = MockStore::new();
        let mut response = BindingResponse::new();
        let err = extract(&store, &object("Service", "absent"), &mut response).await;
        assert!(matches!(err, Err(BrokerError::ResourceFetch { .. })));
    }

    #[tokio::test]
    async fn secret_entries_become_credentials() {
        let store = MockStore::new().with_secret(
            NamespacedName::new("team-a", "creds"),
            secret(&[("user", "u1"), ("pass", "p1")]),
        );
        let mut response = BindingResponse::new();
        extract(&store, &object("Secret", "creds"), &mut response)
            .await
            .unwrap();

        assert_eq!(response.credentials["user"], "u1");
        assert_eq!(response.credentials["pass"], "p1");
        assert_eq!(response.endpoints, Default::default());
    }

    #[tokio::test]
    async fn missing_secret_aborts() {
        let store = MockStore::new();
        let mut response = BindingResponse::new();
        let err = extract(&store, &object("Secret", "absent"), &mut response).await;
        assert!(matches!(err, Err(BrokerError::ResourceFetch { .. })));
    }

    #[tokio::test]
    async fn unknown_kind_is_skipped_without_fetching() {
        let store = MockStore::new();
        let mut response = BindingResponse::new();
        extract(&store, &object("ConfigMap", "anything"), &mut response)
            .await
            .unwrap();

        assert!(response.credentials.is_empty());
        assert!(store.lookups().is_empty());
    }
}
