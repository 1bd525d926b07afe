//! Broker error taxonomy
//!
//! Every variant maps to a client error (HTTP 400) at the server layer.
//! Failures to look up the TemplateInstance or Template deliberately do
//! NOT appear here: those are logged warnings and the resolver continues
//! with a zero-valued record (see `resolver`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrokerError {
    /// Malformed bind request body
    #[error("malformed bind request body: {0}")]
    Decode(String),

    /// A template object descriptor could not be serialized/interpreted
    #[error("cannot interpret object descriptor: {0}")]
    Descriptor(String),

    /// A Service or Secret required by the binding could not be fetched.
    /// Hard dependency: a template referencing a missing resource is a
    /// resolution failure, not a skip.
    #[error("cannot fetch {kind} {name}: {source}")]
    ResourceFetch {
        kind: &'static str,
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl BrokerError {
    pub fn resource_fetch(
        kind: &'static str,
        name: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Self::ResourceFetch {
            kind,
            name: name.into(),
            source,
        }
    }
}
