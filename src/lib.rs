//! Template Broker - OSB binding resolution for templated cluster apps

pub mod descriptor;
pub mod error;
pub mod extract;
pub mod resolver;
pub mod server;
pub mod store;
pub mod substitute;
pub mod types;

pub use error::BrokerError;
pub use resolver::Resolver;
pub use server::router;
pub use types::{BindingRequest, BindingResponse, Endpoints, UnbindResponse};
