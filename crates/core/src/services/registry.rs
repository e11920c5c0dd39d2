//! Registry of callable services

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use crewconnect_domain::{CrewConnectError, Result};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

/// Payload validation run before a handler is invoked
pub type ServiceSchema = fn(&Map<String, Value>) -> Result<()>;

/// Trait for a service implementation
#[async_trait]
pub trait ServiceHandler: Send + Sync {
    /// Handle a call whose payload already passed the schema
    async fn call(&self, data: &Map<String, Value>) -> Result<Value>;
}

struct RegisteredService {
    owner: String,
    schema: ServiceSchema,
    handler: Arc<dyn ServiceHandler>,
}

/// Services keyed by `(domain, name)`
///
/// Several owners may register the same service. The most recent registration
/// answers calls; when its owner unregisters, the previous one takes over.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<BTreeMap<(String, String), Vec<RegisteredService>>>,
}

impl ServiceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service for `owner`
    ///
    /// The new registration answers calls from now on. Registering again
    /// with the same owner replaces that owner's earlier registration.
    pub fn register(
        &self,
        domain: &str,
        name: &str,
        owner: &str,
        schema: ServiceSchema,
        handler: Arc<dyn ServiceHandler>,
    ) {
        let mut services = self.services.write();
        let stack = services.entry((domain.to_string(), name.to_string())).or_default();
        stack.retain(|service| service.owner != owner);
        let shadowed = stack.last().map(|service| service.owner.clone());
        stack.push(RegisteredService { owner: owner.to_string(), schema, handler });
        info!(domain, service = name, owner, shadowed = ?shadowed, "Service registered");
    }

    /// Remove every service registered by `owner`; returns how many were removed
    pub fn unregister_owner(&self, owner: &str) -> usize {
        let mut services = self.services.write();
        let mut removed = 0;
        services.retain(|(domain, name), stack| {
            let before = stack.len();
            stack.retain(|service| service.owner != owner);
            removed += before - stack.len();
            if before != stack.len() {
                if let Some(active) = stack.last() {
                    info!(domain = %domain, service = %name, owner = %active.owner, "Service handed back");
                }
            }
            !stack.is_empty()
        });
        if removed > 0 {
            info!(owner, removed, "Services unregistered");
        }
        removed
    }

    /// Owner whose registration currently answers `(domain, name)`
    pub fn active_owner(&self, domain: &str, name: &str) -> Option<String> {
        self.services
            .read()
            .get(&(domain.to_string(), name.to_string()))
            .and_then(|stack| stack.last())
            .map(|service| service.owner.clone())
    }

    /// Whether any owner has `(domain, name)` registered
    pub fn has_service(&self, domain: &str, name: &str) -> bool {
        self.services.read().contains_key(&(domain.to_string(), name.to_string()))
    }

    /// Registered `(domain, name)` pairs, sorted
    pub fn services(&self) -> Vec<(String, String)> {
        self.services.read().keys().cloned().collect()
    }

    /// Validate `data` and invoke the service.
    ///
    /// # Errors
    /// `NotFound` for an unknown service, `Validation` when the payload fails
    /// the schema (the handler is not invoked), otherwise the handler's error.
    #[instrument(skip(self, data))]
    pub async fn call(&self, domain: &str, name: &str, data: &Map<String, Value>) -> Result<Value> {
        let (schema, handler) = {
            let services = self.services.read();
            let service = services
                .get(&(domain.to_string(), name.to_string()))
                .and_then(|stack| stack.last())
                .ok_or_else(|| CrewConnectError::NotFound(format!("service {domain}.{name}")))?;
            (service.schema, Arc::clone(&service.handler))
        };

        if let Err(err) = schema(data) {
            warn!(error = %err, "Service call rejected");
            return Err(err);
        }

        debug!("Invoking service handler");
        handler.call(data).await
    }
}
