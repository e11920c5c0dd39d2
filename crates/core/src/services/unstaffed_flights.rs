//! `find_unstaffed_flights` service binding

use std::sync::Arc;

use async_trait::async_trait;
use crewconnect_domain::{CrewConnectError, Result, UnstaffedFlightsQuery};
use serde_json::{Map, Value};

use super::registry::ServiceHandler;
use crate::flights::UnstaffedFlightsService;

/// Schema of the `find_unstaffed_flights` payload
pub fn validate_unstaffed_flights(data: &Map<String, Value>) -> Result<()> {
    UnstaffedFlightsQuery::from_service_data(data).map(|_| ())
}

/// Adapts [`UnstaffedFlightsService`] to the service registry
pub struct FindUnstaffedFlightsHandler {
    service: UnstaffedFlightsService,
}

impl FindUnstaffedFlightsHandler {
    /// Bind the query service to the service-call surface
    pub const fn new(service: UnstaffedFlightsService) -> Self {
        Self { service }
    }

    /// Handler ready to register
    pub fn shared(service: UnstaffedFlightsService) -> Arc<dyn ServiceHandler> {
        Arc::new(Self::new(service))
    }
}

#[async_trait]
impl ServiceHandler for FindUnstaffedFlightsHandler {
    async fn call(&self, data: &Map<String, Value>) -> Result<Value> {
        let query = UnstaffedFlightsQuery::from_service_data(data)?;
        let response = self.service.find(&query).await?;
        serde_json::to_value(response).map_err(|err| CrewConnectError::Internal(err.to_string()))
    }
}
