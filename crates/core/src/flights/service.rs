//! Unstaffed flight search
//!
//! Fetches the schedule for the requested day or range and keeps the flights
//! that match the aircraft type (if given) and are missing crew: any role
//! when no role is given, otherwise that role.

use std::sync::Arc;

use crewconnect_domain::{Flight, Result, UnstaffedFlightsQuery, UnstaffedFlightsResponse};
use tracing::{debug, instrument};

use crate::polling::PolledClient;

/// Keep the flights matching `query`, sorted by departure time.
///
/// The sort is stable, so flights departing at the same instant keep their
/// fetched order.
pub fn filter_unstaffed_flights(flights: Vec<Flight>, query: &UnstaffedFlightsQuery) -> Vec<Flight> {
    let mut matching: Vec<Flight> = flights
        .into_iter()
        .filter(|flight| query.aircraft_type.map_or(true, |wanted| flight.aircraft_type == wanted))
        .filter(|flight| flight.is_missing_crew_members(query.role))
        .collect();

    matching.sort_by_key(|flight| flight.departure_time);
    matching
}

/// Service answering `find_unstaffed_flights` for one account
pub struct UnstaffedFlightsService {
    client: Arc<PolledClient>,
}

impl UnstaffedFlightsService {
    /// Query service over a throttled client
    pub fn new(client: Arc<PolledClient>) -> Self {
        Self { client }
    }

    /// Run the search against a fresh schedule fetch.
    ///
    /// # Errors
    /// Propagates schedule fetch errors.
    #[instrument(skip(self), fields(host = %self.client.host()))]
    pub async fn find(&self, query: &UnstaffedFlightsQuery) -> Result<UnstaffedFlightsResponse> {
        let flights = self.client.get_flight_schedule(query.start_date, query.end_date).await?;
        let fetched = flights.len();

        let unstaffed = filter_unstaffed_flights(flights, query);
        debug!(fetched, unstaffed = unstaffed.len(), "Unstaffed flight search complete");

        Ok(UnstaffedFlightsResponse::from(unstaffed))
    }
}
