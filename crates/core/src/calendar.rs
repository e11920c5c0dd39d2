//! Flight schedule exposed as calendar events
//!
//! Every read goes through the throttled refresh first, then fetches the
//! schedule for the days covering the requested window.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use crewconnect_domain::{CalendarEvent, Result};
use tracing::{debug, instrument};

use crate::polling::PolledClient;

/// Days searched ahead of `now` by [`FlightCalendar::current`]
const DEFAULT_LOOKAHEAD_DAYS: i64 = 7;

/// Calendar view of one account's flights
pub struct FlightCalendar {
    client: Arc<PolledClient>,
    lookahead: Duration,
}

impl FlightCalendar {
    /// Calendar over a throttled client
    pub fn new(client: Arc<PolledClient>) -> Self {
        Self { client, lookahead: Duration::days(DEFAULT_LOOKAHEAD_DAYS) }
    }

    /// How far ahead `current` searches for the next flight
    #[must_use]
    pub const fn with_lookahead(mut self, lookahead: Duration) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Events overlapping `[start, end)`, sorted by start.
    ///
    /// # Errors
    /// Propagates refresh and schedule fetch errors.
    #[instrument(skip(self))]
    pub async fn events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        self.client.refresh().await?;

        // A flight departing the day before can still be airborne at `start`.
        let first_day = (start - Duration::days(1)).date_naive();
        let last_day = end.date_naive();
        let flights = self.client.get_flight_schedule(first_day, Some(last_day)).await?;

        let mut events: Vec<CalendarEvent> = flights
            .iter()
            .map(CalendarEvent::from)
            .filter(|event| event.overlaps(start, end))
            .collect();
        events.sort_by_key(|event| event.start);

        debug!(count = events.len(), "Calendar events loaded");
        Ok(events)
    }

    /// The ongoing event, or else the next one within the look-ahead.
    ///
    /// # Errors
    /// Propagates refresh and schedule fetch errors.
    pub async fn current(&self, now: DateTime<Utc>) -> Result<Option<CalendarEvent>> {
        let events = self.events(now, now + self.lookahead).await?;
        Ok(events.into_iter().find(|event| event.end > now))
    }
}
