use std::collections::BTreeMap;

use foundation::math::Coordinate;
use foundation::time::Millis;
use runtime::event_bus::Event;
use runtime::random::RandomSource;
use tracing::{debug, warn};

use crate::config::AnimationConfig;
use crate::error::RouteError;
use crate::host::RouteHost;
use crate::phase::TraceEvent;
use crate::route::{Itinerary, RouteRequest};
use crate::session::{RouteSession, Teardown};

/// UI position a route is presented in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u64);

/// Every route session on one map, driven by one virtual clock.
///
/// Guarantees:
/// - At most one session per route key.
/// - Due steps run in `(due, slot)` order; within a session, in scheduling
///   order.
/// - A failing session never stops its siblings.
pub struct RouteBoard<H, R> {
    config: AnimationConfig,
    host: H,
    rng: R,
    now: Millis,
    sessions: BTreeMap<SlotId, RouteSession>,
}

impl<H: RouteHost, R: RandomSource> RouteBoard<H, R> {
    pub fn new(config: AnimationConfig, host: H, rng: R) -> Self {
        Self {
            config,
            host,
            rng,
            now: Millis::ZERO,
            sessions: BTreeMap::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn session(&self, slot: SlotId) -> Option<&RouteSession> {
        self.sessions.get(&slot)
    }

    pub fn sessions(&self) -> impl Iterator<Item = (SlotId, &RouteSession)> + '_ {
        self.sessions.iter().map(|(slot, s)| (*slot, s))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Presents `request` in `slot`. Another slot showing the same route key
    /// is disposed first; a request with bad coordinates leaves `slot` empty.
    pub fn set_route(&mut self, slot: SlotId, request: RouteRequest) -> Result<(), RouteError> {
        let key = request.key();
        let duplicates: Vec<SlotId> = self
            .sessions
            .iter()
            .filter(|(other, s)| **other != slot && s.key() == Some(&key))
            .map(|(other, _)| *other)
            .collect();
        for other in duplicates {
            debug!(route = %key, slot = other.0, "route moved to another slot");
            if let Some(mut session) = self.sessions.remove(&other) {
                session.dispose(&mut self.host, self.now);
            }
        }

        let session = self
            .sessions
            .entry(slot)
            .or_insert_with(|| RouteSession::new(self.config.clone()));
        let result = session.set_route(request, &mut self.host, &mut self.rng, self.now);
        if result.is_err() {
            self.sessions.remove(&slot);
        }
        result
    }

    /// Presents every leg of `itinerary` in consecutive slots from `first`.
    pub fn set_itinerary(
        &mut self,
        first: SlotId,
        itinerary: &Itinerary,
    ) -> Vec<(SlotId, Result<(), RouteError>)> {
        itinerary
            .leg_requests()
            .into_iter()
            .zip(first.0..)
            .map(|(leg, slot)| {
                let slot = SlotId(slot);
                (slot, self.set_route(slot, leg))
            })
            .collect()
    }

    pub fn dispose(&mut self, slot: SlotId) -> Result<Teardown, RouteError> {
        let mut session = self
            .sessions
            .remove(&slot)
            .ok_or(RouteError::UnknownSlot(slot))?;
        Ok(session.dispose(&mut self.host, self.now))
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.sessions.values().filter_map(RouteSession::next_due).min()
    }

    /// Runs every step due up to `until`, across all sessions.
    ///
    /// Returns the failures in the order they happened.
    pub fn advance_to(&mut self, until: Millis) -> Vec<(SlotId, RouteError)> {
        let mut failures = Vec::new();
        while let Some((due, slot)) = self.earliest_due(until) {
            self.now = self.now.max(due);
            let Some(session) = self.sessions.get_mut(&slot) else {
                break;
            };
            if let Some(Err(err)) = session.fire_next(due, &mut self.host, &mut self.rng) {
                warn!(slot = slot.0, error = %err, "route session failed");
                failures.push((slot, err));
            }
        }
        self.now = self.now.max(until);
        failures
    }

    fn earliest_due(&self, until: Millis) -> Option<(Millis, SlotId)> {
        self.sessions
            .iter()
            .filter_map(|(slot, s)| s.next_due().map(|due| (due, *slot)))
            .filter(|(due, _)| *due <= until)
            .min()
    }

    pub fn on_hover(&mut self, slot: SlotId, at: Coordinate) -> Result<(), RouteError> {
        let session = self
            .sessions
            .get_mut(&slot)
            .ok_or(RouteError::UnknownSlot(slot))?;
        session.on_hover(&mut self.host, at)
    }

    pub fn on_hover_end(&mut self, slot: SlotId) -> Result<bool, RouteError> {
        let session = self
            .sessions
            .get_mut(&slot)
            .ok_or(RouteError::UnknownSlot(slot))?;
        Ok(session.on_hover_end(&mut self.host))
    }

    pub fn on_click(&mut self, slot: SlotId, at: Coordinate) -> Result<(), RouteError> {
        let session = self
            .sessions
            .get_mut(&slot)
            .ok_or(RouteError::UnknownSlot(slot))?;
        session.on_click(&mut self.host, at)
    }

    /// Takes every session's trace, merged by time then slot.
    pub fn drain_trace(&mut self) -> Vec<(SlotId, Event<TraceEvent>)> {
        let mut merged: Vec<(SlotId, Event<TraceEvent>)> = self
            .sessions
            .iter_mut()
            .flat_map(|(slot, s)| {
                let slot = *slot;
                s.trace_mut().drain().into_iter().map(move |e| (slot, e))
            })
            .collect();
        merged.sort_by_key(|(slot, e)| (e.at, *slot));
        merged
    }
}
