use foundation::math::{Arc, Coordinate, compute_arc_with_points};
use foundation::time::Millis;
use runtime::event_bus::EventBus;
use runtime::random::RandomSource;
use scene::{ResourceLifecycle, SubscriptionId};
use tracing::{debug, warn};

use crate::config::AnimationConfig;
use crate::error::RouteError;
use crate::host::{RenderFrame, RouteHost};
use crate::phase::{Phase, TraceEvent};
use crate::popup::{DetailPopupController, PopupMode};
use crate::route::{RouteKey, RouteRequest};
use crate::scheduler::{Glyph, PhaseScheduler, StepContext};
use crate::symbology::RouteSymbology;

/// What one `teardown_all` call released.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Teardown {
    pub timers: usize,
    pub artifacts: usize,
}

impl Teardown {
    pub fn is_empty(&self) -> bool {
        self.timers == 0 && self.artifacts == 0
    }
}

#[derive(Debug)]
struct ActiveRoute {
    request: RouteRequest,
    key: RouteKey,
    departure: Coordinate,
    arrival: Coordinate,
    arc: Arc,
    symbology: RouteSymbology,
}

/// Animation state of one presented route.
///
/// Owns its timer group (inside the scheduler), its phase artifacts and its
/// popup. Nothing here is shared with other sessions except the host surface.
#[derive(Debug)]
pub struct RouteSession {
    config: AnimationConfig,
    route: Option<ActiveRoute>,
    scheduler: PhaseScheduler,
    artifacts: ResourceLifecycle,
    popup: DetailPopupController,
    subscription: Option<SubscriptionId>,
    trace: EventBus<TraceEvent>,
    disposed: bool,
}

impl RouteSession {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            scheduler: PhaseScheduler::new(config.clone()),
            config,
            route: None,
            artifacts: ResourceLifecycle::new(),
            popup: DetailPopupController::new(),
            subscription: None,
            trace: EventBus::new(),
            disposed: false,
        }
    }

    /// Presents `request`, replacing whatever this session showed before.
    ///
    /// A request for the route already running only refreshes its metadata.
    /// Otherwise the previous route is torn down before the new arc is
    /// computed. On a geometry error the session is left empty.
    pub fn set_route<H: RouteHost>(
        &mut self,
        request: RouteRequest,
        host: &mut H,
        rng: &mut dyn RandomSource,
        now: Millis,
    ) -> Result<(), RouteError> {
        if self.subscription.is_some()
            && let Some(route) = self.route.as_mut()
            && route.key == request.key()
        {
            debug!(route = %route.key, "route metadata refreshed");
            route.request = request;
            return Ok(());
        }

        self.teardown_all(host, now);
        self.scheduler.reset();
        self.route = None;
        self.disposed = false;

        let key = request.key();
        let route = match self.prepare(request, key.clone()) {
            Ok(route) => route,
            Err(err) => {
                warn!(route = %key, error = %err, "route not presented");
                return Err(err);
            }
        };

        self.subscription = Some(host.subscribe(&key.to_string()));
        self.route = Some(route);
        self.scheduler.arm(now, rng, &mut self.trace);
        debug!(route = %key, "route armed");
        Ok(())
    }

    fn prepare(&self, request: RouteRequest, key: RouteKey) -> Result<ActiveRoute, RouteError> {
        let departure = request.departure.coordinate()?;
        let arrival = request.arrival.coordinate()?;
        let bend = self.config.bend_for(key.kind);
        let arc = compute_arc_with_points(departure, arrival, bend, self.config.arc_points)?;
        Ok(ActiveRoute {
            symbology: RouteSymbology::for_kind(key.kind),
            request,
            key,
            departure,
            arrival,
            arc,
        })
    }

    /// Cancels every pending timer, releases every artifact (popup included)
    /// and drops the interaction subscription. Idempotent; the phase is kept.
    pub fn teardown_all<H: RouteHost>(&mut self, host: &mut H, now: Millis) -> Teardown {
        let timers = self.scheduler.cancel_all();
        let mut artifacts = self.artifacts.release_all(host);
        if self.popup.close(host) {
            artifacts += 1;
        }
        let unsubscribed = match self.subscription.take() {
            Some(id) => {
                host.unsubscribe(id);
                true
            }
            None => false,
        };
        let report = Teardown { timers, artifacts };
        if !report.is_empty() || unsubscribed {
            self.trace.emit(now, TraceEvent::TornDown { timers, artifacts });
        }
        report
    }

    pub fn dispose<H: RouteHost>(&mut self, host: &mut H, now: Millis) -> Teardown {
        let report = self.teardown_all(host, now);
        if let Some(route) = &self.route {
            debug!(route = %route.key, "route disposed");
        }
        self.scheduler.reset();
        self.route = None;
        self.disposed = true;
        report
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.route.as_ref()?;
        self.scheduler.next_due()
    }

    /// Runs the earliest step due at or before `now`, then renders.
    ///
    /// Returns `None` when nothing is due. A failed transition tears the
    /// session down and is reported; the session itself stays usable.
    pub fn fire_next<H: RouteHost>(
        &mut self,
        now: Millis,
        host: &mut H,
        rng: &mut dyn RandomSource,
    ) -> Option<Result<(), RouteError>> {
        let route = self.route.as_mut()?;
        let fired = self.scheduler.pop_due(now)?;
        let result = {
            let mut ctx = StepContext {
                now: fired.due,
                arc: &mut route.arc,
                departure: route.departure,
                arrival: route.arrival,
                artifacts: &mut self.artifacts,
                surface: &mut *host,
                rng,
                symbology: route.symbology,
                trace: &mut self.trace,
            };
            self.scheduler.handle(fired.payload, &mut ctx)
        };

        if let Err(err) = result {
            warn!(route = %route.key, step = ?fired.payload, error = %err, "phase transition aborted");
            self.trace.emit(
                fired.due,
                TraceEvent::TransitionFailed {
                    step: fired.payload,
                    reason: err.to_string(),
                },
            );
            self.teardown_all(host, fired.due);
            return Some(Err(err.into()));
        }

        if let Some(frame) = self.render_frame() {
            host.render(&frame);
        }
        Some(Ok(()))
    }

    /// Fires everything due up to `now`; stops at the first failure.
    pub fn advance_to<H: RouteHost>(
        &mut self,
        now: Millis,
        host: &mut H,
        rng: &mut dyn RandomSource,
    ) -> Result<usize, RouteError> {
        let mut fired = 0;
        while let Some(result) = self.fire_next(now, host, rng) {
            result?;
            fired += 1;
        }
        Ok(fired)
    }

    /// Pointer events only reach a route while its subscription is live.
    pub fn on_hover<H: RouteHost>(&mut self, host: &mut H, at: Coordinate) -> Result<(), RouteError> {
        if self.subscription.is_none() {
            return Ok(());
        }
        if let Some(route) = &self.route {
            self.popup.hover(host, &route.request, at)?;
        }
        Ok(())
    }

    pub fn on_hover_end<H: RouteHost>(&mut self, host: &mut H) -> bool {
        self.popup.hover_end(host)
    }

    pub fn on_click<H: RouteHost>(&mut self, host: &mut H, at: Coordinate) -> Result<(), RouteError> {
        if self.subscription.is_none() {
            return Ok(());
        }
        if let Some(route) = &self.route {
            self.popup.click(host, &route.request, at)?;
        }
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn key(&self) -> Option<&RouteKey> {
        self.route.as_ref().map(|r| &r.key)
    }

    pub fn request(&self) -> Option<&RouteRequest> {
        self.route.as_ref().map(|r| &r.request)
    }

    pub fn arc(&self) -> Option<&Arc> {
        self.route.as_ref().map(|r| &r.arc)
    }

    pub fn displayed_arc(&self) -> &[Coordinate] {
        match &self.route {
            Some(route) => route.arc.prefix(self.scheduler.revealed()),
            None => &[],
        }
    }

    pub fn glyph(&self) -> Option<Glyph> {
        self.scheduler.glyph()
    }

    pub fn is_replaying(&self) -> bool {
        self.scheduler.is_replaying()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Live phase artifacts; the popup is counted separately.
    pub fn live_artifacts(&self) -> usize {
        self.artifacts.live_count()
    }

    pub fn popup_mode(&self) -> Option<PopupMode> {
        self.popup.mode()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn render_frame(&self) -> Option<RenderFrame<'_>> {
        let route = self.route.as_ref()?;
        Some(RenderFrame {
            route: &route.key,
            phase: self.scheduler.phase(),
            arc_prefix: route.arc.prefix(self.scheduler.revealed()),
            glyph: self.scheduler.glyph(),
        })
    }

    pub fn trace(&self) -> &EventBus<TraceEvent> {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut EventBus<TraceEvent> {
        &mut self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::{RouteSession, Teardown};
    use crate::config::AnimationConfig;
    use crate::error::RouteError;
    use crate::phase::{Phase, TraceEvent};
    use crate::popup::PopupMode;
    use crate::recording::RecordingHost;
    use crate::route::{Airport, FlightInfo, RouteKind, RouteRequest};
    use foundation::math::{Coordinate, GeometryError};
    use foundation::time::Millis;
    use pretty_assertions::assert_eq;
    use runtime::random::SequenceRandom;
    use scene::ArtifactKind;

    // Jitter 500ms; 100 reveal ticks; 100 fly ticks.
    const ZOOM_AT: u64 = 500;
    const DRAW_AT: u64 = ZOOM_AT + 2500;
    const FLY_AT: u64 = DRAW_AT + 300 + 99 * 16 + 1500;
    const COMPLETE_AT: u64 = FLY_AT + 100 * 80 + 3000;

    fn jfk_gnd() -> RouteRequest {
        RouteRequest::new(
            Airport::new("JFK", "New York", 40.6413, -73.7781),
            Airport::new("GND", "St. George's", 12.0042, -61.7863),
            FlightInfo {
                flight_number: "AA 1234".into(),
                airline: "American".into(),
                duration_text: "7h 45m".into(),
                ..FlightInfo::default()
            },
        )
    }

    fn mia_bgi() -> RouteRequest {
        RouteRequest::new(
            Airport::new("MIA", "Miami", 25.7959, -80.2870),
            Airport::new("BGI", "Bridgetown", 13.0746, -59.4925),
            FlightInfo::default(),
        )
    }

    fn never_replay() -> SequenceRandom {
        SequenceRandom::new([0.0], 0.99)
    }

    fn phases(session: &RouteSession) -> Vec<Phase> {
        session
            .trace()
            .payloads()
            .filter_map(|e| match e {
                TraceEvent::PhaseEntered { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn full_narrative_runs_in_order() {
        let mut host = RecordingHost::new();
        let mut rng = never_replay();
        let mut session = RouteSession::new(AnimationConfig::default());
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.is_subscribed());
        assert_eq!(session.arc().unwrap().len(), 101);

        session
            .advance_to(Millis(COMPLETE_AT + 8000), &mut host, &mut rng)
            .unwrap();
        assert_eq!(
            phases(&session),
            vec![Phase::Zooming, Phase::Drawing, Phase::Flying, Phase::Complete]
        );
        assert_eq!(session.phase(), Phase::Complete);
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(host.surface.live_count(), 0);
        assert_eq!(host.surface.unknown_count(), 0);
        assert_eq!(session.displayed_arc().len(), 101);
    }

    #[test]
    fn render_frames_follow_the_reveal() {
        let mut host = RecordingHost::new();
        let mut rng = never_replay();
        let mut session = RouteSession::new(AnimationConfig::default());
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();
        session
            .advance_to(Millis(DRAW_AT + 300 + 16 * 9), &mut host, &mut rng)
            .unwrap();

        let key = session.key().unwrap().clone();
        let frame = host.last_frame(&key).unwrap();
        assert_eq!(frame.phase, Phase::Drawing);
        assert_eq!(frame.prefix_len, 11);
        assert_eq!(frame.glyph, None);

        session
            .advance_to(Millis(FLY_AT + 80), &mut host, &mut rng)
            .unwrap();
        let frame = host.last_frame(&key).unwrap();
        assert_eq!(frame.phase, Phase::Flying);
        assert_eq!(frame.prefix_len, 101);
        let glyph = frame.glyph.unwrap();
        assert_eq!(glyph.position, session.arc().unwrap().point(1).unwrap());
    }

    #[test]
    fn route_change_during_drawing_leaves_nothing_behind() {
        let mut host = RecordingHost::new();
        let mut rng = SequenceRandom::new([0.0, 0.0], 0.99);
        let mut session = RouteSession::new(AnimationConfig::default());
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();
        session
            .advance_to(Millis(DRAW_AT + 500), &mut host, &mut rng)
            .unwrap();
        assert_eq!(session.phase(), Phase::Drawing);
        assert_eq!(
            host.surface.live_of_kind(ArtifactKind::DrawingPulse).len(),
            1
        );

        let now = Millis(DRAW_AT + 500);
        session.set_route(mia_bgi(), &mut host, &mut rng, now).unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.live_artifacts(), 0);
        assert_eq!(host.surface.live_count(), 0);
        assert_eq!(session.displayed_arc().len(), 0);
        // Only the new BeginZoom is pending.
        assert_eq!(session.pending_timers(), 1);
        assert_eq!(session.next_due(), Some(Millis(DRAW_AT + 1000)));
        assert_eq!(host.surface.subscription_count(), 1);
        assert_eq!(host.surface.subscribers().collect::<Vec<_>>(), vec!["MIA-BGI/direct"]);

        // Nothing of the old route fires: the next phase entry is the new zoom.
        let before = host.surface.ops().len();
        session
            .advance_to(Millis(DRAW_AT + 999), &mut host, &mut rng)
            .unwrap();
        assert_eq!(host.surface.ops().len(), before);
        session
            .advance_to(Millis(DRAW_AT + 1000), &mut host, &mut rng)
            .unwrap();
        assert_eq!(session.phase(), Phase::Zooming);
        assert_eq!(session.key().unwrap().departure, "MIA");
    }

    /// Presents JFK-GND, runs it to `at` and switches to MIA-BGI there.
    fn switch_route_at(at: u64, phase: Phase, live: &[ArtifactKind], pending: usize) {
        let mut host = RecordingHost::new();
        let mut rng = SequenceRandom::new([0.0, 0.0], 0.99);
        let mut session = RouteSession::new(AnimationConfig::default());
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();
        session
            .advance_to(Millis(at), &mut host, &mut rng)
            .unwrap();
        assert_eq!(session.phase(), phase);
        let kinds: Vec<_> = host.surface.live().map(|(_, a)| a.kind).collect();
        assert_eq!(kinds, live);
        assert_eq!(session.pending_timers(), pending);

        let removed = host.surface.removed_count();
        session
            .set_route(mia_bgi(), &mut host, &mut rng, Millis(at))
            .unwrap();
        assert_eq!(host.surface.removed_count(), removed + live.len());
        assert_eq!(host.surface.live_count(), 0);
        assert_eq!(host.surface.unknown_count(), 0);
        assert_eq!(session.live_artifacts(), 0);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.pending_timers(), 1);
        assert_eq!(session.next_due(), Some(Millis(at + 500)));

        let events: Vec<_> = session.trace().payloads().cloned().collect();
        assert_eq!(
            events[events.len() - 2..].to_vec(),
            vec![
                TraceEvent::TornDown {
                    timers: pending,
                    artifacts: live.len(),
                },
                TraceEvent::Armed { delay_ms: 500 },
            ]
        );

        // Old steps are gone: nothing happens before the new zoom.
        let ops = host.surface.ops().len();
        session
            .advance_to(Millis(at + 499), &mut host, &mut rng)
            .unwrap();
        assert_eq!(host.surface.ops().len(), ops);
        assert_eq!(session.phase(), Phase::Idle);
        session
            .advance_to(Millis(at + 500), &mut host, &mut rng)
            .unwrap();
        assert_eq!(session.phase(), Phase::Zooming);
        assert_eq!(session.key().unwrap().departure, "MIA");
    }

    #[test]
    fn route_change_during_zoom_releases_the_indicator() {
        switch_route_at(ZOOM_AT + 100, Phase::Zooming, &[ArtifactKind::ZoomIndicator], 1);
    }

    #[test]
    fn route_change_during_flight_releases_burst_and_plane() {
        switch_route_at(
            FLY_AT + 400,
            Phase::Flying,
            &[ArtifactKind::TakeoffBurst, ArtifactKind::PlaneGlyph],
            2,
        );
    }

    #[test]
    fn route_change_after_completion_cancels_the_replay_wait() {
        switch_route_at(COMPLETE_AT + 100, Phase::Complete, &[], 1);
    }

    #[test]
    fn same_route_refresh_keeps_the_flight_running() {
        let mut host = RecordingHost::new();
        let mut rng = never_replay();
        let mut session = RouteSession::new(AnimationConfig::default());
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();
        session
            .advance_to(Millis(FLY_AT + 400), &mut host, &mut rng)
            .unwrap();
        session
            .on_click(&mut host, Coordinate::new(30.0, -70.0))
            .unwrap();
        assert_eq!(host.surface.live_count(), 3);

        let mut refreshed = jfk_gnd();
        refreshed.flight.price = Some(199.0);
        let ops = host.surface.ops().len();
        session
            .set_route(refreshed, &mut host, &mut rng, Millis(FLY_AT + 400))
            .unwrap();
        assert_eq!(session.phase(), Phase::Flying);
        assert_eq!(host.surface.ops().len(), ops);
        assert_eq!(host.surface.live_count(), 3);
        assert_eq!(session.popup_mode(), Some(PopupMode::Expanded));
        assert_eq!(session.pending_timers(), 2);
        assert_eq!(session.displayed_arc().len(), 101);
        assert_eq!(session.request().unwrap().flight.price, Some(199.0));
        assert_eq!(host.surface.subscription_count(), 1);
        assert!(
            !session
                .trace()
                .payloads()
                .any(|e| matches!(e, TraceEvent::TornDown { .. }))
        );

        session
            .advance_to(Millis(FLY_AT + 100 * 80), &mut host, &mut rng)
            .unwrap();
        assert_eq!(
            host.surface.live_of_kind(ArtifactKind::ArrivalBurst).len(),
            1
        );
    }

    #[test]
    fn teardown_twice_is_a_no_op() {
        let mut host = RecordingHost::new();
        let mut rng = never_replay();
        let mut session = RouteSession::new(AnimationConfig::default());
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();
        session
            .advance_to(Millis(FLY_AT + 400), &mut host, &mut rng)
            .unwrap();
        session
            .on_click(&mut host, Coordinate::new(30.0, -70.0))
            .unwrap();

        let first = session.teardown_all(&mut host, Millis(FLY_AT + 400));
        // Plane, takeoff burst (still within its 1s) and the popup.
        assert_eq!(
            first,
            Teardown {
                timers: 2,
                artifacts: 3
            }
        );
        let ops = host.surface.ops().len();
        let second = session.teardown_all(&mut host, Millis(FLY_AT + 400));
        assert!(second.is_empty());
        assert_eq!(host.surface.ops().len(), ops);
        assert_eq!(host.surface.unknown_count(), 0);
        assert_eq!(host.surface.subscription_count(), 0);
        assert_eq!(session.phase(), Phase::Flying);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut host = RecordingHost::new();
        let mut rng = never_replay();
        let mut session = RouteSession::new(AnimationConfig::default());
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();
        session
            .advance_to(Millis(ZOOM_AT), &mut host, &mut rng)
            .unwrap();
        assert_eq!(session.dispose(&mut host, Millis(ZOOM_AT)).artifacts, 1);
        assert!(session.dispose(&mut host, Millis(ZOOM_AT)).is_empty());
        assert!(session.is_disposed());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.next_due(), None);
        assert_eq!(host.surface.removed_count(), 1);
    }

    #[test]
    fn invalid_coordinates_leave_the_session_empty() {
        let mut host = RecordingHost::new();
        let mut rng = never_replay();
        let mut session = RouteSession::new(AnimationConfig::default());
        let mut request = jfk_gnd();
        request.arrival.latitude = None;

        let err = session
            .set_route(request, &mut host, &mut rng, Millis(0))
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::Geometry(GeometryError::InvalidGeometryInput { .. })
        ));
        assert!(err.to_string().contains("GND"));
        assert_eq!(session.key(), None);
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(host.surface.subscription_count(), 0);
    }

    #[test]
    fn acquisition_failure_is_reported_and_cleaned_up() {
        let mut host = RecordingHost::new();
        host.surface.fail_kind(ArtifactKind::PlaneGlyph);
        let mut rng = never_replay();
        let mut session = RouteSession::new(AnimationConfig::default());
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();

        let err = session
            .advance_to(Millis(FLY_AT), &mut host, &mut rng)
            .unwrap_err();
        assert!(matches!(err, RouteError::AnimationResource(_)));
        assert_eq!(session.phase(), Phase::Drawing);
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(session.live_artifacts(), 0);
        assert_eq!(host.surface.live_count(), 0);
        assert!(!session.is_subscribed());
        assert!(
            session
                .trace()
                .payloads()
                .any(|e| matches!(e, TraceEvent::TransitionFailed { .. }))
        );

        // The session can present a route again once the surface recovers.
        // The script is spent, so this run's jitter is 990ms.
        host.surface.clear_failures();
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(FLY_AT))
            .unwrap();
        session
            .advance_to(Millis(FLY_AT + COMPLETE_AT + 1000), &mut host, &mut rng)
            .unwrap();
        assert_eq!(session.phase(), Phase::Complete);
    }

    #[test]
    fn forced_replay_repeats_the_flight() {
        let config = AnimationConfig {
            replay_probability: 1.0,
            ..AnimationConfig::default()
        };
        let mut host = RecordingHost::new();
        let mut rng = never_replay();
        let mut session = RouteSession::new(config);
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();
        session
            .advance_to(Millis(COMPLETE_AT + 8000), &mut host, &mut rng)
            .unwrap();
        assert_eq!(session.phase(), Phase::Flying);
        assert!(session.is_replaying());

        // Land, wait, and fly again.
        let replay_complete = COMPLETE_AT + 8000 + 100 * 80;
        session
            .advance_to(Millis(replay_complete + 8000 + 80), &mut host, &mut rng)
            .unwrap();
        assert_eq!(session.phase(), Phase::Flying);
        assert_eq!(
            phases(&session),
            vec![
                Phase::Zooming,
                Phase::Drawing,
                Phase::Flying,
                Phase::Complete,
                Phase::Flying,
                Phase::Complete,
                Phase::Flying,
            ]
        );
    }

    #[test]
    fn popup_survives_phase_changes_and_needs_a_subscription() {
        let mut host = RecordingHost::new();
        let mut rng = never_replay();
        let mut session = RouteSession::new(AnimationConfig::default());
        session
            .set_route(jfk_gnd(), &mut host, &mut rng, Millis(0))
            .unwrap();
        session
            .on_hover(&mut host, Coordinate::new(30.0, -70.0))
            .unwrap();
        assert_eq!(session.popup_mode(), Some(PopupMode::Compact));

        session
            .advance_to(Millis(DRAW_AT), &mut host, &mut rng)
            .unwrap();
        assert_eq!(session.popup_mode(), Some(PopupMode::Compact));
        assert_eq!(
            host.surface.live_of_kind(ArtifactKind::DetailPopup).len(),
            1
        );
        assert!(session.on_hover_end(&mut host));

        session.teardown_all(&mut host, Millis(DRAW_AT));
        session
            .on_click(&mut host, Coordinate::new(30.0, -70.0))
            .unwrap();
        assert_eq!(session.popup_mode(), None);
        assert_eq!(host.surface.live_count(), 0);
    }

    #[test]
    fn connecting_routes_use_the_flatter_bend() {
        let mut host = RecordingHost::new();
        let mut rng = never_replay();
        let mut direct = RouteSession::new(AnimationConfig::default());
        let mut connecting = RouteSession::new(AnimationConfig::default());
        let mut request = jfk_gnd();
        direct
            .set_route(request.clone(), &mut host, &mut rng, Millis(0))
            .unwrap();
        request.flight.route_kind = RouteKind::Connecting;
        connecting
            .set_route(request, &mut host, &mut rng, Millis(0))
            .unwrap();

        let mid = |s: &RouteSession| s.arc().unwrap().point(50).unwrap();
        let straight_lng = (-73.7781 + -61.7863) / 2.0;
        let direct_offset = (mid(&direct).lng - straight_lng).abs();
        let connecting_offset = (mid(&connecting).lng - straight_lng).abs();
        assert!(connecting_offset < direct_offset);
        assert!(((connecting_offset / direct_offset) - 0.75).abs() < 1e-9);
    }
}
