//! Per-route phase state machine.
//!
//! ```text
//! Idle --jitter--> Zooming --zoom_ms--> Drawing --reveal + pause--> Flying
//!   --glyph lands + landing pause--> Complete --replay wait, p--> Flying
//! ```
//!
//! Ordering contract:
//! - Before any phase begins, every pending timer of the previous phase is
//!   cancelled and every phase artifact is released.
//! - A phase is only entered once all of its artifacts were acquired; on
//!   failure the scheduler stays in the last entered phase.

use foundation::math::{Arc, Coordinate};
use foundation::time::Millis;
use runtime::event_bus::EventBus;
use runtime::random::RandomSource;
use runtime::timer::{Fired, TimerQueue};
use scene::{Artifact, ArtifactHandle, ArtifactKind, DrawingSurface, ResourceLifecycle, SurfaceError};
use tracing::{debug, trace, warn};

use crate::config::AnimationConfig;
use crate::phase::{Phase, Step, TraceEvent};
use crate::symbology::RouteSymbology;

/// Position and heading of the moving plane glyph.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    pub position: Coordinate,
    pub bearing: f64,
}

/// Everything a step handler may touch, borrowed from the owning session.
pub struct StepContext<'a> {
    /// Due time of the step being handled.
    pub now: Millis,
    pub arc: &'a mut Arc,
    pub departure: Coordinate,
    pub arrival: Coordinate,
    pub artifacts: &'a mut ResourceLifecycle,
    pub surface: &'a mut dyn DrawingSurface,
    pub rng: &'a mut dyn RandomSource,
    pub symbology: RouteSymbology,
    pub trace: &'a mut EventBus<TraceEvent>,
}

impl StepContext<'_> {
    fn acquire(
        &mut self,
        kind: ArtifactKind,
        at: Coordinate,
        rotation_deg: Option<f64>,
    ) -> Result<ArtifactHandle, SurfaceError> {
        let mut artifact = Artifact::new(kind, at, self.symbology.style(kind));
        if let Some(rotation) = rotation_deg {
            artifact = artifact.rotated(rotation);
        }
        let handle = self.artifacts.acquire(&mut *self.surface, &artifact)?;
        self.trace.emit(self.now, TraceEvent::Acquired(kind));
        Ok(handle)
    }

    fn release(&mut self, slot: &mut Option<ArtifactHandle>) {
        self.artifacts.release_slot(&mut *self.surface, slot);
    }

    fn point(&self, index: usize) -> Coordinate {
        self.arc.point(index).unwrap_or(self.arrival)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PhaseArtifacts {
    zoom: Option<ArtifactHandle>,
    pulse: Option<ArtifactHandle>,
    mark: Option<ArtifactHandle>,
    takeoff: Option<ArtifactHandle>,
    plane: Option<ArtifactHandle>,
    burst: Option<ArtifactHandle>,
}

#[derive(Debug)]
pub struct PhaseScheduler {
    config: AnimationConfig,
    phase: Phase,
    timer: TimerQueue<Step>,
    /// Length of the displayed arc prefix.
    revealed: usize,
    glyph_index: usize,
    glyph: Option<Glyph>,
    replaying: bool,
    slots: PhaseArtifacts,
}

impl PhaseScheduler {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            timer: TimerQueue::new(),
            revealed: 0,
            glyph_index: 0,
            glyph: None,
            replaying: false,
            slots: PhaseArtifacts::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn glyph(&self) -> Option<Glyph> {
        self.glyph
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn pending(&self) -> usize {
        self.timer.pending()
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.timer.next_due()
    }

    pub fn pop_due(&mut self, now: Millis) -> Option<Fired<Step>> {
        self.timer.pop_due(now)
    }

    /// Starts a fresh run from `Idle`; the first step fires after a jittered delay.
    pub fn arm(&mut self, now: Millis, rng: &mut dyn RandomSource, trace: &mut EventBus<TraceEvent>) {
        self.reset();
        let [lo, hi] = self.config.zoom_jitter_ms;
        let delay_ms = rng.uniform_ms(lo, hi);
        self.timer.schedule_after(now, delay_ms, Step::BeginZoom);
        trace.emit(now, TraceEvent::Armed { delay_ms });
    }

    /// Cancels all timers and forgets the phase artifacts without touching the
    /// phase. The owner releases the artifacts themselves.
    pub fn cancel_all(&mut self) -> usize {
        self.slots = PhaseArtifacts::default();
        self.glyph = None;
        self.timer.cancel_all()
    }

    /// Hard reset back to `Idle`; returns the number of cancelled timers.
    pub fn reset(&mut self) -> usize {
        let cancelled = self.cancel_all();
        self.phase = Phase::Idle;
        self.revealed = 0;
        self.glyph_index = 0;
        self.replaying = false;
        cancelled
    }

    pub fn handle(&mut self, step: Step, ctx: &mut StepContext<'_>) -> Result<(), SurfaceError> {
        trace!(?step, phase = %self.phase, now = ctx.now.0, "step");
        match step {
            Step::BeginZoom => self.begin_zoom(ctx),
            Step::EndZoom => self.begin_drawing(ctx),
            Step::RevealTick => self.reveal_tick(ctx),
            Step::EndCompletionPause => {
                let boundary = self.close_phase(ctx);
                self.begin_flight(ctx, false, boundary)
            }
            Step::EndTakeoffBurst => {
                let mut slot = self.slots.takeoff.take();
                ctx.release(&mut slot);
                Ok(())
            }
            Step::FlyTick => self.fly_tick(ctx),
            Step::EndLanding => {
                let boundary = self.close_phase(ctx);
                self.complete(ctx, boundary);
                Ok(())
            }
            Step::ReplayCheck => self.replay_check(ctx),
        }
    }

    /// Cancels pending timers and releases all phase artifacts; returns the
    /// `(pending, live)` counts left afterwards.
    fn close_phase(&mut self, ctx: &mut StepContext<'_>) -> (usize, usize) {
        self.cancel_all();
        ctx.artifacts.release_all(&mut *ctx.surface);
        (self.timer.pending(), ctx.artifacts.live_count())
    }

    fn enter(&mut self, phase: Phase, ctx: &mut StepContext<'_>, boundary: (usize, usize)) {
        let (pending, live) = boundary;
        debug!(from = %self.phase, to = %phase, now = ctx.now.0, "phase entered");
        self.phase = phase;
        ctx.trace.emit(
            ctx.now,
            TraceEvent::PhaseEntered {
                phase,
                pending,
                live,
            },
        );
    }

    fn schedule(&mut self, now: Millis, delay_ms: u64, step: Step) {
        self.timer.schedule_after(now, delay_ms, step);
    }

    fn begin_zoom(&mut self, ctx: &mut StepContext<'_>) -> Result<(), SurfaceError> {
        let boundary = self.close_phase(ctx);
        self.slots.zoom = Some(ctx.acquire(ArtifactKind::ZoomIndicator, ctx.departure, None)?);
        self.enter(Phase::Zooming, ctx, boundary);
        self.schedule(ctx.now, self.config.zoom_ms, Step::EndZoom);
        Ok(())
    }

    fn begin_drawing(&mut self, ctx: &mut StepContext<'_>) -> Result<(), SurfaceError> {
        let boundary = self.close_phase(ctx);
        let points = ctx.arc.len();
        if let Some(err) = ctx.arc.ensure_drawable(ctx.departure, ctx.arrival) {
            warn!(error = %err, "substituting straight segment for short arc");
            ctx.trace.emit(ctx.now, TraceEvent::ArcFallback { points });
        }
        let start = ctx.point(0);
        self.slots.pulse = Some(ctx.acquire(ArtifactKind::DrawingPulse, start, None)?);
        self.revealed = 1;
        self.enter(Phase::Drawing, ctx, boundary);
        self.schedule(ctx.now, self.config.draw_preroll_ms, Step::RevealTick);
        Ok(())
    }

    fn reveal_tick(&mut self, ctx: &mut StepContext<'_>) -> Result<(), SurfaceError> {
        let n = ctx.arc.len();
        let step = self.config.reveal_step(n);
        let frontier = (self.revealed.max(1) - 1 + step).min(n - 1);
        self.revealed = frontier + 1;

        if let Some(pulse) = self.slots.pulse {
            let at = ctx.point(frontier);
            ctx.artifacts.update(&mut *ctx.surface, pulse, at, None);
        }

        if self.revealed < n {
            self.schedule(ctx.now, self.config.draw_tick_ms, Step::RevealTick);
            return Ok(());
        }

        let mut pulse = self.slots.pulse.take();
        ctx.release(&mut pulse);
        self.slots.mark = Some(ctx.acquire(ArtifactKind::CompletionMark, ctx.arrival, None)?);
        self.schedule(ctx.now, self.config.completion_pause_ms, Step::EndCompletionPause);
        Ok(())
    }

    fn begin_flight(
        &mut self,
        ctx: &mut StepContext<'_>,
        replay: bool,
        boundary: (usize, usize),
    ) -> Result<(), SurfaceError> {
        let start = ctx.point(0);
        let bearing = ctx.arc.heading_at(0).unwrap_or(0.0);

        // Replays only bring back the plane glyph.
        if !replay {
            self.slots.takeoff = Some(ctx.acquire(ArtifactKind::TakeoffBurst, ctx.departure, None)?);
        }
        self.slots.plane = Some(ctx.acquire(ArtifactKind::PlaneGlyph, start, Some(bearing))?);

        self.glyph_index = 0;
        self.glyph = Some(Glyph {
            position: start,
            bearing,
        });
        self.replaying = replay;
        self.revealed = ctx.arc.len();
        self.enter(Phase::Flying, ctx, boundary);

        if !replay {
            self.schedule(ctx.now, self.config.takeoff_burst_ms, Step::EndTakeoffBurst);
        }
        self.schedule(ctx.now, self.config.fly_tick_ms, Step::FlyTick);
        Ok(())
    }

    fn fly_tick(&mut self, ctx: &mut StepContext<'_>) -> Result<(), SurfaceError> {
        let last = ctx.arc.len().saturating_sub(1);
        self.glyph_index = (self.glyph_index + 1).min(last);
        let position = ctx.point(self.glyph_index);
        let bearing = ctx.arc.heading_at(self.glyph_index).unwrap_or(0.0);

        if self.glyph_index < last {
            if let Some(plane) = self.slots.plane {
                ctx.artifacts.update(&mut *ctx.surface, plane, position, Some(bearing));
            }
            self.glyph = Some(Glyph { position, bearing });
            self.schedule(ctx.now, self.config.fly_tick_ms, Step::FlyTick);
            return Ok(());
        }

        let mut plane = self.slots.plane.take();
        ctx.release(&mut plane);
        let mut takeoff = self.slots.takeoff.take();
        ctx.release(&mut takeoff);
        self.glyph = None;
        ctx.trace.emit(ctx.now, TraceEvent::Landed);

        if self.replaying {
            let boundary = self.close_phase(ctx);
            self.complete(ctx, boundary);
            return Ok(());
        }

        self.slots.burst = Some(ctx.acquire(ArtifactKind::ArrivalBurst, ctx.arrival, None)?);
        self.schedule(ctx.now, self.config.landing_pause_ms, Step::EndLanding);
        Ok(())
    }

    fn complete(&mut self, ctx: &mut StepContext<'_>, boundary: (usize, usize)) {
        self.enter(Phase::Complete, ctx, boundary);
        self.schedule(ctx.now, self.config.replay_wait_ms, Step::ReplayCheck);
    }

    fn replay_check(&mut self, ctx: &mut StepContext<'_>) -> Result<(), SurfaceError> {
        let replay = ctx.rng.bernoulli(self.config.replay_probability);
        ctx.trace.emit(ctx.now, TraceEvent::ReplayDrawn { replay });
        if !replay {
            return Ok(());
        }
        let boundary = self.close_phase(ctx);
        self.begin_flight(ctx, true, boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::{PhaseScheduler, StepContext};
    use crate::config::AnimationConfig;
    use crate::phase::{Phase, Step, TraceEvent};
    use crate::symbology::RouteSymbology;
    use foundation::math::{Arc, Coordinate, compute_arc};
    use foundation::time::Millis;
    use runtime::event_bus::EventBus;
    use runtime::random::SequenceRandom;
    use scene::{ArtifactKind, RecordingSurface, ResourceLifecycle};

    const DEP: Coordinate = Coordinate::new(40.6413, -73.7781);
    const ARR: Coordinate = Coordinate::new(12.0042, -61.7863);

    struct Rig {
        scheduler: PhaseScheduler,
        arc: Arc,
        artifacts: ResourceLifecycle,
        surface: RecordingSurface,
        rng: SequenceRandom,
        trace: EventBus<TraceEvent>,
    }

    impl Rig {
        fn new(arc: Arc, rng: SequenceRandom) -> Self {
            Self {
                scheduler: PhaseScheduler::new(AnimationConfig::default()),
                arc,
                artifacts: ResourceLifecycle::new(),
                surface: RecordingSurface::new(),
                rng,
                trace: EventBus::new(),
            }
        }

        fn arm(&mut self) {
            self.scheduler.arm(Millis(0), &mut self.rng, &mut self.trace);
        }

        /// Fires every step due at or before `until`.
        fn run(&mut self, until: u64) {
            while let Some(fired) = self.scheduler.pop_due(Millis(until)) {
                let mut ctx = StepContext {
                    now: fired.due,
                    arc: &mut self.arc,
                    departure: DEP,
                    arrival: ARR,
                    artifacts: &mut self.artifacts,
                    surface: &mut self.surface,
                    rng: &mut self.rng,
                    symbology: RouteSymbology::default(),
                    trace: &mut self.trace,
                };
                self.scheduler.handle(fired.payload, &mut ctx).unwrap();
            }
        }

        fn phases(&self) -> Vec<Phase> {
            self.trace
                .payloads()
                .filter_map(|e| match e {
                    TraceEvent::PhaseEntered { phase, .. } => Some(*phase),
                    _ => None,
                })
                .collect()
        }
    }

    fn full_arc() -> Arc {
        compute_arc(DEP, ARR, 0.2).unwrap()
    }

    #[test]
    fn jitter_uses_the_injected_source() {
        let mut rig = Rig::new(full_arc(), SequenceRandom::new([0.5], 0.9));
        rig.arm();
        assert_eq!(rig.scheduler.next_due(), Some(Millis(1000)));
        assert_eq!(rig.scheduler.phase(), Phase::Idle);
        rig.run(999);
        assert_eq!(rig.scheduler.phase(), Phase::Idle);
        rig.run(1000);
        assert_eq!(rig.scheduler.phase(), Phase::Zooming);
    }

    #[test]
    fn timeline_matches_phase_durations() {
        // Jitter 500ms, then never replay.
        let mut rig = Rig::new(full_arc(), SequenceRandom::new([0.0], 0.99));
        rig.arm();

        rig.run(500);
        assert_eq!(rig.scheduler.phase(), Phase::Zooming);
        assert_eq!(rig.artifacts.live_kinds(), vec![ArtifactKind::ZoomIndicator]);

        rig.run(3000);
        assert_eq!(rig.scheduler.phase(), Phase::Drawing);
        assert_eq!(rig.scheduler.revealed(), 1);
        assert_eq!(rig.artifacts.live_kinds(), vec![ArtifactKind::DrawingPulse]);

        // Pre-roll 300ms, then 100 ticks of 16ms reveal the remaining 100 points.
        rig.run(3300);
        assert_eq!(rig.scheduler.revealed(), 2);
        rig.run(3300 + 99 * 16);
        assert_eq!(rig.scheduler.revealed(), 101);
        assert_eq!(rig.artifacts.live_kinds(), vec![ArtifactKind::CompletionMark]);
        assert_eq!(rig.scheduler.phase(), Phase::Drawing);

        let revealed_at = 3300 + 99 * 16;
        rig.run(revealed_at + 1499);
        assert_eq!(rig.scheduler.phase(), Phase::Drawing);
        rig.run(revealed_at + 1500);
        assert_eq!(rig.scheduler.phase(), Phase::Flying);
        let glyph = rig.scheduler.glyph().unwrap();
        assert_eq!(glyph.position, DEP);

        // 100 fly ticks of 80ms reach the last point.
        let flying_at = revealed_at + 1500;
        rig.run(flying_at + 99 * 80);
        assert_eq!(rig.scheduler.phase(), Phase::Flying);
        assert!(rig.scheduler.glyph().is_some());
        rig.run(flying_at + 100 * 80);
        assert!(rig.scheduler.glyph().is_none());
        assert_eq!(rig.artifacts.live_kinds(), vec![ArtifactKind::ArrivalBurst]);

        let landed_at = flying_at + 100 * 80;
        rig.run(landed_at + 3000);
        assert_eq!(rig.scheduler.phase(), Phase::Complete);
        assert_eq!(rig.artifacts.live_count(), 0);

        // Replay draw fails: the session stays complete with nothing pending.
        rig.run(landed_at + 3000 + 8000);
        assert_eq!(rig.scheduler.phase(), Phase::Complete);
        assert_eq!(rig.scheduler.pending(), 0);
        assert_eq!(
            rig.phases(),
            vec![Phase::Zooming, Phase::Drawing, Phase::Flying, Phase::Complete]
        );
    }

    #[test]
    fn every_boundary_starts_clean() {
        let mut rig = Rig::new(full_arc(), SequenceRandom::new([0.0], 0.99));
        rig.arm();
        rig.run(60_000);
        for event in rig.trace.payloads() {
            if let TraceEvent::PhaseEntered { pending, live, .. } = event {
                assert_eq!((*pending, *live), (0, 0), "{event:?}");
            }
        }
    }

    #[test]
    fn glyph_bearing_follows_the_next_point() {
        let mut rig = Rig::new(full_arc(), SequenceRandom::new([0.0], 0.99));
        rig.arm();
        let flying_at = 500 + 2500 + 300 + 99 * 16 + 1500;
        rig.run(flying_at + 80 * 10);
        let glyph = rig.scheduler.glyph().unwrap();
        let expected = rig.arc.heading_at(10).unwrap();
        assert_eq!(glyph.position, rig.arc.point(10).unwrap());
        assert!((glyph.bearing - expected).abs() < 1e-12);

        let (_, plane) = rig
            .surface
            .live()
            .find(|(_, a)| a.kind == ArtifactKind::PlaneGlyph)
            .unwrap();
        assert_eq!(plane.rotation_deg, Some(expected));
    }

    #[test]
    fn replay_reenters_flying_with_only_the_glyph() {
        // Jitter draw, then the replay draw succeeds once and fails afterwards.
        let mut rig = Rig::new(full_arc(), SequenceRandom::new([0.0, 0.1], 0.99));
        rig.arm();
        let complete_at = 500 + 2500 + 300 + 99 * 16 + 1500 + 100 * 80 + 3000;
        rig.run(complete_at + 8000);
        assert_eq!(rig.scheduler.phase(), Phase::Flying);
        assert!(rig.scheduler.is_replaying());
        assert_eq!(rig.artifacts.live_kinds(), vec![ArtifactKind::PlaneGlyph]);
        assert_eq!(rig.scheduler.glyph().unwrap().position, DEP);
        assert_eq!(rig.scheduler.revealed(), 101);

        // The replayed flight lands straight into Complete without a burst.
        rig.run(complete_at + 8000 + 100 * 80);
        assert_eq!(rig.scheduler.phase(), Phase::Complete);
        assert_eq!(rig.artifacts.live_count(), 0);
        let bursts = rig
            .trace
            .payloads()
            .filter(|e| matches!(e, TraceEvent::Acquired(ArtifactKind::ArrivalBurst)))
            .count();
        assert_eq!(bursts, 1);
        assert_eq!(rig.scheduler.pending(), 1);
    }

    #[test]
    fn short_arc_is_replaced_by_the_straight_fallback() {
        let mut rig = Rig::new(Arc::from_points(vec![DEP]), SequenceRandom::new([0.0], 0.99));
        rig.arm();
        rig.run(3000);
        assert_eq!(rig.scheduler.phase(), Phase::Drawing);
        assert_eq!(rig.arc.points(), &[DEP, ARR]);
        assert!(
            rig.trace
                .payloads()
                .any(|e| matches!(e, TraceEvent::ArcFallback { points: 1 }))
        );

        // The two-point arc still completes the whole narrative.
        rig.run(60_000);
        assert_eq!(
            rig.phases(),
            vec![Phase::Zooming, Phase::Drawing, Phase::Flying, Phase::Complete]
        );
    }

    #[test]
    fn failed_acquisition_keeps_the_last_entered_phase() {
        let mut rig = Rig::new(full_arc(), SequenceRandom::new([0.0], 0.99));
        rig.surface.fail_kind(ArtifactKind::DrawingPulse);
        rig.arm();
        rig.run(500);

        let fired = rig.scheduler.pop_due(Millis(3000)).unwrap();
        assert_eq!(fired.payload, Step::EndZoom);
        let mut ctx = StepContext {
            now: fired.due,
            arc: &mut rig.arc,
            departure: DEP,
            arrival: ARR,
            artifacts: &mut rig.artifacts,
            surface: &mut rig.surface,
            rng: &mut rig.rng,
            symbology: RouteSymbology::default(),
            trace: &mut rig.trace,
        };
        assert!(rig.scheduler.handle(fired.payload, &mut ctx).is_err());
        assert_eq!(rig.scheduler.phase(), Phase::Zooming);
        assert_eq!(rig.artifacts.live_count(), 0);
        assert_eq!(rig.scheduler.pending(), 0);
    }
}
