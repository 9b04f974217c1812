use scene::ArtifactKind;

/// Visible stage of a route animation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    #[default]
    Idle,
    Zooming,
    Drawing,
    Flying,
    Complete,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Zooming => "zooming",
            Phase::Drawing => "drawing",
            Phase::Flying => "flying",
            Phase::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deferred work a session schedules on its own timer group.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    BeginZoom,
    EndZoom,
    RevealTick,
    EndCompletionPause,
    EndTakeoffBurst,
    FlyTick,
    EndLanding,
    ReplayCheck,
}

/// Deterministic record of what a session did, for tests and reports.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Armed {
        delay_ms: u64,
    },
    /// `pending` and `live` are measured right before the phase begins.
    PhaseEntered {
        phase: Phase,
        pending: usize,
        live: usize,
    },
    Acquired(ArtifactKind),
    ArcFallback {
        points: usize,
    },
    Landed,
    ReplayDrawn {
        replay: bool,
    },
    TransitionFailed {
        step: Step,
        reason: String,
    },
    TornDown {
        timers: usize,
        artifacts: usize,
    },
}
