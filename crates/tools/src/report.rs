use routes::{Itinerary, RouteError, RouteRequest, RouteSession, SlotId, TraceEvent};
use runtime::event_bus::Event;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Routes and itineraries to present, in slot order.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub routes: Vec<RouteRequest>,
    pub itineraries: Vec<Itinerary>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    Routes(Vec<RouteRequest>),
    Full(Scenario),
}

impl Scenario {
    /// Accepts either a bare array of routes or `{ "routes": [...], "itineraries": [...] }`.
    pub fn from_json_str(s: &str) -> Result<Self, String> {
        let file: ScenarioFile =
            serde_json::from_str(s).map_err(|e| format!("parse scenario: {e}"))?;
        Ok(match file {
            ScenarioFile::Routes(routes) => Scenario {
                routes,
                itineraries: Vec::new(),
            },
            ScenarioFile::Full(scenario) => scenario,
        })
    }
}

/// One JSON line of simulation output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceLine {
    pub at_ms: u64,
    pub slot: u64,
    pub event: &'static str,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub detail: Value,
}

impl TraceLine {
    pub fn from_event(slot: SlotId, event: &Event<TraceEvent>) -> Self {
        let (name, detail) = match &event.payload {
            TraceEvent::Armed { delay_ms } => ("armed", json!({ "delay_ms": delay_ms })),
            TraceEvent::PhaseEntered {
                phase,
                pending,
                live,
            } => (
                "phase",
                json!({ "phase": phase.as_str(), "pending": pending, "live": live }),
            ),
            TraceEvent::Acquired(kind) => ("acquired", json!({ "kind": kind.as_str() })),
            TraceEvent::ArcFallback { points } => ("arc-fallback", json!({ "points": points })),
            TraceEvent::Landed => ("landed", Value::Null),
            TraceEvent::ReplayDrawn { replay } => ("replay-drawn", json!({ "replay": replay })),
            TraceEvent::TransitionFailed { step, reason } => (
                "transition-failed",
                json!({ "step": format!("{step:?}"), "reason": reason }),
            ),
            TraceEvent::TornDown { timers, artifacts } => (
                "torn-down",
                json!({ "timers": timers, "artifacts": artifacts }),
            ),
        };
        Self {
            at_ms: event.at.0,
            slot: slot.0,
            event: name,
            detail,
        }
    }

    pub fn from_error(at_ms: u64, slot: SlotId, err: &RouteError) -> Self {
        Self {
            at_ms,
            slot: slot.0,
            event: "error",
            detail: json!({ "reason": err.to_string() }),
        }
    }
}

/// Final state of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub slot: u64,
    pub route: String,
    pub phase: &'static str,
    pub displayed_points: usize,
    pub pending_timers: usize,
    pub live_artifacts: usize,
    pub replaying: bool,
}

impl SessionSummary {
    pub fn new(slot: SlotId, session: &RouteSession) -> Self {
        Self {
            slot: slot.0,
            route: session
                .key()
                .map(ToString::to_string)
                .unwrap_or_default(),
            phase: session.phase().as_str(),
            displayed_points: session.displayed_arc().len(),
            pending_timers: session.pending_timers(),
            live_artifacts: session.live_artifacts(),
            replaying: session.is_replaying(),
        }
    }
}
