use foundation::math::Coordinate;
use scene::{
    Artifact, DrawingSurface, InteractionSource, RecordingSurface, SubscriptionId, SurfaceError,
    SurfaceId,
};

use crate::host::{RenderFrame, RouteHost};
use crate::phase::Phase;
use crate::route::RouteKey;
use crate::scheduler::Glyph;

/// Owned copy of a [`RenderFrame`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub route: RouteKey,
    pub phase: Phase,
    pub prefix_len: usize,
    pub glyph: Option<Glyph>,
}

/// [`RecordingSurface`] that also keeps every delivered render frame.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub surface: RecordingSurface,
    frames: Vec<FrameRecord>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn last_frame(&self, route: &RouteKey) -> Option<&FrameRecord> {
        self.frames.iter().rev().find(|f| &f.route == route)
    }
}

impl DrawingSurface for RecordingHost {
    fn add(&mut self, artifact: &Artifact) -> Result<SurfaceId, SurfaceError> {
        self.surface.add(artifact)
    }

    fn update(&mut self, id: SurfaceId, position: Coordinate, rotation_deg: Option<f64>) {
        self.surface.update(id, position, rotation_deg);
    }

    fn remove(&mut self, id: SurfaceId) {
        self.surface.remove(id);
    }
}

impl InteractionSource for RecordingHost {
    fn subscribe(&mut self, owner: &str) -> SubscriptionId {
        self.surface.subscribe(owner)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.surface.unsubscribe(id);
    }
}

impl RouteHost for RecordingHost {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        self.frames.push(FrameRecord {
            route: frame.route.clone(),
            phase: frame.phase,
            prefix_len: frame.arc_prefix.len(),
            glyph: frame.glyph,
        });
    }
}
