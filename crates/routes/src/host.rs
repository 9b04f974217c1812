use foundation::math::Coordinate;
use scene::{DrawingSurface, InteractionSource};

use crate::phase::Phase;
use crate::route::RouteKey;
use crate::scheduler::Glyph;

/// What a host needs to draw one route after a state change.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame<'a> {
    pub route: &'a RouteKey,
    pub phase: Phase,
    /// Revealed prefix of the arc.
    pub arc_prefix: &'a [Coordinate],
    pub glyph: Option<Glyph>,
}

/// Map surface a route session draws on and listens to.
pub trait RouteHost: DrawingSurface + InteractionSource {
    fn render(&mut self, _frame: &RenderFrame<'_>) {}
}
