use foundation::math::GeometryError;
use scene::SurfaceError;

use crate::board::SlotId;

/// Failure of one route session. Never fatal to sibling sessions.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteError {
    /// The route's coordinates are unusable; the route should be left off the map.
    Geometry(GeometryError),
    /// An artifact could not be created; the transition was aborted and the
    /// session cleaned up.
    AnimationResource(SurfaceError),
    UnknownSlot(SlotId),
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::Geometry(err) => write!(f, "route geometry: {err}"),
            RouteError::AnimationResource(err) => write!(f, "animation resource: {err}"),
            RouteError::UnknownSlot(slot) => write!(f, "no route presented in slot {}", slot.0),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Geometry(err) => Some(err),
            RouteError::AnimationResource(err) => Some(err),
            RouteError::UnknownSlot(_) => None,
        }
    }
}

impl From<GeometryError> for RouteError {
    fn from(err: GeometryError) -> Self {
        RouteError::Geometry(err)
    }
}

impl From<SurfaceError> for RouteError {
    fn from(err: SurfaceError) -> Self {
        RouteError::AnimationResource(err)
    }
}
