//! Abstract map surface the animation engine draws through.
//!
//! The real marker/polyline/popup primitives live in the UI layer; the engine
//! only sees these traits.

use foundation::math::Coordinate;

use crate::artifact::{Artifact, ArtifactKind};

/// Surface-side identifier of a materialized artifact.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface is not attached (e.g. the map has not been created yet).
    Unavailable,
    /// The surface refused to create this artifact.
    Rejected { kind: ArtifactKind, reason: String },
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::Unavailable => write!(f, "drawing surface unavailable"),
            SurfaceError::Rejected { kind, reason } => {
                write!(f, "surface rejected {kind}: {reason}")
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

pub trait DrawingSurface {
    fn add(&mut self, artifact: &Artifact) -> Result<SurfaceId, SurfaceError>;

    fn update(&mut self, id: SurfaceId, position: Coordinate, rotation_deg: Option<f64>);

    /// Called at most once per id by [`crate::ResourceLifecycle`].
    fn remove(&mut self, id: SurfaceId);
}

/// Pointer-event source over a rendered route.
///
/// Owners subscribe when they start listening and must unsubscribe on
/// teardown; the UI forwards hover/click events only for live subscriptions.
pub trait InteractionSource {
    fn subscribe(&mut self, owner: &str) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);
}
