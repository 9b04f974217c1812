use foundation::arena::Arena;
use foundation::handles::Handle;
use foundation::math::Coordinate;
use tracing::{trace, warn};

use crate::artifact::{Artifact, ArtifactKind};
use crate::surface::{DrawingSurface, SurfaceError, SurfaceId};

/// Opaque handle to an artifact owned by one [`ResourceLifecycle`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq)]
struct LiveArtifact {
    kind: ArtifactKind,
    surface_id: SurfaceId,
}

/// Scoped ownership of transient artifacts on a shared drawing surface.
///
/// Contract:
/// - Every handle maps to exactly one surface artifact.
/// - `release` of an unknown or already-released handle is a no-op.
/// - `release_all` removes everything in ascending handle order and is
///   idempotent.
#[derive(Debug, Default)]
pub struct ResourceLifecycle {
    live: Arena<LiveArtifact>,
}

impl ResourceLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: ArtifactHandle) -> bool {
        self.live.contains(handle.0)
    }

    pub fn kind(&self, handle: ArtifactHandle) -> Option<ArtifactKind> {
        self.live.get(handle.0).map(|a| a.kind)
    }

    /// Kinds of all live artifacts, in handle order.
    pub fn live_kinds(&self) -> Vec<ArtifactKind> {
        self.live.iter().map(|(_, a)| a.kind).collect()
    }

    pub fn acquire(
        &mut self,
        surface: &mut dyn DrawingSurface,
        artifact: &Artifact,
    ) -> Result<ArtifactHandle, SurfaceError> {
        let surface_id = surface.add(artifact).inspect_err(|err| {
            warn!(kind = %artifact.kind, error = %err, "artifact acquisition failed");
        })?;
        let handle = ArtifactHandle(self.live.insert(LiveArtifact {
            kind: artifact.kind,
            surface_id,
        }));
        trace!(kind = %artifact.kind, handle = %handle.0, "artifact acquired");
        Ok(handle)
    }

    /// Moves a live artifact. Returns `false` for stale handles.
    pub fn update(
        &mut self,
        surface: &mut dyn DrawingSurface,
        handle: ArtifactHandle,
        position: Coordinate,
        rotation_deg: Option<f64>,
    ) -> bool {
        let Some(live) = self.live.get(handle.0) else {
            return false;
        };
        surface.update(live.surface_id, position, rotation_deg);
        true
    }

    /// Returns `true` if the handle was live.
    pub fn release(&mut self, surface: &mut dyn DrawingSurface, handle: ArtifactHandle) -> bool {
        let Some(live) = self.live.remove(handle.0) else {
            return false;
        };
        surface.remove(live.surface_id);
        trace!(kind = %live.kind, handle = %handle.0, "artifact released");
        true
    }

    /// Releases the handle in `slot`, if any, and clears the slot.
    pub fn release_slot(
        &mut self,
        surface: &mut dyn DrawingSurface,
        slot: &mut Option<ArtifactHandle>,
    ) -> bool {
        match slot.take() {
            Some(handle) => self.release(surface, handle),
            None => false,
        }
    }

    /// Releases every live artifact; returns how many were removed.
    pub fn release_all(&mut self, surface: &mut dyn DrawingSurface) -> usize {
        let drained = self.live.drain();
        for (_, live) in &drained {
            surface.remove(live.surface_id);
        }
        drained.len()
    }
}
