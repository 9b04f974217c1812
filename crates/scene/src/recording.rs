use std::collections::{BTreeMap, BTreeSet};

use foundation::math::Coordinate;

use crate::artifact::{Artifact, ArtifactKind};
use crate::surface::{DrawingSurface, InteractionSource, SubscriptionId, SurfaceError, SurfaceId};

/// One call observed by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Added { id: SurfaceId, kind: ArtifactKind },
    Updated { id: SurfaceId },
    Removed { id: SurfaceId },
    /// `remove`/`update` for an id that is not live.
    Unknown { id: SurfaceId },
}

/// In-memory drawing surface.
///
/// Keeps live artifacts in a `BTreeMap` so snapshots have stable ordering,
/// logs every call, and can be told to refuse artifacts for failure testing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    next_subscription: u64,
    live: BTreeMap<SurfaceId, Artifact>,
    ops: Vec<SurfaceOp>,
    subscriptions: BTreeMap<SubscriptionId, String>,
    failing_kinds: BTreeSet<ArtifactKind>,
    unavailable: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses every future artifact of `kind`.
    pub fn fail_kind(&mut self, kind: ArtifactKind) {
        self.failing_kinds.insert(kind);
    }

    pub fn clear_failures(&mut self) {
        self.failing_kinds.clear();
        self.unavailable = false;
    }

    /// Simulates a detached map: every `add` fails with `Unavailable`.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live(&self) -> impl Iterator<Item = (SurfaceId, &Artifact)> + '_ {
        self.live.iter().map(|(id, a)| (*id, a))
    }

    pub fn live_of_kind(&self, kind: ArtifactKind) -> Vec<&Artifact> {
        self.live.values().filter(|a| a.kind == kind).collect()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn removed_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Removed { .. }))
            .count()
    }

    /// Calls that targeted ids which were not live; always zero for a
    /// well-behaved owner.
    pub fn unknown_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Unknown { .. }))
            .count()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn subscribers(&self) -> impl Iterator<Item = &str> + '_ {
        self.subscriptions.values().map(String::as_str)
    }
}

impl DrawingSurface for RecordingSurface {
    fn add(&mut self, artifact: &Artifact) -> Result<SurfaceId, SurfaceError> {
        if self.unavailable {
            return Err(SurfaceError::Unavailable);
        }
        if self.failing_kinds.contains(&artifact.kind) {
            return Err(SurfaceError::Rejected {
                kind: artifact.kind,
                reason: "configured to fail".to_string(),
            });
        }
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, artifact.clone());
        self.ops.push(SurfaceOp::Added {
            id,
            kind: artifact.kind,
        });
        Ok(id)
    }

    fn update(&mut self, id: SurfaceId, position: Coordinate, rotation_deg: Option<f64>) {
        match self.live.get_mut(&id) {
            Some(artifact) => {
                artifact.position = position;
                if rotation_deg.is_some() {
                    artifact.rotation_deg = rotation_deg;
                }
                self.ops.push(SurfaceOp::Updated { id });
            }
            None => self.ops.push(SurfaceOp::Unknown { id }),
        }
    }

    fn remove(&mut self, id: SurfaceId) {
        if self.live.remove(&id).is_some() {
            self.ops.push(SurfaceOp::Removed { id });
        } else {
            self.ops.push(SurfaceOp::Unknown { id });
        }
    }
}

impl InteractionSource for RecordingSurface {
    fn subscribe(&mut self, owner: &str) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(id, owner.to_string());
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.remove(&id);
    }
}
