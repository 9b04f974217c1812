use scene::{ArtifactKind, ArtifactStyle};

use crate::route::RouteKind;

/// Colors and marker sizes for one route kind.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RouteSymbology {
    pub path_color: [f32; 4],
    pub accent_color: [f32; 4],
    pub glyph_size_px: f32,
}

impl RouteSymbology {
    pub const fn new(path_color: [f32; 4], accent_color: [f32; 4], glyph_size_px: f32) -> Self {
        Self {
            path_color,
            accent_color,
            glyph_size_px,
        }
    }

    pub fn for_kind(kind: RouteKind) -> Self {
        match kind {
            RouteKind::Direct => Self::new([0.23, 0.51, 0.96, 1.0], [0.06, 0.73, 0.51, 1.0], 24.0),
            RouteKind::Connecting => {
                Self::new([0.96, 0.62, 0.04, 1.0], [0.94, 0.27, 0.27, 1.0], 20.0)
            }
        }
    }

    pub fn style(&self, kind: ArtifactKind) -> ArtifactStyle {
        match kind {
            ArtifactKind::ZoomIndicator => ArtifactStyle::new(self.path_color, 40.0, true),
            ArtifactKind::DrawingPulse => ArtifactStyle::new(self.path_color, 10.0, true),
            ArtifactKind::CompletionMark => ArtifactStyle::new(self.accent_color, 18.0, false),
            ArtifactKind::TakeoffBurst | ArtifactKind::ArrivalBurst => {
                ArtifactStyle::new(self.accent_color, 32.0, true)
            }
            ArtifactKind::PlaneGlyph => {
                ArtifactStyle::new(self.path_color, self.glyph_size_px, false)
            }
            ArtifactKind::DetailPopup => ArtifactStyle::default(),
        }
    }
}

impl Default for RouteSymbology {
    fn default() -> Self {
        Self::for_kind(RouteKind::Direct)
    }
}
