use foundation::math::Coordinate;

/// Transient visual elements a route animation puts on the map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    /// Pulsing ring over the departure airport while the map zooms in.
    ZoomIndicator,
    /// Dot riding the frontier of the progressively drawn path.
    DrawingPulse,
    /// One-shot mark shown when the path is fully drawn.
    CompletionMark,
    /// One-shot burst at the departure airport when the plane takes off.
    TakeoffBurst,
    /// Directional plane glyph.
    PlaneGlyph,
    /// One-shot burst at the arrival airport after landing.
    ArrivalBurst,
    DetailPopup,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::ZoomIndicator => "zoom-indicator",
            ArtifactKind::DrawingPulse => "drawing-pulse",
            ArtifactKind::CompletionMark => "completion-mark",
            ArtifactKind::TakeoffBurst => "takeoff-burst",
            ArtifactKind::PlaneGlyph => "plane-glyph",
            ArtifactKind::ArrivalBurst => "arrival-burst",
            ArtifactKind::DetailPopup => "detail-popup",
        }
    }

    /// Glyphs that carry a rotation.
    pub fn is_directional(self) -> bool {
        matches!(self, ArtifactKind::PlaneGlyph)
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArtifactStyle {
    pub color: [f32; 4],
    /// Marker diameter in screen pixels.
    pub size_px: f32,
    pub pulsing: bool,
}

impl ArtifactStyle {
    pub const fn new(color: [f32; 4], size_px: f32, pulsing: bool) -> Self {
        Self {
            color,
            size_px,
            pulsing,
        }
    }
}

impl Default for ArtifactStyle {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            size_px: 12.0,
            pulsing: false,
        }
    }
}

/// Text payload of a popup artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupContent {
    pub title: String,
    pub rows: Vec<(String, String)>,
    /// Pinned popups stay open until explicitly closed.
    pub pinned: bool,
}

impl PopupContent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn row(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push((label.into(), value.into()));
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

/// Everything a drawing surface needs to materialize one artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub position: Coordinate,
    pub rotation_deg: Option<f64>,
    pub style: ArtifactStyle,
    pub content: Option<PopupContent>,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, position: Coordinate, style: ArtifactStyle) -> Self {
        Self {
            kind,
            position,
            rotation_deg: None,
            style,
            content: None,
        }
    }

    pub fn rotated(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = Some(rotation_deg);
        self
    }

    pub fn with_content(mut self, content: PopupContent) -> Self {
        self.content = Some(content);
        self
    }
}
