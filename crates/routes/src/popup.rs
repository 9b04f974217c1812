use foundation::math::Coordinate;
use scene::{
    Artifact, ArtifactHandle, ArtifactKind, ArtifactStyle, DrawingSurface, PopupContent,
    ResourceLifecycle, SurfaceError,
};
use tracing::debug;

use crate::route::{RouteRequest, format_duration};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PopupMode {
    /// Hover summary, closes when the pointer leaves.
    Compact,
    /// Click details, pinned until clicked again or replaced.
    Expanded,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct OpenPopup {
    handle: ArtifactHandle,
    mode: PopupMode,
    anchor: Coordinate,
}

/// At most one detail popup per route.
///
/// Popups live in their own lifecycle so phase transitions never close them;
/// only route teardown does.
#[derive(Debug, Default)]
pub struct DetailPopupController {
    artifacts: ResourceLifecycle,
    open: Option<OpenPopup>,
}

impl DetailPopupController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Option<PopupMode> {
        self.open.map(|p| p.mode)
    }

    pub fn anchor(&self) -> Option<Coordinate> {
        self.open.map(|p| p.anchor)
    }

    pub fn live_count(&self) -> usize {
        self.artifacts.live_count()
    }

    /// Shows the compact summary at the pointer. A pinned popup stays as is.
    pub fn hover(
        &mut self,
        surface: &mut dyn DrawingSurface,
        request: &RouteRequest,
        at: Coordinate,
    ) -> Result<(), SurfaceError> {
        if self.mode() == Some(PopupMode::Expanded) {
            return Ok(());
        }
        self.show(surface, PopupMode::Compact, compact_content(request), at)
    }

    pub fn hover_end(&mut self, surface: &mut dyn DrawingSurface) -> bool {
        if self.mode() == Some(PopupMode::Compact) {
            return self.close(surface);
        }
        false
    }

    /// Expands details at the pointer, or collapses them when already expanded.
    pub fn click(
        &mut self,
        surface: &mut dyn DrawingSurface,
        request: &RouteRequest,
        at: Coordinate,
    ) -> Result<(), SurfaceError> {
        if self.mode() == Some(PopupMode::Expanded) {
            self.close(surface);
            return Ok(());
        }
        self.show(surface, PopupMode::Expanded, expanded_content(request), at)
    }

    pub fn close(&mut self, surface: &mut dyn DrawingSurface) -> bool {
        match self.open.take() {
            Some(open) => self.artifacts.release(surface, open.handle),
            None => false,
        }
    }

    fn show(
        &mut self,
        surface: &mut dyn DrawingSurface,
        mode: PopupMode,
        content: PopupContent,
        at: Coordinate,
    ) -> Result<(), SurfaceError> {
        self.close(surface);
        let artifact = Artifact::new(ArtifactKind::DetailPopup, at, ArtifactStyle::default())
            .with_content(content);
        let handle = self.artifacts.acquire(surface, &artifact)?;
        debug!(?mode, lat = at.lat, lng = at.lng, "popup shown");
        self.open = Some(OpenPopup {
            handle,
            mode,
            anchor: at,
        });
        Ok(())
    }
}

fn title(request: &RouteRequest) -> String {
    let flight = &request.flight;
    match (flight.airline.is_empty(), flight.flight_number.is_empty()) {
        (false, false) => format!("{} {}", flight.airline, flight.flight_number),
        (true, false) => flight.flight_number.clone(),
        (false, true) => flight.airline.clone(),
        (true, true) => request.key().to_string(),
    }
}

pub fn compact_content(request: &RouteRequest) -> PopupContent {
    PopupContent::new(title(request))
        .row(
            "Route",
            format!("{} → {}", request.departure.code, request.arrival.code),
        )
        .row("Type", request.kind().label())
        .row("Duration", format_duration(request.flight.duration_minutes()))
}

pub fn expanded_content(request: &RouteRequest) -> PopupContent {
    let flight = &request.flight;
    let price = flight
        .price
        .map_or_else(|| "n/a".to_string(), |p| format!("${p:.2}"));
    compact_content(request)
        .row(
            "Departs",
            format!("{} {}", request.departure.city, flight.departure_time)
                .trim()
                .to_string(),
        )
        .row(
            "Arrives",
            format!("{} {}", request.arrival.city, flight.arrival_time)
                .trim()
                .to_string(),
        )
        .row("Price", price)
        .pinned(true)
}
