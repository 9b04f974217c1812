//! Records consumed from the flight data layer.

use foundation::math::{Coordinate, GeometryError};
use serde::{Deserialize, Serialize};

/// Duration assumed when a flight's duration text cannot be parsed.
pub const FALLBACK_DURATION_MINUTES: u32 = 180;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Airport {
    pub fn new(code: impl Into<String>, city: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            city: city.into(),
            country: String::new(),
            latitude: Some(lat),
            longitude: Some(lng),
        }
    }

    pub fn coordinate(&self) -> Result<Coordinate, GeometryError> {
        Coordinate::from_parts(self.latitude, self.longitude).map_err(|err| match err {
            GeometryError::InvalidGeometryInput { reason } => {
                GeometryError::InvalidGeometryInput {
                    reason: format!("airport {}: {reason}", self.code),
                }
            }
            other => other,
        })
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    #[default]
    Direct,
    /// One leg of a connecting itinerary.
    Connecting,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::Direct => "direct",
            RouteKind::Connecting => "connecting",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RouteKind::Direct => "Direct",
            RouteKind::Connecting => "Connecting",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightInfo {
    pub flight_number: String,
    pub airline: String,
    pub duration_text: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub price: Option<f64>,
    pub route_kind: RouteKind,
}

impl FlightInfo {
    pub fn duration_minutes(&self) -> u32 {
        parse_duration_minutes(&self.duration_text)
    }
}

/// Parses `"<int>h <int>m"`; anything else yields
/// [`FALLBACK_DURATION_MINUTES`].
pub fn parse_duration_minutes(text: &str) -> u32 {
    try_parse_duration(text).unwrap_or(FALLBACK_DURATION_MINUTES)
}

fn try_parse_duration(text: &str) -> Option<u32> {
    let (hours, rest) = text.trim().split_once('h')?;
    let minutes = rest.trim().strip_suffix('m')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Identity of a rendered route: `(departure code, arrival code, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey {
    pub departure: String,
    pub arrival: String,
    pub kind: RouteKind,
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}/{}", self.departure, self.arrival, self.kind.as_str())
    }
}

/// Everything needed to present one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub departure: Airport,
    pub arrival: Airport,
    #[serde(default)]
    pub flight: FlightInfo,
}

impl RouteRequest {
    pub fn new(departure: Airport, arrival: Airport, flight: FlightInfo) -> Self {
        Self {
            departure,
            arrival,
            flight,
        }
    }

    pub fn kind(&self) -> RouteKind {
        self.flight.route_kind
    }

    pub fn key(&self) -> RouteKey {
        RouteKey {
            departure: self.departure.code.clone(),
            arrival: self.arrival.code.clone(),
            kind: self.flight.route_kind,
        }
    }
}

/// A multi-leg trip; every leg is presented as its own connecting route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub legs: Vec<RouteRequest>,
    #[serde(default)]
    pub layover_text: Option<String>,
}

impl Itinerary {
    pub fn leg_requests(&self) -> Vec<RouteRequest> {
        let kind = if self.legs.len() > 1 {
            RouteKind::Connecting
        } else {
            RouteKind::Direct
        };
        self.legs
            .iter()
            .cloned()
            .map(|mut leg| {
                leg.flight.route_kind = kind;
                leg
            })
            .collect()
    }
}
