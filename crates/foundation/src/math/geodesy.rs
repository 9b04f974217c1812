/// Mean Earth radius used for great-circle distances (kilometers).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate kilometers per degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A coordinate (or arc parameter) is missing, non-finite or out of range.
    InvalidGeometryInput { reason: String },
    /// An arc is too short to be drawn or flown.
    InsufficientArcPoints { points: usize },
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::InvalidGeometryInput { reason } => {
                write!(f, "invalid geometry input: {reason}")
            }
            GeometryError::InsufficientArcPoints { points } => {
                write!(f, "arc has {points} point(s), at least 2 required")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a coordinate from possibly-missing components, as delivered by
    /// the data layer.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Result<Self, GeometryError> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Self::new(lat, lng).validated(),
            (None, _) => Err(invalid("latitude is missing")),
            (_, None) => Err(invalid("longitude is missing")),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }

    pub fn validated(self) -> Result<Self, GeometryError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(invalid(format!(
                "coordinate out of range: lat={} lng={}",
                self.lat, self.lng
            )))
        }
    }
}

pub(crate) fn invalid(reason: impl Into<String>) -> GeometryError {
    GeometryError::InvalidGeometryInput {
        reason: reason.into(),
    }
}

/// Great-circle distance (haversine).
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Initial great-circle bearing from `from` towards `to`, in `[0, 360)`.
pub fn compute_bearing(from: Coordinate, to: Coordinate) -> Result<f64, GeometryError> {
    let from = from.validated()?;
    let to = to.validated()?;
    Ok(bearing_unchecked(from, to))
}

pub(crate) fn bearing_unchecked(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let d_lambda = (to.lng - from.lng).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Wraps any finite angle into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
