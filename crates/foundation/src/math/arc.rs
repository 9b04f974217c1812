use super::geodesy::{
    Coordinate, GeometryError, KM_PER_DEGREE, bearing_unchecked, haversine_km, invalid,
};

/// Number of samples in a route arc (`t = 0, 0.01, …, 1`).
pub const ARC_POINTS: usize = 101;

/// Reference bend factor for direct routes.
pub const DIRECT_BEND: f64 = 0.20;

/// Reference bend factor for each leg of a connecting itinerary.
pub const CONNECTING_BEND: f64 = 0.15;

/// Curved point sequence connecting two coordinates.
///
/// Point `i` of an `n`-point arc sits at interpolation fraction
/// `t = i / (n - 1)`. Arcs are never mutated; progressive display uses
/// [`Arc::prefix`].
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    points: Vec<Coordinate>,
}

impl Arc {
    /// Wraps an externally produced point list without validating it.
    pub fn from_points(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Two-point straight segment.
    pub fn straight(departure: Coordinate, arrival: Coordinate) -> Self {
        Self {
            points: vec![departure, arrival],
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<Coordinate> {
        self.points.get(index).copied()
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }

    /// The first `len` points (clamped to the arc length).
    pub fn prefix(&self, len: usize) -> &[Coordinate] {
        &self.points[..len.min(self.points.len())]
    }

    pub fn check_drawable(&self) -> Result<(), GeometryError> {
        if self.points.len() < 2 {
            return Err(GeometryError::InsufficientArcPoints {
                points: self.points.len(),
            });
        }
        Ok(())
    }

    /// Replaces an arc with fewer than two points by the straight
    /// `[departure, arrival]` segment. Returns the error it recovered from.
    pub fn ensure_drawable(
        &mut self,
        departure: Coordinate,
        arrival: Coordinate,
    ) -> Option<GeometryError> {
        let err = self.check_drawable().err()?;
        *self = Self::straight(departure, arrival);
        Some(err)
    }

    /// Bearing from point `index` towards the next point.
    ///
    /// At the last point the bearing of the final segment is reused.
    pub fn heading_at(&self, index: usize) -> Option<f64> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        let from = index.min(n - 2);
        Some(bearing_unchecked(self.points[from], self.points[from + 1]))
    }
}

/// Curved arc between two coordinates, see [`compute_arc_with_points`].
pub fn compute_arc(
    departure: Coordinate,
    arrival: Coordinate,
    bend_factor: f64,
) -> Result<Arc, GeometryError> {
    compute_arc_with_points(departure, arrival, bend_factor, ARC_POINTS)
}

/// Linear lat/lng interpolation bent along the chord's unit normal.
///
/// The offset at fraction `t` is
/// `sin(πt) · bend_factor · haversine_km(departure, arrival) / 111` degrees,
/// so both endpoints are exact and the apex sits at `t = 0.5`.
pub fn compute_arc_with_points(
    departure: Coordinate,
    arrival: Coordinate,
    bend_factor: f64,
    points: usize,
) -> Result<Arc, GeometryError> {
    let departure = departure.validated()?;
    let arrival = arrival.validated()?;
    if !bend_factor.is_finite() || bend_factor <= 0.0 {
        return Err(invalid(format!("bend factor must be positive, got {bend_factor}")));
    }
    if points < 2 {
        return Err(GeometryError::InsufficientArcPoints { points });
    }

    let d_lng = arrival.lng - departure.lng;
    let d_lat = arrival.lat - departure.lat;
    let chord = (d_lng * d_lng + d_lat * d_lat).sqrt();

    // Unit normal of the chord in (lng, lat) space; zero for coincident endpoints.
    let (n_lng, n_lat) = if chord > f64::EPSILON {
        (-d_lat / chord, d_lng / chord)
    } else {
        (0.0, 0.0)
    };
    let apex = bend_factor * haversine_km(departure, arrival) / KM_PER_DEGREE;

    let last = (points - 1) as f64;
    let mut out = Vec::with_capacity(points);
    for i in 0..points {
        let t = i as f64 / last;
        let offset = (std::f64::consts::PI * t).sin() * apex;
        out.push(Coordinate::new(
            departure.lat + d_lat * t + n_lat * offset,
            departure.lng + d_lng * t + n_lng * offset,
        ));
    }

    // sin(π) is not exactly zero; pin the endpoints.
    out[0] = departure;
    out[points - 1] = arrival;
    Ok(Arc::from_points(out))
}
