//! Raw geographic rings as loaded from a data source.

use azmap_projection::GeoPoint;
use tracing::warn;

use crate::error::GeometryError;

/// One input polyline or polygon ring: an ordered list of geographic
/// vertices. Polygon rings are implicitly closed (last joins first).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeoRing {
    points: Vec<GeoPoint>,
}

impl GeoRing {
    /// Create a ring from geographic points.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Create a ring from `(longitude, latitude)` pairs.
    pub fn from_lon_lat<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self {
            points: pairs
                .into_iter()
                .map(|(lon, lat)| GeoPoint::from_lon_lat(lon, lat))
                .collect(),
        }
    }

    /// The ring's vertices.
    #[inline]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the ring has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<GeoPoint>> for GeoRing {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::new(points)
    }
}

/// An ordered collection of rings making up one data layer, with an optional
/// soft limit on the ring count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RingSet {
    rings: Vec<GeoRing>,
    limit: Option<usize>,
}

impl RingSet {
    /// Create an unbounded, empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set that accepts at most `limit` rings.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            rings: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Configured ring limit, if any.
    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Add one ring.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::CapacityExceeded`] if the set is already at its
    /// limit; the ring is not added.
    pub fn try_push(&mut self, ring: GeoRing) -> Result<(), GeometryError> {
        if let Some(limit) = self.limit
            && self.rings.len() >= limit
        {
            return Err(GeometryError::CapacityExceeded {
                limit,
                requested: self.rings.len() + 1,
            });
        }
        self.rings.push(ring);
        Ok(())
    }

    /// Add rings until the limit is reached, dropping the rest.
    ///
    /// Returns the [`GeometryError::CapacityExceeded`] describing the
    /// truncation, if any, after logging it as a warning.
    pub fn extend_truncating<I>(&mut self, rings: I) -> Option<GeometryError>
    where
        I: IntoIterator<Item = GeoRing>,
    {
        let mut dropped = 0usize;
        for ring in rings {
            if self.try_push(ring).is_err() {
                dropped += 1;
            }
        }

        let limit = self.limit?;
        if dropped == 0 {
            return None;
        }
        let requested = self.rings.len() + dropped;
        warn!(limit, requested, "ring limit reached, truncating input");
        Some(GeometryError::CapacityExceeded { limit, requested })
    }

    /// The rings in input order.
    #[inline]
    pub fn rings(&self) -> &[GeoRing] {
        &self.rings
    }

    /// Number of rings.
    #[inline]
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    /// Returns `true` if there are no rings.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Total vertex count across all rings.
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(GeoRing::len).sum()
    }
}

impl FromIterator<GeoRing> for RingSet {
    fn from_iter<T: IntoIterator<Item = GeoRing>>(iter: T) -> Self {
        Self {
            rings: iter.into_iter().collect(),
            limit: None,
        }
    }
}
