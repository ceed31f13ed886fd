//! Geographic points and extents.

use thiserror::Error;

/// Errors from geographic coordinate handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude outside -90..=90
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside -180..=180
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// LOD above the supported maximum
    #[error("invalid LOD: {0}")]
    InvalidLod(u32),

    /// Tile coordinates outside the grid at their LOD
    #[error("invalid tile coordinates ({x}, {y}) at LOD {lod}")]
    InvalidTile { lod: u32, x: u32, y: u32 },
}

/// A geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in degrees (-180 to 180)
    pub lon: f64,
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
}

impl GeoPoint {
    /// Create a new point. Coordinates are not validated here; use
    /// [`GeoPoint::checked`] when the inputs are untrusted.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Create a new point, validating the coordinate ranges.
    pub fn checked(lon: f64, lat: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeoError::InvalidLongitude(lon));
        }
        Ok(Self { lon, lat })
    }
}

/// A geographic bounding rectangle in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Extent {
    /// Create a new extent from its edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The full globe.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center point of the extent.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.west + self.east) * 0.5,
            (self.south + self.north) * 0.5,
        )
    }

    /// Whether the point lies inside the extent (edges inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lon >= self.west
            && point.lon <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }

    /// Whether two extents overlap.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.west <= other.east
            && self.east >= other.west
            && self.south <= other.north
            && self.north >= other.south
    }
}
