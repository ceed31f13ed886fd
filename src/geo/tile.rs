//! Quadtree tile keys over a global-geodetic tiling.
//!
//! LOD 0 covers the globe with two 180°×180° tiles side by side; each
//! subsequent LOD doubles the tile count on both axes. Row 0 is the
//! northernmost row.

use super::types::{Extent, GeoError, GeoPoint};

/// Maximum supported level of detail.
pub const MAX_LOD: u32 = 23;

/// Identifier for a rectangular region of the globe at a specific LOD.
///
/// Keys are value types: cheap to copy, hashable, and usable directly as
/// cache-key components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    lod: u32,
    x: u32,
    y: u32,
}

impl TileKey {
    /// Create a tile key, validating that the coordinates exist at the LOD.
    pub fn new(lod: u32, x: u32, y: u32) -> Result<Self, GeoError> {
        if lod > MAX_LOD {
            return Err(GeoError::InvalidLod(lod));
        }
        if x >= Self::tiles_x(lod) || y >= Self::tiles_y(lod) {
            return Err(GeoError::InvalidTile { lod, x, y });
        }
        Ok(Self { lod, x, y })
    }

    /// The tile containing `point` at the given LOD.
    pub fn from_point(point: &GeoPoint, lod: u32) -> Result<Self, GeoError> {
        if lod > MAX_LOD {
            return Err(GeoError::InvalidLod(lod));
        }
        let span = Self::span_deg(lod);
        let x = ((point.lon + 180.0) / span).floor() as i64;
        let y = ((90.0 - point.lat) / span).floor() as i64;
        // Points on the east/south edge of the grid land in the last tile.
        let x = x.clamp(0, Self::tiles_x(lod) as i64 - 1) as u32;
        let y = y.clamp(0, Self::tiles_y(lod) as i64 - 1) as u32;
        Ok(Self { lod, x, y })
    }

    /// Level of detail of this key.
    pub fn lod(&self) -> u32 {
        self.lod
    }

    /// Column within the grid at this LOD.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Row within the grid at this LOD (0 = northernmost).
    pub fn y(&self) -> u32 {
        self.y
    }

    /// The key one level coarser, or `None` at the top of the hierarchy.
    pub fn parent(&self) -> Option<TileKey> {
        if self.lod == 0 {
            return None;
        }
        Some(TileKey {
            lod: self.lod - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    /// Geographic bounds of this tile.
    pub fn extent(&self) -> Extent {
        let span = Self::span_deg(self.lod);
        let west = -180.0 + self.x as f64 * span;
        let north = 90.0 - self.y as f64 * span;
        Extent::new(west, north - span, west + span, north)
    }

    /// Tile edge length in degrees at the given LOD.
    pub fn span_deg(lod: u32) -> f64 {
        180.0 / (1u64 << lod) as f64
    }

    fn tiles_x(lod: u32) -> u32 {
        2u32 << lod
    }

    fn tiles_y(lod: u32) -> u32 {
        1u32 << lod
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.lod, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lod_zero_has_two_tiles_and_no_parent() {
        let west = TileKey::new(0, 0, 0).unwrap();
        let east = TileKey::new(0, 1, 0).unwrap();
        assert!(west.parent().is_none());
        assert!(east.parent().is_none());
        assert!(TileKey::new(0, 2, 0).is_err());
        assert!(TileKey::new(0, 0, 1).is_err());
    }

    #[test]
    fn test_extent_of_lod_zero_west_tile() {
        let key = TileKey::new(0, 0, 0).unwrap();
        let e = key.extent();
        assert_eq!(e.west, -180.0);
        assert_eq!(e.east, 0.0);
        assert_eq!(e.north, 90.0);
        assert_eq!(e.south, -90.0);
    }

    #[test]
    fn test_from_point_roundtrip() {
        let point = GeoPoint::new(-122.3, 37.6);
        for lod in 0..12 {
            let key = TileKey::from_point(&point, lod).unwrap();
            assert!(key.extent().contains(&point), "lod {} extent", lod);
        }
    }

    #[test]
    fn test_parent_contains_child_extent_center() {
        let point = GeoPoint::new(6.9, 46.2);
        let child = TileKey::from_point(&point, 10).unwrap();
        let parent = child.parent().unwrap();
        assert_eq!(parent.lod(), 9);
        assert!(parent.extent().contains(&child.extent().center()));
    }

    #[test]
    fn test_grid_edge_points_clamp_into_grid() {
        let key = TileKey::from_point(&GeoPoint::new(180.0, -90.0), 5).unwrap();
        assert!(key.x() < 2u32 << 5);
        assert!(key.y() < 1u32 << 5);
    }

    #[test]
    fn test_display_format() {
        let key = TileKey::new(8, 41, 22).unwrap();
        assert_eq!(key.to_string(), "8/41/22");
    }
}
