//! Tiling profile: LOD and ground-resolution arithmetic.

use super::tile::TileKey;

/// Default raster edge length in samples per tile.
pub const DEFAULT_TILE_SIZE: u32 = 257;

/// Approximate meters per degree of latitude on the WGS84 ellipsoid.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Cosine floor near the poles, where longitudinal extent collapses.
const MIN_LAT_COS: f64 = 0.01;

/// Tiling profile for the global-geodetic scheme.
///
/// Maps between LOD integers and nominal ground resolutions. Tile extents
/// shrink longitudinally toward the poles, so resolutions are computed for a
/// specific latitude.
#[derive(Debug, Clone)]
pub struct Profile {
    tile_size: u32,
}

impl Profile {
    /// Create a profile for rasters of `tile_size` × `tile_size` samples.
    pub fn new(tile_size: u32) -> Self {
        debug_assert!(tile_size >= 2);
        Self { tile_size }
    }

    /// Raster edge length in samples.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Nominal ground resolution in meters of one raster cell at the given
    /// LOD and latitude.
    pub fn resolution_m(&self, lod: u32, lat: f64) -> f64 {
        let cell_deg = TileKey::span_deg(lod) / (self.tile_size - 1) as f64;
        let cos_lat = lat.to_radians().cos().max(MIN_LAT_COS);
        cell_deg * METERS_PER_DEGREE * cos_lat
    }

    /// The smallest LOD whose nominal resolution at `lat` is at least as
    /// fine as `resolution_m`, clamped to `max_lod`.
    ///
    /// Monotonic in the requested resolution: a finer request never yields a
    /// coarser LOD than a coarser request at the same point.
    pub fn lod_for_resolution(&self, resolution_m: f64, lat: f64, max_lod: u32) -> u32 {
        for lod in 0..=max_lod {
            if self.resolution_m(lod, lat) <= resolution_m {
                return lod;
            }
        }
        max_lod
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_halves_per_lod() {
        let profile = Profile::default();
        let r8 = profile.resolution_m(8, 45.0);
        let r9 = profile.resolution_m(9, 45.0);
        assert!((r8 / r9 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolution_shrinks_toward_poles() {
        let profile = Profile::default();
        assert!(profile.resolution_m(8, 70.0) < profile.resolution_m(8, 0.0));
    }

    #[test]
    fn test_lod_for_resolution_monotonic() {
        // Finer resolution request must never yield a coarser LOD.
        let profile = Profile::default();
        let lat = 37.6;
        let mut previous = 0;
        for step in 1..200 {
            let resolution = 50_000.0 / step as f64;
            let lod = profile.lod_for_resolution(resolution, lat, 20);
            assert!(lod >= previous, "resolution {} gave lod {}", resolution, lod);
            previous = lod;
        }
    }

    #[test]
    fn test_lod_for_resolution_clamps_to_max() {
        let profile = Profile::default();
        assert_eq!(profile.lod_for_resolution(0.001, 0.0, 10), 10);
    }

    #[test]
    fn test_coarse_resolution_resolves_to_lod_zero() {
        let profile = Profile::default();
        assert_eq!(profile.lod_for_resolution(1.0e9, 0.0, 20), 0);
    }
}
