//! Elevation grids with no-data-aware sampling.

use crate::geo::{Extent, GeoPoint};

/// Sentinel marking a cell with no elevation data.
pub const NO_DATA_VALUE: f32 = -32768.0;

/// A `width × height` grid of elevation samples bound to a geographic
/// extent. Row 0 is the northernmost row.
#[derive(Debug, Clone)]
pub struct Heightfield {
    width: u32,
    height: u32,
    extent: Extent,
    data: Vec<f32>,
}

impl Heightfield {
    /// Create a grid filled with a single value.
    pub fn filled(width: u32, height: u32, extent: Extent, value: f32) -> Self {
        Self {
            width,
            height,
            extent,
            data: vec![value; (width * height) as usize],
        }
    }

    /// Create a grid with every cell marked no-data.
    pub fn no_data(width: u32, height: u32, extent: Extent) -> Self {
        Self::filled(width, height, extent, NO_DATA_VALUE)
    }

    /// Whether a sample value is the no-data sentinel.
    pub fn is_no_data(value: f32) -> bool {
        value == NO_DATA_VALUE
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Value at a cell. Panics on out-of-range coordinates in debug builds.
    pub fn get(&self, col: u32, row: u32) -> f32 {
        debug_assert!(col < self.width && row < self.height);
        self.data[(row * self.width + col) as usize]
    }

    /// Set the value at a cell.
    pub fn set(&mut self, col: u32, row: u32, value: f32) {
        debug_assert!(col < self.width && row < self.height);
        self.data[(row * self.width + col) as usize] = value;
    }

    /// Number of cells holding real data.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !Self::is_no_data(**v)).count()
    }

    /// Overlay another grid's valid samples onto this one.
    ///
    /// Both grids must have identical dimensions; cells where `other` has
    /// data replace this grid's cells (layer-stack override, not blending).
    pub fn overlay(&mut self, other: &Heightfield) {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        for (dst, src) in self.data.iter_mut().zip(other.data.iter()) {
            if !Self::is_no_data(*src) {
                *dst = *src;
            }
        }
    }

    /// Geographic position of a cell center.
    ///
    /// A single-cell axis maps to the middle of the extent along that axis.
    pub fn cell_position(&self, col: u32, row: u32) -> GeoPoint {
        let u = if self.width > 1 {
            col as f64 / (self.width - 1) as f64
        } else {
            0.5
        };
        let v = if self.height > 1 {
            row as f64 / (self.height - 1) as f64
        } else {
            0.5
        };
        GeoPoint::new(
            self.extent.west + u * self.extent.width(),
            self.extent.north - v * self.extent.height(),
        )
    }

    /// Bilinearly sample the grid at a geographic point.
    ///
    /// No-data cells degrade gracefully: when some interpolation corners are
    /// missing, the nearest valid corner's value is used instead; when all
    /// four are missing the result is `None`. Points outside the extent
    /// return `None`.
    pub fn sample(&self, point: &GeoPoint) -> Option<f32> {
        if self.data.is_empty() || !self.extent.contains(point) {
            return None;
        }

        // A grid with a single row or column has no cell to interpolate
        // across; answer with the nearest cell instead.
        if self.width < 2 || self.height < 2 {
            let col = self.nearest_col(point.lon);
            let row = self.nearest_row(point.lat);
            let value = self.get(col, row);
            return (!Self::is_no_data(value)).then_some(value);
        }

        let u = (point.lon - self.extent.west) / self.extent.width() * (self.width - 1) as f64;
        let v = (self.extent.north - point.lat) / self.extent.height() * (self.height - 1) as f64;

        let c0 = (u.floor() as u32).min(self.width - 2);
        let r0 = (v.floor() as u32).min(self.height - 2);
        let fu = (u - c0 as f64).clamp(0.0, 1.0) as f32;
        let fv = (v - r0 as f64).clamp(0.0, 1.0) as f32;

        let corners = [
            (self.get(c0, r0), (1.0 - fu) * (1.0 - fv)),
            (self.get(c0 + 1, r0), fu * (1.0 - fv)),
            (self.get(c0, r0 + 1), (1.0 - fu) * fv),
            (self.get(c0 + 1, r0 + 1), fu * fv),
        ];

        if corners.iter().all(|(value, _)| !Self::is_no_data(*value)) {
            return Some(corners.iter().map(|(value, w)| value * w).sum());
        }

        // Partial data: fall back to the valid corner with the most weight.
        corners
            .iter()
            .filter(|(value, _)| !Self::is_no_data(*value))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(value, _)| *value)
    }

    fn nearest_col(&self, lon: f64) -> u32 {
        if self.width < 2 {
            return 0;
        }
        let u = (lon - self.extent.west) / self.extent.width() * (self.width - 1) as f64;
        (u.round() as u32).min(self.width - 1)
    }

    fn nearest_row(&self, lat: f64) -> u32 {
        if self.height < 2 {
            return 0;
        }
        let v = (self.extent.north - lat) / self.extent.height() * (self.height - 1) as f64;
        (v.round() as u32).min(self.height - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_extent() -> Extent {
        Extent::new(0.0, 0.0, 1.0, 1.0)
    }

    #[test]
    fn test_filled_grid_samples_constant() {
        let hf = Heightfield::filled(9, 9, unit_extent(), 120.0);
        assert_eq!(hf.sample(&GeoPoint::new(0.5, 0.5)), Some(120.0));
        assert_eq!(hf.sample(&GeoPoint::new(0.0, 1.0)), Some(120.0));
    }

    #[test]
    fn test_sample_outside_extent_is_none() {
        let hf = Heightfield::filled(9, 9, unit_extent(), 120.0);
        assert_eq!(hf.sample(&GeoPoint::new(2.0, 0.5)), None);
    }

    #[test]
    fn test_all_no_data_samples_none() {
        let hf = Heightfield::no_data(9, 9, unit_extent());
        assert_eq!(hf.sample(&GeoPoint::new(0.5, 0.5)), None);
        assert_eq!(hf.valid_count(), 0);
    }

    #[test]
    fn test_bilinear_interpolation_between_rows() {
        let mut hf = Heightfield::filled(2, 2, unit_extent(), 0.0);
        // North row (row 0) at 100 m, south row at 0 m.
        hf.set(0, 0, 100.0);
        hf.set(1, 0, 100.0);
        let mid = hf.sample(&GeoPoint::new(0.5, 0.5)).unwrap();
        assert!((mid - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_partial_no_data_uses_nearest_valid_corner() {
        let mut hf = Heightfield::no_data(2, 2, unit_extent());
        hf.set(0, 0, 42.0);
        // Sample near the northwest corner where the only valid cell lives.
        let v = hf.sample(&GeoPoint::new(0.1, 0.9)).unwrap();
        assert_eq!(v, 42.0);
    }

    #[test]
    fn test_overlay_prefers_source_valid_cells() {
        let mut base = Heightfield::filled(3, 3, unit_extent(), 10.0);
        let mut over = Heightfield::no_data(3, 3, unit_extent());
        over.set(1, 1, 99.0);
        base.overlay(&over);
        assert_eq!(base.get(1, 1), 99.0);
        assert_eq!(base.get(0, 0), 10.0);
    }

    #[test]
    fn test_single_row_grid_samples_nearest_cell() {
        let mut hf = Heightfield::filled(3, 1, unit_extent(), 5.0);
        hf.set(2, 0, 80.0);
        assert_eq!(hf.sample(&GeoPoint::new(0.1, 0.5)), Some(5.0));
        assert_eq!(hf.sample(&GeoPoint::new(0.9, 0.5)), Some(80.0));
    }

    #[test]
    fn test_single_cell_grid() {
        let hf = Heightfield::filled(1, 1, unit_extent(), 7.0);
        assert_eq!(hf.sample(&GeoPoint::new(0.5, 0.5)), Some(7.0));
        let center = hf.cell_position(0, 0);
        assert_eq!((center.lon, center.lat), (0.5, 0.5));

        let empty = Heightfield::no_data(1, 1, unit_extent());
        assert_eq!(empty.sample(&GeoPoint::new(0.5, 0.5)), None);
    }

    #[test]
    fn test_cell_position_corners() {
        let hf = Heightfield::filled(3, 3, unit_extent(), 0.0);
        let nw = hf.cell_position(0, 0);
        let se = hf.cell_position(2, 2);
        assert_eq!((nw.lon, nw.lat), (0.0, 1.0));
        assert_eq!((se.lon, se.lat), (1.0, 0.0));
    }
}
