//! Normal maps derived from finished heightfields.

use super::heightfield::Heightfield;

const METERS_PER_DEGREE: f64 = 111_320.0;

/// Per-cell unit surface normals for an elevation grid.
///
/// Computed from the merged heightfield after layer assembly, by central
/// differences over the cell spacing in meters. No-data cells get an
/// upward-facing normal.
#[derive(Debug, Clone)]
pub struct NormalMap {
    width: u32,
    height: u32,
    data: Vec<[f32; 3]>,
}

impl NormalMap {
    /// Compute normals for every cell of a heightfield.
    pub fn from_heightfield(hf: &Heightfield) -> Self {
        let width = hf.width();
        let height = hf.height();
        let extent = hf.extent();

        let cos_lat = extent.center().lat.to_radians().cos().max(0.01);
        let dx_m =
            (extent.width() / (width - 1) as f64 * METERS_PER_DEGREE * cos_lat).max(1.0) as f32;
        let dy_m = (extent.height() / (height - 1) as f64 * METERS_PER_DEGREE).max(1.0) as f32;

        let mut data = Vec::with_capacity((width * height) as usize);
        for row in 0..height {
            for col in 0..width {
                data.push(Self::cell_normal(hf, col, row, dx_m, dy_m));
            }
        }

        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Unit normal at a cell.
    pub fn get(&self, col: u32, row: u32) -> [f32; 3] {
        debug_assert!(col < self.width && row < self.height);
        self.data[(row * self.width + col) as usize]
    }

    fn cell_normal(hf: &Heightfield, col: u32, row: u32, dx_m: f32, dy_m: f32) -> [f32; 3] {
        let center = hf.get(col, row);
        if Heightfield::is_no_data(center) {
            return [0.0, 0.0, 1.0];
        }

        let value_or = |c: i64, r: i64| -> f32 {
            if c < 0 || r < 0 || c >= hf.width() as i64 || r >= hf.height() as i64 {
                return center;
            }
            let v = hf.get(c as u32, r as u32);
            if Heightfield::is_no_data(v) {
                center
            } else {
                v
            }
        };

        let col = col as i64;
        let row = row as i64;
        let dzdx = (value_or(col + 1, row) - value_or(col - 1, row)) / (2.0 * dx_m);
        // Row index grows southward, latitude shrinks: flip the sign.
        let dzdy = (value_or(col, row - 1) - value_or(col, row + 1)) / (2.0 * dy_m);

        let len = (dzdx * dzdx + dzdy * dzdy + 1.0).sqrt();
        [-dzdx / len, -dzdy / len, 1.0 / len]
    }
}
