//! Elevation sample results.

use crate::raster::NO_DATA_VALUE;

/// One elevation answer: the height and the ground resolution actually
/// achieved.
///
/// "No data" is a normal, expected outcome (the point lies outside all
/// layer coverage) and is reported as [`Sample::NO_DATA`], never as an
/// error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Elevation in meters, or the no-data sentinel.
    pub elevation: f32,
    /// Ground resolution in meters per cell of the raster that answered.
    pub resolution_m: f64,
}

impl Sample {
    /// The no-data sentinel sample.
    pub const NO_DATA: Sample = Sample {
        elevation: NO_DATA_VALUE,
        resolution_m: 0.0,
    };

    /// Create a valid sample.
    pub fn new(elevation: f32, resolution_m: f64) -> Self {
        Self {
            elevation,
            resolution_m,
        }
    }

    /// Whether this sample carries real data.
    pub fn is_valid(&self) -> bool {
        self.elevation != NO_DATA_VALUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_sentinel_is_invalid() {
        assert!(!Sample::NO_DATA.is_valid());
        assert!(Sample::new(0.0, 30.0).is_valid());
        assert!(Sample::new(-12.5, 30.0).is_valid());
    }
}
