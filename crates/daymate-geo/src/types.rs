use serde::{Deserialize, Serialize};

/// A point in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

impl Coords {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True if both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Coords::new(23.8, 90.4).is_valid());
        assert!(Coords::new(-90.0, 180.0).is_valid());
        assert!(!Coords::new(90.1, 0.0).is_valid());
        assert!(!Coords::new(0.0, -180.5).is_valid());
        assert!(!Coords::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_display() {
        assert_eq!(Coords::new(23.8, 90.4).to_string(), "23.8000, 90.4000");
    }
}
