// src/observables/bloch.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expectation values (⟨σx⟩, ⟨σy⟩, ⟨σz⟩) of a single qubit.
///
/// Pure states lie on the unit sphere, mixed states strictly inside it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlochVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BlochVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &BlochVector) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Projects onto the unit sphere. The zero vector is returned unchanged.
    pub fn normalized(&self) -> BlochVector {
        let norm = self.norm();
        if norm == 0.0 {
            return *self;
        }
        Self::new(self.x / norm, self.y / norm, self.z / norm)
    }

    fn lerp(&self, other: &BlochVector, t: f64) -> BlochVector {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }
}

impl fmt::Display for BlochVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}

/// `points` evenly spaced points from `start` to `end`, each re-projected onto
/// the unit sphere. Used to animate a transition between two Bloch states.
///
/// Zero points gives an empty path; one point gives the normalized start.
pub fn bloch_path(start: &BlochVector, end: &BlochVector, points: usize) -> Vec<BlochVector> {
    match points {
        0 => Vec::new(),
        1 => vec![start.normalized()],
        _ => {
            let last = (points - 1) as f64;
            (0..points)
                .map(|i| start.lerp(end, i as f64 / last).normalized())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_norm_and_distance() {
        let a = BlochVector::new(1.0, 0.0, 0.0);
        let b = BlochVector::new(0.0, 0.0, -1.0);
        assert!((a.norm() - 1.0).abs() < TOL);
        assert!((a.distance(&b) - 2f64.sqrt()).abs() < TOL);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_normalized_keeps_zero_vector() {
        let zero = BlochVector::default();
        assert_eq!(zero.normalized(), zero);
        let v = BlochVector::new(0.0, 3.0, 4.0).normalized();
        assert!((v.norm() - 1.0).abs() < TOL);
        assert!((v.z - 0.8).abs() < TOL);
    }

    #[test]
    fn test_path_endpoints_and_length() {
        let start = BlochVector::new(0.0, 0.0, 1.0);
        let end = BlochVector::new(1.0, 0.0, 0.0);
        let path = bloch_path(&start, &end, 5);
        assert_eq!(path.len(), 5);
        assert!(path[0].distance(&start) < TOL);
        assert!(path[4].distance(&end) < TOL);
        for p in &path {
            assert!((p.norm() - 1.0).abs() < TOL);
        }
    }

    #[test]
    fn test_path_degenerate_point_counts() {
        let start = BlochVector::new(0.0, 0.0, 2.0);
        let end = BlochVector::new(1.0, 0.0, 0.0);
        assert!(bloch_path(&start, &end, 0).is_empty());
        assert_eq!(bloch_path(&start, &end, 1), vec![BlochVector::new(0.0, 0.0, 1.0)]);
    }

    #[test]
    fn test_serializes_as_named_fields() {
        let json = serde_json::to_value(BlochVector::new(1.0, 0.0, -1.0)).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1.0, "y": 0.0, "z": -1.0}));
    }
}
