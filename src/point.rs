use mint::Point2;

/// The point collaborator of the index: read access to the two axis
/// coordinates and a metric distance.
///
/// The index never constructs or mutates points, it only buckets them by their
/// coordinates and compares distances, so any metric satisfying symmetry and
/// the triangle inequality is fine.
pub trait SpatialPoint: Copy {
    /// Coordinate on the given axis (0 = x, 1 = y).
    fn get(&self, axis: usize) -> f32;

    /// Distance to another point, >= 0.
    fn distance(&self, other: &Self) -> f32;
}

impl SpatialPoint for Point2<f32> {
    fn get(&self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            _ => self.y,
        }
    }

    fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl SpatialPoint for [f32; 2] {
    fn get(&self, axis: usize) -> f32 {
        self[axis]
    }

    fn distance(&self, other: &Self) -> f32 {
        let dx = self[0] - other[0];
        let dy = self[1] - other[1];
        (dx * dx + dy * dy).sqrt()
    }
}
