/// A pixel coordinate on a screen or minimap feature layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_squared(&self, other: &Position) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

/// Rounded mean of a set of pixels, or None for an empty mask.
pub fn centroid(positions: &[Position]) -> Option<Position> {
    if positions.is_empty() {
        return None;
    }
    let n = positions.len() as f64;
    let (sx, sy) = positions.iter().fold((0i64, 0i64), |(sx, sy), p| {
        (sx + p.x as i64, sy + p.y as i64)
    });
    Some(Position::new(
        (sx as f64 / n).round() as i32,
        (sy as f64 / n).round() as i32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_rounds_to_nearest_pixel() {
        let pixels = [Position::new(0, 0), Position::new(3, 1), Position::new(3, 2)];
        assert_eq!(centroid(&pixels), Some(Position::new(2, 1)));
    }

    #[test]
    fn test_centroid_of_empty_mask() {
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn test_distance_squared() {
        let a = Position::new(1, 1);
        assert_eq!(a.distance_squared(&Position::new(4, 5)), 25);
        assert_eq!(a.offset(-1, 2), Position::new(0, 3));
    }
}
