use crate::infra::{Position, centroid};

/// A row-major grid of integer feature values (unit type, ownership, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureLayer {
    pub width: usize,
    pub height: usize,
    data: Vec<i32>,
}

impl FeatureLayer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Build a layer from host data; returns None when the length does not match.
    pub fn from_data(width: usize, height: usize, data: Vec<i32>) -> Option<Self> {
        if width.checked_mul(height)? != data.len() {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn get(&self, pos: Position) -> Option<i32> {
        self.index(pos).map(|i| self.data[i])
    }

    pub fn set(&mut self, pos: Position, value: i32) {
        if let Some(i) = self.index(pos) {
            self.data[i] = value;
        }
    }

    /// Paint a `w` x `h` rectangle with its top-left corner at `origin`, clipped to the layer.
    pub fn fill_rect(&mut self, origin: Position, w: i32, h: i32, value: i32) {
        for y in origin.y..origin.y + h {
            for x in origin.x..origin.x + w {
                self.set(Position::new(x, y), value);
            }
        }
    }

    /// All pixels holding `value`, in row-major order.
    pub fn positions_of(&self, value: i32) -> Vec<Position> {
        self.data
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == value)
            .map(|(i, _)| Position::new((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    pub fn count(&self, value: i32) -> usize {
        self.data.iter().filter(|&&v| v == value).count()
    }

    pub fn contains(&self, value: i32) -> bool {
        self.data.contains(&value)
    }

    pub fn centroid_of(&self, value: i32) -> Option<Position> {
        centroid(&self.positions_of(value))
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_row_major() {
        let mut layer = FeatureLayer::new(4, 3);
        layer.set(Position::new(3, 0), 7);
        layer.set(Position::new(0, 2), 7);
        layer.set(Position::new(1, 1), 7);

        assert_eq!(
            layer.positions_of(7),
            vec![Position::new(3, 0), Position::new(1, 1), Position::new(0, 2)]
        );
        assert_eq!(layer.count(7), 3);
        assert!(!layer.contains(8));
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut layer = FeatureLayer::new(4, 4);
        layer.fill_rect(Position::new(2, 2), 5, 5, 1);
        assert_eq!(layer.count(1), 4);
        assert_eq!(layer.centroid_of(1), Some(Position::new(3, 3)));
    }

    #[test]
    fn test_from_data_rejects_bad_length() {
        assert!(FeatureLayer::from_data(2, 2, vec![0; 3]).is_none());
        assert!(FeatureLayer::from_data(2, 2, vec![0; 4]).is_some());
    }

    #[test]
    fn test_from_data_rejects_overflowing_dimensions() {
        assert!(FeatureLayer::from_data(usize::MAX, 2, vec![0; 2]).is_none());
    }
}
