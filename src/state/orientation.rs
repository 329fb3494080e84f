use crate::infra::Position;

use super::observation::{Observation, PlayerRelative};

/// Minimap extent used when mirroring minimap targets.
pub const MINIMAP_EXTENT: i32 = 64;

/// A mean own-pixel row at or below this counts as a top-left start.
const TOP_LEFT_MAX_MEAN_ROW: f64 = 31.0;

/// Which corner of the map the agent's base occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseOrientation {
    TopLeft,
    BottomRight,
}

impl BaseOrientation {
    /// Classify from own pixels on the minimap; no own pixels reads as bottom-right.
    pub fn detect(obs: &Observation) -> Self {
        let own = obs.minimap_pixels(PlayerRelative::Own);
        if own.is_empty() {
            return BaseOrientation::BottomRight;
        }
        let mean_y = own.iter().map(|p| p.y as f64).sum::<f64>() / own.len() as f64;
        if mean_y <= TOP_LEFT_MAX_MEAN_ROW {
            BaseOrientation::TopLeft
        } else {
            BaseOrientation::BottomRight
        }
    }

    pub fn is_top_left(&self) -> bool {
        *self == BaseOrientation::TopLeft
    }

    /// Apply a screen offset, negated for a bottom-right base.
    pub fn transform_distance(&self, origin: Position, dx: i32, dy: i32) -> Position {
        match self {
            BaseOrientation::TopLeft => origin.offset(dx, dy),
            BaseOrientation::BottomRight => origin.offset(-dx, -dy),
        }
    }

    /// Mirror a minimap point through the map centre for a bottom-right base.
    pub fn transform_location(&self, location: Position) -> Position {
        match self {
            BaseOrientation::TopLeft => location,
            BaseOrientation::BottomRight => {
                Position::new(MINIMAP_EXTENT - location.x, MINIMAP_EXTENT - location.y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_own_block(y: i32) -> Observation {
        let mut obs = Observation::blank(84, 64);
        obs.minimap_player_relative
            .fill_rect(Position::new(10, y), 4, 4, PlayerRelative::Own.id());
        obs
    }

    #[test]
    fn test_detect_orientation() {
        assert_eq!(BaseOrientation::detect(&with_own_block(10)), BaseOrientation::TopLeft);
        assert_eq!(BaseOrientation::detect(&with_own_block(40)), BaseOrientation::BottomRight);
        assert_eq!(
            BaseOrientation::detect(&Observation::blank(84, 64)),
            BaseOrientation::BottomRight
        );
    }

    #[test]
    fn test_transforms() {
        let cc = Position::new(40, 30);
        assert_eq!(
            BaseOrientation::TopLeft.transform_distance(cc, -35, 0),
            Position::new(5, 30)
        );
        assert_eq!(
            BaseOrientation::BottomRight.transform_distance(cc, -35, 0),
            Position::new(75, 30)
        );
        assert_eq!(
            BaseOrientation::BottomRight.transform_location(Position::new(15, 47)),
            Position::new(49, 17)
        );
    }
}
