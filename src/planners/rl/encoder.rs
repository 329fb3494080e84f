//! State encoder for RL - reduces an observation to the coarse Q-table key

use std::fmt;

use crate::state::{BaseOrientation, Observation, PlayerRelative, UnitType};

/// Number of fields in the encoded state
pub const STATE_SIZE: usize = 8;

/// Side length of one enemy-presence quadrant on the minimap
const QUADRANT_SIZE: usize = 32;

/// Approximate screen pixels covered by one building of each type.
///
/// Counts are `round(pixels / footprint)`; overlap or partial visibility skews them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintConfig {
    pub supply_depot: f64,
    pub barracks: f64,
    pub factory: f64,
    pub starport: f64,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            supply_depot: 69.0,
            barracks: 137.0,
            factory: 120.0,
            starport: 120.0,
        }
    }
}

/// Estimated building counts on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildingCounts {
    pub command_centers: i32,
    pub supply_depots: i32,
    pub barracks: i32,
    pub factories: i32,
    pub starports: i32,
}

impl BuildingCounts {
    pub fn of(&self, unit: UnitType) -> i32 {
        match unit {
            UnitType::CommandCenter => self.command_centers,
            UnitType::SupplyDepot => self.supply_depots,
            UnitType::Barracks => self.barracks,
            UnitType::Factory => self.factories,
            UnitType::Starport => self.starports,
            _ => 0,
        }
    }
}

/// Coarse battlefield state used as the Q-table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateVector {
    pub command_centers: i32,
    pub supply_depots: i32,
    pub barracks: i32,
    pub army_supply: i32,
    /// Enemy presence per minimap quadrant, canonicalised so index 0 is the own-base corner
    pub enemy_quadrants: [bool; 4],
}

impl StateVector {
    pub fn as_array(&self) -> [i32; STATE_SIZE] {
        let q = self.enemy_quadrants.map(i32::from);
        [
            self.command_centers,
            self.supply_depots,
            self.barracks,
            self.army_supply,
            q[0],
            q[1],
            q[2],
            q[3],
        ]
    }

    /// Canonical table key, e.g. `[1,2,0,6,0,0,0,1]`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self.as_array().iter().map(i32::to_string).collect();
        write!(f, "[{}]", fields.join(","))
    }
}

/// Converts observations into state vectors
#[derive(Debug, Clone, Default)]
pub struct StateEncoder {
    footprints: FootprintConfig,
}

impl StateEncoder {
    pub fn new(footprints: FootprintConfig) -> Self {
        Self { footprints }
    }

    pub fn footprints(&self) -> &FootprintConfig {
        &self.footprints
    }

    /// Estimate building counts from the unit-type screen layer
    pub fn building_counts(&self, obs: &Observation) -> BuildingCounts {
        let estimate = |unit: UnitType, footprint: f64| -> i32 {
            if footprint <= 0.0 {
                return 0;
            }
            (obs.unit_pixel_count(unit) as f64 / footprint).round_ties_even() as i32
        };

        BuildingCounts {
            command_centers: i32::from(obs.unit_pixel_count(UnitType::CommandCenter) > 0),
            supply_depots: estimate(UnitType::SupplyDepot, self.footprints.supply_depot),
            barracks: estimate(UnitType::Barracks, self.footprints.barracks),
            factories: estimate(UnitType::Factory, self.footprints.factory),
            starports: estimate(UnitType::Starport, self.footprints.starport),
        }
    }

    /// Enemy presence per quadrant of a 2x2 minimap partition, mirrored for a bottom-right base
    pub fn enemy_quadrants(&self, obs: &Observation, orientation: BaseOrientation) -> [bool; 4] {
        let mut quadrants = [false; 4];
        for enemy in obs.minimap_pixels(PlayerRelative::Hostile) {
            let row = (enemy.y as usize / QUADRANT_SIZE).min(1);
            let col = (enemy.x as usize / QUADRANT_SIZE).min(1);
            quadrants[row * 2 + col] = true;
        }

        if !orientation.is_top_left() {
            quadrants.reverse();
        }
        quadrants
    }

    pub fn encode(&self, obs: &Observation, orientation: BaseOrientation) -> StateVector {
        let counts = self.building_counts(obs);
        StateVector {
            command_centers: counts.command_centers,
            supply_depots: counts.supply_depots,
            barracks: counts.barracks,
            army_supply: obs.player.army_supply,
            enemy_quadrants: self.enemy_quadrants(obs, orientation),
        }
    }
}
