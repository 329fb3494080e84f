use std::collections::HashSet;

use crate::infra::Position;

use super::feature_layer::FeatureLayer;
use super::functions::FunctionId;

/// Unit type ids as they appear in the unit-type feature layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    CommandCenter,
    SupplyDepot,
    Refinery,
    Barracks,
    Factory,
    Starport,
    Scv,
    MineralField,
    VespeneGeyser,
}

impl UnitType {
    pub fn id(&self) -> i32 {
        match self {
            UnitType::CommandCenter => 18,
            UnitType::SupplyDepot => 19,
            UnitType::Refinery => 20,
            UnitType::Barracks => 21,
            UnitType::Factory => 27,
            UnitType::Starport => 28,
            UnitType::Scv => 45,
            UnitType::MineralField => 341,
            UnitType::VespeneGeyser => 342,
        }
    }
}

/// Ownership values of the player-relative feature layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerRelative {
    Own,
    Hostile,
}

impl PlayerRelative {
    pub fn id(&self) -> i32 {
        match self {
            PlayerRelative::Own => 1,
            PlayerRelative::Hostile => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepType {
    First,
    #[default]
    Mid,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerCounters {
    pub supply_used: i32,
    pub supply_max: i32,
    pub army_supply: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedUnit {
    pub unit_type: i32,
}

/// Read-only per-tick snapshot handed to an agent.
#[derive(Debug, Clone)]
pub struct Observation {
    pub step_type: StepType,
    pub reward: f64,
    pub screen_unit_type: FeatureLayer,
    pub screen_player_relative: FeatureLayer,
    pub minimap_player_relative: FeatureLayer,
    pub player: PlayerCounters,
    pub available_actions: HashSet<FunctionId>,
    pub single_select: Vec<SelectedUnit>,
    pub multi_select: Vec<SelectedUnit>,
}

impl Observation {
    /// An empty mid-episode snapshot with square layers of the given sizes.
    pub fn blank(screen_size: usize, minimap_size: usize) -> Self {
        Self {
            step_type: StepType::Mid,
            reward: 0.0,
            screen_unit_type: FeatureLayer::new(screen_size, screen_size),
            screen_player_relative: FeatureLayer::new(screen_size, screen_size),
            minimap_player_relative: FeatureLayer::new(minimap_size, minimap_size),
            player: PlayerCounters::default(),
            available_actions: HashSet::from([FunctionId::NoOp]),
            single_select: Vec::new(),
            multi_select: Vec::new(),
        }
    }

    pub fn is_first(&self) -> bool {
        self.step_type == StepType::First
    }

    pub fn is_last(&self) -> bool {
        self.step_type == StepType::Last
    }

    pub fn is_available(&self, function: FunctionId) -> bool {
        self.available_actions.contains(&function)
    }

    /// Screen pixels covered by units of the given type, row-major.
    pub fn unit_pixels(&self, unit: UnitType) -> Vec<Position> {
        self.screen_unit_type.positions_of(unit.id())
    }

    pub fn unit_pixel_count(&self, unit: UnitType) -> usize {
        self.screen_unit_type.count(unit.id())
    }

    pub fn minimap_pixels(&self, relative: PlayerRelative) -> Vec<Position> {
        self.minimap_player_relative.positions_of(relative.id())
    }

    /// True when the current selection is led by a unit of the given type.
    pub fn selection_led_by(&self, unit: UnitType) -> bool {
        let leads = |units: &[SelectedUnit]| {
            units
                .first()
                .is_some_and(|selected| selected.unit_type == unit.id())
        };
        leads(&self.single_select) || leads(&self.multi_select)
    }
}
