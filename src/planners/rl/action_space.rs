//! Macro-action catalog - the fixed, indexed menu the Q-table scores

use std::fmt;

use crate::infra::Position;
use crate::state::{FunctionId, UnitType};

/// Minimap side length used to lay out attack buckets
pub const MINIMAP_SIZE: i32 = 64;
/// Side length of one attack coordinate bucket
pub const BUCKET_SIZE: i32 = 32;
/// Offset from a bucket's last cell to its centre
pub const BUCKET_BORDER: i32 = 16;

/// Structures the agent can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Building {
    SupplyDepot,
    Barracks,
    Factory,
    Starport,
}

impl Building {
    pub fn unit_type(&self) -> UnitType {
        match self {
            Building::SupplyDepot => UnitType::SupplyDepot,
            Building::Barracks => UnitType::Barracks,
            Building::Factory => UnitType::Factory,
            Building::Starport => UnitType::Starport,
        }
    }

    pub fn build_function(&self) -> FunctionId {
        match self {
            Building::SupplyDepot => FunctionId::BuildSupplyDepot,
            Building::Barracks => FunctionId::BuildBarracks,
            Building::Factory => FunctionId::BuildFactory,
            Building::Starport => FunctionId::BuildStarport,
        }
    }

    /// Placement offsets from the command center, one per existing instance.
    pub fn placement_slots(&self) -> &'static [(i32, i32)] {
        match self {
            Building::SupplyDepot => &[(-35, 0), (-25, -25)],
            Building::Barracks | Building::Factory | Building::Starport => &[(15, -9), (15, 12)],
        }
    }
}

/// Units the agent can queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trainee {
    Scv,
    Marine,
    Hellion,
    Medivac,
}

impl Trainee {
    /// The structure that has to be selected to queue this unit
    pub fn producer(&self) -> UnitType {
        match self {
            Trainee::Scv => UnitType::CommandCenter,
            Trainee::Marine => UnitType::Barracks,
            Trainee::Hellion => UnitType::Factory,
            Trainee::Medivac => UnitType::Starport,
        }
    }

    pub fn train_function(&self) -> FunctionId {
        match self {
            Trainee::Scv => FunctionId::TrainScv,
            Trainee::Marine => FunctionId::TrainMarine,
            Trainee::Hellion => FunctionId::TrainHellion,
            Trainee::Medivac => FunctionId::TrainMedivac,
        }
    }
}

/// One discrete high-level decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroAction {
    DoNothing,
    Build(Building),
    Train(Trainee),
    /// Attack-move towards a minimap bucket centre
    Attack(Position),
}

impl MacroAction {
    pub fn name(&self) -> String {
        match self {
            MacroAction::DoNothing => "donothing".to_string(),
            MacroAction::Build(Building::SupplyDepot) => "buildsupplydepot".to_string(),
            MacroAction::Build(Building::Barracks) => "buildbarracks".to_string(),
            MacroAction::Build(Building::Factory) => "buildfactory".to_string(),
            MacroAction::Build(Building::Starport) => "buildstarport".to_string(),
            MacroAction::Train(Trainee::Marine) => "buildmarine".to_string(),
            MacroAction::Train(Trainee::Hellion) => "buildhellion".to_string(),
            MacroAction::Train(Trainee::Medivac) => "buildmedivac".to_string(),
            MacroAction::Train(Trainee::Scv) => "buildscv".to_string(),
            MacroAction::Attack(bucket) => format!("attack_{}_{}", bucket.x, bucket.y),
        }
    }

    /// Parse a catalog name such as `buildbarracks` or `attack_15_47`
    pub fn parse(name: &str) -> Option<Self> {
        let action = match name {
            "donothing" => MacroAction::DoNothing,
            "buildsupplydepot" => MacroAction::Build(Building::SupplyDepot),
            "buildbarracks" => MacroAction::Build(Building::Barracks),
            "buildfactory" => MacroAction::Build(Building::Factory),
            "buildstarport" => MacroAction::Build(Building::Starport),
            "buildmarine" => MacroAction::Train(Trainee::Marine),
            "buildhellion" => MacroAction::Train(Trainee::Hellion),
            "buildmedivac" => MacroAction::Train(Trainee::Medivac),
            "buildscv" => MacroAction::Train(Trainee::Scv),
            other => {
                let mut parts = other.strip_prefix("attack_")?.split('_');
                let x = parts.next()?.parse().ok()?;
                let y = parts.next()?.parse().ok()?;
                if parts.next().is_some() {
                    return None;
                }
                MacroAction::Attack(Position::new(x, y))
            }
        };
        Some(action)
    }

    pub fn building(&self) -> Option<Building> {
        match self {
            MacroAction::Build(building) => Some(*building),
            _ => None,
        }
    }
}

impl fmt::Display for MacroAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Immutable, indexed list of macro-actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCatalog {
    actions: Vec<MacroAction>,
}

impl ActionCatalog {
    /// The standard menu: idle, builds, trains, then one attack per minimap bucket
    pub fn standard() -> Self {
        let mut actions = vec![
            MacroAction::DoNothing,
            MacroAction::Build(Building::SupplyDepot),
            MacroAction::Build(Building::Barracks),
            MacroAction::Train(Trainee::Marine),
            MacroAction::Build(Building::Factory),
            MacroAction::Train(Trainee::Hellion),
            MacroAction::Build(Building::Starport),
            MacroAction::Train(Trainee::Medivac),
            MacroAction::Train(Trainee::Scv),
        ];

        for mm_x in 0..MINIMAP_SIZE {
            for mm_y in 0..MINIMAP_SIZE {
                if (mm_x + 1) % BUCKET_SIZE == 0 && (mm_y + 1) % BUCKET_SIZE == 0 {
                    actions.push(MacroAction::Attack(Position::new(
                        mm_x - BUCKET_BORDER,
                        mm_y - BUCKET_BORDER,
                    )));
                }
            }
        }

        Self { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<MacroAction> {
        self.actions.get(index).copied()
    }

    pub fn index_of(&self, action: MacroAction) -> Option<usize> {
        self.actions.iter().position(|a| *a == action)
    }

    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        MacroAction::parse(name).and_then(|action| self.index_of(action))
    }

    pub fn names(&self) -> Vec<String> {
        self.actions.iter().map(MacroAction::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, MacroAction)> + '_ {
        self.actions.iter().copied().enumerate()
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_layout() {
        let catalog = ActionCatalog::standard();
        assert_eq!(catalog.len(), 13);
        assert_eq!(catalog.get(0), Some(MacroAction::DoNothing));
        assert_eq!(
            catalog.names()[9..],
            ["attack_15_15", "attack_15_47", "attack_47_15", "attack_47_47"]
        );
        assert_eq!(catalog.get(13), None);
    }

    #[test]
    fn test_names_parse_back_to_same_index() {
        let catalog = ActionCatalog::standard();
        for (index, action) in catalog.iter() {
            assert_eq!(catalog.index_of_name(&action.name()), Some(index));
        }
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        assert_eq!(MacroAction::parse("attack_15"), None);
        assert_eq!(MacroAction::parse("attack_1_2_3"), None);
        assert_eq!(MacroAction::parse("buildnuke"), None);
        assert_eq!(
            MacroAction::parse("attack_-3_40"),
            Some(MacroAction::Attack(Position::new(-3, 40)))
        );
    }

    #[test]
    fn test_placement_slots_cap_at_two() {
        for building in [
            Building::SupplyDepot,
            Building::Barracks,
            Building::Factory,
            Building::Starport,
        ] {
            assert_eq!(building.placement_slots().len(), 2);
        }
        assert_eq!(Building::SupplyDepot.placement_slots()[0], (-35, 0));
    }
}
