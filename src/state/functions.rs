use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::infra::Position;

/// Host command identifiers used by the agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionId {
    NoOp,
    SelectPoint,
    SelectArmy,
    BuildSupplyDepot,
    BuildBarracks,
    BuildRefinery,
    BuildFactory,
    BuildStarport,
    TrainScv,
    TrainMarine,
    TrainHellion,
    TrainMedivac,
    AttackMinimap,
    HarvestGather,
    RallyUnitsMinimap,
}

impl FunctionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionId::NoOp => "no_op",
            FunctionId::SelectPoint => "select_point",
            FunctionId::SelectArmy => "select_army",
            FunctionId::BuildSupplyDepot => "Build_SupplyDepot_screen",
            FunctionId::BuildBarracks => "Build_Barracks_screen",
            FunctionId::BuildRefinery => "Build_Refinery_screen",
            FunctionId::BuildFactory => "Build_Factory_screen",
            FunctionId::BuildStarport => "Build_Starport_screen",
            FunctionId::TrainScv => "Train_SCV_quick",
            FunctionId::TrainMarine => "Train_Marine_quick",
            FunctionId::TrainHellion => "Train_Hellion_quick",
            FunctionId::TrainMedivac => "Train_Medivac_quick",
            FunctionId::AttackMinimap => "Attack_minimap",
            FunctionId::HarvestGather => "Harvest_Gather_screen",
            FunctionId::RallyUnitsMinimap => "Rally_Units_minimap",
        }
    }
}

impl FromStr for FunctionId {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "no_op" => Ok(FunctionId::NoOp),
            "select_point" => Ok(FunctionId::SelectPoint),
            "select_army" => Ok(FunctionId::SelectArmy),
            "Build_SupplyDepot_screen" => Ok(FunctionId::BuildSupplyDepot),
            "Build_Barracks_screen" => Ok(FunctionId::BuildBarracks),
            "Build_Refinery_screen" => Ok(FunctionId::BuildRefinery),
            "Build_Factory_screen" => Ok(FunctionId::BuildFactory),
            "Build_Starport_screen" => Ok(FunctionId::BuildStarport),
            "Train_SCV_quick" => Ok(FunctionId::TrainScv),
            "Train_Marine_quick" => Ok(FunctionId::TrainMarine),
            "Train_Hellion_quick" => Ok(FunctionId::TrainHellion),
            "Train_Medivac_quick" => Ok(FunctionId::TrainMedivac),
            "Attack_minimap" => Ok(FunctionId::AttackMinimap),
            "Harvest_Gather_screen" => Ok(FunctionId::HarvestGather),
            "Rally_Units_minimap" => Ok(FunctionId::RallyUnitsMinimap),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FunctionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// First argument of every command: queueing for orders, selection mode for `select_point`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    NotQueued,
    Queued,
    SelectAllType,
}

impl Modifier {
    pub fn value(&self) -> i32 {
        match self {
            Modifier::NotQueued => 0,
            Modifier::Queued => 1,
            Modifier::SelectAllType => 2,
        }
    }
}

/// One command returned to the host per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    pub function: FunctionId,
    pub arguments: Vec<Vec<i32>>,
}

impl FunctionCall {
    pub fn no_op() -> Self {
        Self {
            function: FunctionId::NoOp,
            arguments: Vec::new(),
        }
    }

    /// A command without a target, e.g. `Train_Marine_quick` or `select_army`.
    pub fn quick(function: FunctionId, modifier: Modifier) -> Self {
        Self {
            function,
            arguments: vec![vec![modifier.value()]],
        }
    }

    /// A command aimed at a screen or minimap point.
    pub fn targeted(function: FunctionId, modifier: Modifier, target: Position) -> Self {
        Self {
            function,
            arguments: vec![vec![modifier.value()], vec![target.x, target.y]],
        }
    }

    pub fn is_no_op(&self) -> bool {
        self.function == FunctionId::NoOp
    }

    pub fn target(&self) -> Option<Position> {
        match self.arguments.get(1).map(Vec::as_slice) {
            Some([x, y]) => Some(Position::new(*x, *y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_names_parse_back() {
        for function in [
            FunctionId::NoOp,
            FunctionId::SelectPoint,
            FunctionId::BuildRefinery,
            FunctionId::TrainScv,
            FunctionId::RallyUnitsMinimap,
        ] {
            assert_eq!(function.as_str().parse::<FunctionId>(), Ok(function));
        }
        assert!("move_camera".parse::<FunctionId>().is_err());
    }

    #[test]
    fn test_targeted_command_shape() {
        let call = FunctionCall::targeted(
            FunctionId::BuildBarracks,
            Modifier::NotQueued,
            Position::new(40, 12),
        );
        assert_eq!(call.arguments, vec![vec![0], vec![40, 12]]);
        assert_eq!(call.target(), Some(Position::new(40, 12)));
        assert!(FunctionCall::quick(FunctionId::TrainMarine, Modifier::Queued)
            .target()
            .is_none());
    }

    #[test]
    fn test_command_serializes_with_host_name() {
        let call = FunctionCall::quick(FunctionId::SelectArmy, Modifier::NotQueued);
        let json = serde_json::to_string(&call).unwrap();
        assert_eq!(json, r#"{"function":"select_army","arguments":[[0]]}"#);
    }
}
