use std::thread;
use std::time::Duration;

use crate::infra::Position;
use crate::planners::{Agent, AgentError};
use crate::state::{BaseOrientation, FunctionCall, FunctionId, Modifier, Observation, UnitType};

/// Rally point for new units, per base corner
const RALLY_TOP_LEFT: Position = Position { x: 29, y: 21 };
const RALLY_BOTTOM_RIGHT: Position = Position { x: 29, y: 46 };
/// Attack target, per base corner
const ATTACK_TOP_LEFT: Position = Position { x: 39, y: 45 };
const ATTACK_BOTTOM_RIGHT: Position = Position { x: 21, y: 24 };

/// Progress through the opening; reset on every first tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOrderProgress {
    pub orientation: Option<BaseOrientation>,
    pub scv_selected: bool,
    pub supply_depot_built: bool,
    pub refinery_built: bool,
    pub barracks_built: bool,
    pub barracks_selected: bool,
    pub barracks_rallied: bool,
    pub army_selected: bool,
    pub army_rallied: bool,
}

/// Fixed opening: depot, refinery, barracks, rally, marines, one attack
#[derive(Debug, Default)]
pub struct SimpleAgent {
    progress: BuildOrderProgress,
    step_delay: Duration,
}

impl SimpleAgent {
    pub fn new(step_delay: Duration) -> Self {
        Self {
            progress: BuildOrderProgress::default(),
            step_delay,
        }
    }

    pub fn progress(&self) -> &BuildOrderProgress {
        &self.progress
    }

    fn next_command(&mut self, obs: &Observation) -> Option<FunctionCall> {
        let orientation = *self
            .progress
            .orientation
            .get_or_insert_with(|| BaseOrientation::detect(obs));
        let progress = &mut self.progress;

        if !progress.supply_depot_built {
            if !progress.scv_selected {
                return select_worker(obs).inspect(|_| progress.scv_selected = true);
            }
            if obs.is_available(FunctionId::BuildSupplyDepot) {
                let command_center = command_center(obs)?;
                progress.supply_depot_built = true;
                return Some(FunctionCall::targeted(
                    FunctionId::BuildSupplyDepot,
                    Modifier::NotQueued,
                    orientation.transform_distance(command_center, 0, 20),
                ));
            }
        } else if !progress.refinery_built {
            if !progress.scv_selected {
                return select_worker(obs).inspect(|_| progress.scv_selected = true);
            }
            if obs.is_available(FunctionId::BuildRefinery) {
                let command_center = command_center(obs)?;
                let geyser = obs
                    .unit_pixels(UnitType::VespeneGeyser)
                    .into_iter()
                    .min_by_key(|p| p.distance_squared(&command_center))?;
                progress.refinery_built = true;
                tracing::debug!("Building refinery at ({}, {})", geyser.x, geyser.y);
                return Some(FunctionCall::targeted(
                    FunctionId::BuildRefinery,
                    Modifier::NotQueued,
                    geyser,
                ));
            }
        } else if !progress.barracks_built {
            if obs.is_available(FunctionId::BuildBarracks) {
                let command_center = command_center(obs)?;
                progress.barracks_built = true;
                return Some(FunctionCall::targeted(
                    FunctionId::BuildBarracks,
                    Modifier::NotQueued,
                    orientation.transform_distance(command_center, 20, 0),
                ));
            }
        } else if !progress.barracks_rallied {
            if !progress.barracks_selected {
                let barracks = mean_pixel(obs, UnitType::Barracks)?;
                progress.barracks_selected = true;
                return Some(FunctionCall::targeted(
                    FunctionId::SelectPoint,
                    Modifier::NotQueued,
                    barracks,
                ));
            }
            progress.barracks_rallied = true;
            let rally = if orientation.is_top_left() {
                RALLY_TOP_LEFT
            } else {
                RALLY_BOTTOM_RIGHT
            };
            return Some(FunctionCall::targeted(
                FunctionId::RallyUnitsMinimap,
                Modifier::NotQueued,
                rally,
            ));
        } else if obs.player.supply_used < obs.player.supply_max
            && obs.is_available(FunctionId::TrainMarine)
        {
            return Some(FunctionCall::quick(FunctionId::TrainMarine, Modifier::Queued));
        } else if !progress.army_rallied {
            if !progress.army_selected {
                if obs.is_available(FunctionId::SelectArmy) {
                    progress.army_selected = true;
                    progress.barracks_selected = false;
                    return Some(FunctionCall::quick(
                        FunctionId::SelectArmy,
                        Modifier::NotQueued,
                    ));
                }
            } else if obs.is_available(FunctionId::AttackMinimap) {
                progress.army_rallied = true;
                progress.army_selected = false;
                let target = if orientation.is_top_left() {
                    ATTACK_TOP_LEFT
                } else {
                    ATTACK_BOTTOM_RIGHT
                };
                return Some(FunctionCall::targeted(
                    FunctionId::AttackMinimap,
                    Modifier::NotQueued,
                    target,
                ));
            }
        }

        None
    }
}

fn select_worker(obs: &Observation) -> Option<FunctionCall> {
    let worker = obs.unit_pixels(UnitType::Scv).first().copied()?;
    Some(FunctionCall::targeted(
        FunctionId::SelectPoint,
        Modifier::NotQueued,
        worker,
    ))
}

fn command_center(obs: &Observation) -> Option<Position> {
    mean_pixel(obs, UnitType::CommandCenter)
}

/// Mean pixel of a unit mask, truncated toward the origin
fn mean_pixel(obs: &Observation, unit: UnitType) -> Option<Position> {
    let pixels = obs.unit_pixels(unit);
    if pixels.is_empty() {
        return None;
    }
    let n = pixels.len() as f64;
    let (sx, sy) = pixels
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + f64::from(p.x), sy + f64::from(p.y)));
    Some(Position::new((sx / n) as i32, (sy / n) as i32))
}

impl Agent for SimpleAgent {
    fn name(&self) -> &'static str {
        "simple_agent"
    }

    fn step(&mut self, obs: &Observation) -> Result<FunctionCall, AgentError> {
        if obs.is_first() {
            self.progress = BuildOrderProgress::default();
        }
        if !self.step_delay.is_zero() {
            thread::sleep(self.step_delay);
        }

        Ok(self.next_command(obs).unwrap_or_else(FunctionCall::no_op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PlayerRelative, StepType};

    fn observation() -> Observation {
        let mut obs = Observation::blank(84, 64);
        obs.step_type = StepType::First;
        obs.minimap_player_relative
            .fill_rect(Position::new(12, 12), 6, 6, PlayerRelative::Own.id());
        obs.screen_unit_type
            .fill_rect(Position::new(40, 40), 11, 11, UnitType::CommandCenter.id());
        obs.screen_unit_type
            .fill_rect(Position::new(60, 20), 2, 2, UnitType::Scv.id());
        obs.screen_unit_type
            .fill_rect(Position::new(10, 40), 7, 7, UnitType::VespeneGeyser.id());
        obs
    }

    fn step(agent: &mut SimpleAgent, obs: &mut Observation) -> FunctionCall {
        let command = agent.step(obs).unwrap();
        obs.step_type = StepType::Mid;
        command
    }

    #[test]
    fn test_opening_sequence() {
        let mut agent = SimpleAgent::default();
        let mut obs = observation();

        let select = step(&mut agent, &mut obs);
        assert_eq!(select.function, FunctionId::SelectPoint);
        assert_eq!(select.target(), Some(Position::new(60, 20)));

        // waiting for the build menu
        assert!(step(&mut agent, &mut obs).is_no_op());

        obs.available_actions.insert(FunctionId::BuildSupplyDepot);
        let depot = step(&mut agent, &mut obs);
        assert_eq!(depot.function, FunctionId::BuildSupplyDepot);
        assert_eq!(depot.target(), Some(Position::new(45, 65)));

        obs.available_actions.insert(FunctionId::BuildRefinery);
        let refinery = step(&mut agent, &mut obs);
        assert_eq!(refinery.function, FunctionId::BuildRefinery);
        assert_eq!(refinery.target(), Some(Position::new(16, 45)));

        obs.available_actions.insert(FunctionId::BuildBarracks);
        let barracks = step(&mut agent, &mut obs);
        assert_eq!(barracks.target(), Some(Position::new(65, 45)));

        assert!(step(&mut agent, &mut obs).is_no_op(), "no barracks on screen yet");
        obs.screen_unit_type
            .fill_rect(Position::new(62, 40), 6, 6, UnitType::Barracks.id());
        let select_barracks = step(&mut agent, &mut obs);
        assert_eq!(select_barracks.target(), Some(Position::new(64, 42)));

        let rally = step(&mut agent, &mut obs);
        assert_eq!(rally.function, FunctionId::RallyUnitsMinimap);
        assert_eq!(rally.target(), Some(RALLY_TOP_LEFT));

        obs.player.supply_used = 14;
        obs.player.supply_max = 15;
        obs.available_actions.insert(FunctionId::TrainMarine);
        assert_eq!(step(&mut agent, &mut obs).function, FunctionId::TrainMarine);

        obs.player.supply_used = 15;
        obs.available_actions.insert(FunctionId::SelectArmy);
        obs.available_actions.insert(FunctionId::AttackMinimap);
        assert_eq!(step(&mut agent, &mut obs).function, FunctionId::SelectArmy);
        let attack = step(&mut agent, &mut obs);
        assert_eq!(attack.function, FunctionId::AttackMinimap);
        assert_eq!(attack.target(), Some(ATTACK_TOP_LEFT));

        assert!(agent.progress().army_rallied);
        assert!(step(&mut agent, &mut obs).is_no_op());
    }

    #[test]
    fn test_build_targets_truncate_the_command_center_mean() {
        let mut agent = SimpleAgent::default();
        let mut obs = observation();
        // a 12x12 command center has its mean at (45.5, 45.5)
        obs.screen_unit_type
            .fill_rect(Position::new(40, 40), 12, 12, UnitType::CommandCenter.id());
        obs.available_actions.insert(FunctionId::BuildSupplyDepot);

        step(&mut agent, &mut obs);
        let depot = step(&mut agent, &mut obs);
        assert_eq!(depot.target(), Some(Position::new(45, 65)));
    }

    #[test]
    fn test_missing_worker_is_no_op() {
        let mut agent = SimpleAgent::default();
        let mut obs = Observation::blank(84, 64);
        obs.step_type = StepType::First;
        assert!(step(&mut agent, &mut obs).is_no_op());
        assert!(!agent.progress().scv_selected);
    }

    #[test]
    fn test_first_tick_resets_progress() {
        let mut agent = SimpleAgent::default();
        let mut obs = observation();
        step(&mut agent, &mut obs);
        assert!(agent.progress().scv_selected);

        obs.step_type = StepType::First;
        step(&mut agent, &mut obs);
        assert!(agent.progress().scv_selected);
        assert!(!agent.progress().supply_depot_built);
        assert_eq!(agent.progress().orientation, Some(BaseOrientation::TopLeft));
    }
}
