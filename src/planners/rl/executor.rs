//! Macro controller - turns one macro-action into host commands over three ticks

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::state::{FunctionCall, FunctionId, Modifier, Observation, UnitType};

use super::action_space::{ActionCatalog, MacroAction, Trainee};
use super::encoder::{BuildingCounts, StateEncoder, StateVector};
use super::policy::{NextState, QLearningTable};
use super::session::EpisodeSession;

/// Minimap distance of one step of attack jitter
const ATTACK_JITTER: i32 = 8;

/// Position in the three-tick control cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Learn from the last cycle, pick a macro-action, select the unit that carries it out
    #[default]
    SelectSource,
    /// Issue the build, train or attack order
    Commit,
    /// Send the builder back to mining
    Cleanup,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Phase::SelectSource => Phase::Commit,
            Phase::Commit => Phase::Cleanup,
            Phase::Cleanup => Phase::SelectSource,
        }
    }
}

/// The state/action pair awaiting its learning update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingDecision {
    state: StateVector,
    action: usize,
}

#[derive(Debug)]
pub struct MacroController {
    catalog: ActionCatalog,
    encoder: StateEncoder,
    phase: Phase,
    pending: Option<PendingDecision>,
    rng: StdRng,
}

impl MacroController {
    pub fn new(catalog: ActionCatalog, encoder: StateEncoder, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            catalog,
            encoder,
            phase: Phase::default(),
            pending: None,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// The macro-action chosen in the current cycle
    pub fn committed_action(&self) -> Option<MacroAction> {
        self.pending.and_then(|p| self.catalog.get(p.action))
    }

    /// Run one tick of the cycle; missing units or unavailable orders fall back to `no_op`
    pub fn tick(
        &mut self,
        obs: &Observation,
        session: &EpisodeSession,
        learner: &mut QLearningTable,
    ) -> FunctionCall {
        let phase = self.phase;
        self.phase = phase.next();

        let command = match phase {
            Phase::SelectSource => self.select_source(obs, session, learner),
            Phase::Commit => {
                let counts = self.encoder.building_counts(obs);
                self.commit(obs, session, &counts)
            }
            Phase::Cleanup => self.cleanup(obs),
        };

        command.unwrap_or_else(FunctionCall::no_op)
    }

    /// Apply the terminal update for the last decision and rewind; false if nothing was pending
    pub fn finish_episode(&mut self, learner: &mut QLearningTable, reward: f64) -> bool {
        self.phase = Phase::SelectSource;
        match self.pending.take() {
            Some(pending) => {
                learner.update(&pending.state.key(), pending.action, reward, NextState::Terminal);
                true
            }
            None => false,
        }
    }

    /// Drop any pending decision without learning from it
    pub fn reset(&mut self) {
        self.phase = Phase::SelectSource;
        self.pending = None;
    }

    fn select_source(
        &mut self,
        obs: &Observation,
        session: &EpisodeSession,
        learner: &mut QLearningTable,
    ) -> Option<FunctionCall> {
        let state = self.encoder.encode(obs, session.orientation);
        let key = state.key();

        if let Some(previous) = self.pending.take() {
            learner.update(
                &previous.state.key(),
                previous.action,
                0.0,
                NextState::State(&key),
            );
        }

        let action_index = learner.select_action(&key);
        self.pending = Some(PendingDecision {
            state,
            action: action_index,
        });

        let action = self.catalog.get(action_index)?;
        tracing::debug!(state = %key, action = %action, "macro action selected");

        match action {
            MacroAction::DoNothing => None,
            MacroAction::Build(_) => {
                let worker = *obs.unit_pixels(UnitType::Scv).choose(&mut self.rng)?;
                Some(FunctionCall::targeted(
                    FunctionId::SelectPoint,
                    Modifier::NotQueued,
                    worker,
                ))
            }
            MacroAction::Train(Trainee::Scv) => {
                let command_center = obs
                    .screen_unit_type
                    .centroid_of(UnitType::CommandCenter.id())?;
                Some(FunctionCall::targeted(
                    FunctionId::SelectPoint,
                    Modifier::SelectAllType,
                    command_center,
                ))
            }
            MacroAction::Train(trainee) => {
                let producer = *obs.unit_pixels(trainee.producer()).choose(&mut self.rng)?;
                Some(FunctionCall::targeted(
                    FunctionId::SelectPoint,
                    Modifier::SelectAllType,
                    producer,
                ))
            }
            MacroAction::Attack(_) => obs
                .is_available(FunctionId::SelectArmy)
                .then(|| FunctionCall::quick(FunctionId::SelectArmy, Modifier::NotQueued)),
        }
    }

    fn commit(
        &mut self,
        obs: &Observation,
        session: &EpisodeSession,
        counts: &BuildingCounts,
    ) -> Option<FunctionCall> {
        match self.committed_action()? {
            MacroAction::DoNothing => None,
            MacroAction::Build(building) => {
                let existing = usize::try_from(counts.of(building.unit_type())).ok()?;
                let &(dx, dy) = building.placement_slots().get(existing)?;
                if !obs.is_available(building.build_function()) {
                    return None;
                }
                let command_center = session.command_center?;
                let target = session
                    .orientation
                    .transform_distance(command_center, dx, dy);
                Some(FunctionCall::targeted(
                    building.build_function(),
                    Modifier::NotQueued,
                    target,
                ))
            }
            MacroAction::Train(trainee) => obs
                .is_available(trainee.train_function())
                .then(|| FunctionCall::quick(trainee.train_function(), Modifier::Queued)),
            MacroAction::Attack(bucket) => {
                if obs.selection_led_by(UnitType::Scv)
                    || !obs.is_available(FunctionId::AttackMinimap)
                {
                    return None;
                }
                let jitter_x = self.rng.random_range(-1..=1) * ATTACK_JITTER;
                let jitter_y = self.rng.random_range(-1..=1) * ATTACK_JITTER;
                let target = session
                    .orientation
                    .transform_location(bucket.offset(jitter_x, jitter_y));
                Some(FunctionCall::targeted(
                    FunctionId::AttackMinimap,
                    Modifier::NotQueued,
                    target,
                ))
            }
        }
    }

    fn cleanup(&mut self, obs: &Observation) -> Option<FunctionCall> {
        self.committed_action()?.building()?;
        if !obs.is_available(FunctionId::HarvestGather) {
            return None;
        }
        let mineral = *obs.unit_pixels(UnitType::MineralField).choose(&mut self.rng)?;
        Some(FunctionCall::targeted(
            FunctionId::HarvestGather,
            Modifier::Queued,
            mineral,
        ))
    }
}
