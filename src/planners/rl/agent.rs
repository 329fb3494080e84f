//! Learning build-manager agent - Q-table macro decisions executed by the macro controller

use std::path::PathBuf;

use crate::planners::{Agent, AgentError};
use crate::state::{FunctionCall, Observation};

use super::action_space::ActionCatalog;
use super::encoder::{FootprintConfig, StateEncoder};
use super::executor::MacroController;
use super::metrics::EpisodeMetrics;
use super::persistence::{StoreError, TableStore};
use super::policy::{QLearningConfig, QLearningTable};
use super::session::EpisodeSession;

/// Configuration for the learning agent
#[derive(Debug, Clone)]
pub struct BuildManagerConfig {
    /// Persisted table; None keeps the table in memory only
    pub data_file: Option<PathBuf>,
    pub learning: QLearningConfig,
    pub footprints: FootprintConfig,
}

impl Default for BuildManagerConfig {
    fn default() -> Self {
        Self {
            data_file: Some(PathBuf::from("bm_agent_data.json.gz")),
            learning: QLearningConfig::default(),
            footprints: FootprintConfig::default(),
        }
    }
}

pub struct BuildManagerAgent {
    catalog: ActionCatalog,
    learner: QLearningTable,
    controller: MacroController,
    session: Option<EpisodeSession>,
    store: Option<TableStore>,
    metrics: EpisodeMetrics,
}

impl BuildManagerAgent {
    /// Create the agent, loading a previously saved table when one exists
    pub fn new(config: BuildManagerConfig) -> Result<Self, StoreError> {
        let catalog = ActionCatalog::standard();
        let store = config.data_file.map(TableStore::new);

        let learner = match store.as_ref().map(|s| s.load(&catalog)).transpose()?.flatten() {
            Some(table) => QLearningTable::with_table(table, config.learning.clone()),
            None => QLearningTable::new(catalog.len(), config.learning.clone()),
        };

        let controller_seed = config.learning.seed.map(|seed| seed.wrapping_add(1));
        let controller = MacroController::new(
            catalog.clone(),
            StateEncoder::new(config.footprints),
            controller_seed,
        );

        Ok(Self {
            catalog,
            learner,
            controller,
            session: None,
            store,
            metrics: EpisodeMetrics::default(),
        })
    }

    pub fn learner(&self) -> &QLearningTable {
        &self.learner
    }

    pub fn controller(&self) -> &MacroController {
        &self.controller
    }

    pub fn session(&self) -> Option<&EpisodeSession> {
        self.session.as_ref()
    }

    pub fn metrics(&self) -> &EpisodeMetrics {
        &self.metrics
    }

    fn end_episode(&mut self, obs: &Observation) -> Result<FunctionCall, AgentError> {
        let learned = self.controller.finish_episode(&mut self.learner, obs.reward);
        if !learned {
            tracing::warn!("Episode ended before any macro action was taken");
        }

        let ticks = self.session.take().map_or(0, |session| session.ticks + 1);
        if let Some(store) = &self.store {
            store.save(self.learner.table(), &self.catalog)?;
        }

        self.metrics
            .record_episode(obs.reward, ticks, self.learner.table().len());
        self.metrics.log_summary();

        Ok(FunctionCall::no_op())
    }
}

impl Agent for BuildManagerAgent {
    fn name(&self) -> &'static str {
        "bm_agent"
    }

    fn step(&mut self, obs: &Observation) -> Result<FunctionCall, AgentError> {
        if obs.is_last() {
            return self.end_episode(obs);
        }

        if obs.is_first() {
            self.controller.reset();
            self.session = None;
        }
        let session = self
            .session
            .get_or_insert_with(|| EpisodeSession::begin(obs));
        session.ticks += 1;

        if let Some(command) = session.gas_setup(obs) {
            return Ok(command);
        }

        Ok(self.controller.tick(obs, session, &mut self.learner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Position;
    use crate::state::{FunctionId, PlayerRelative, StepType, UnitType};

    fn in_memory(seed: u64) -> BuildManagerAgent {
        BuildManagerAgent::new(BuildManagerConfig {
            data_file: None,
            learning: QLearningConfig {
                seed: Some(seed),
                ..QLearningConfig::default()
            },
            footprints: FootprintConfig::default(),
        })
        .unwrap()
    }

    fn observation(step_type: StepType) -> Observation {
        let mut obs = Observation::blank(84, 64);
        obs.step_type = step_type;
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

    #[test]
    fn test_refinery_setup_preempts_phase_machine() {
        let mut agent = in_memory(1);
        let mut obs = observation(StepType::First);
        obs.available_actions.insert(FunctionId::BuildRefinery);

        let command = agent.step(&obs).unwrap();
        assert_eq!(command.function, FunctionId::BuildRefinery);
        assert_eq!(command.target(), Some(Position::new(13, 43)));
        assert!(agent.controller().committed_action().is_none());
        assert_eq!(agent.session().unwrap().refineries_ordered(), 1);
    }

    #[test]
    fn test_cycle_then_terminal_update() {
        let mut agent = in_memory(2);
        let first = observation(StepType::First);
        let mid = observation(StepType::Mid);

        agent.step(&first).unwrap();
        agent.step(&mid).unwrap();
        agent.step(&mid).unwrap();
        agent.step(&mid).unwrap();
        assert_eq!(agent.session().unwrap().ticks, 4);
        assert!(agent.controller().committed_action().is_some());

        let mut last = observation(StepType::Last);
        last.reward = 1.0;
        let command = agent.step(&last).unwrap();

        assert!(command.is_no_op());
        assert!(agent.session().is_none());
        assert!(agent.controller().committed_action().is_none());
        assert_eq!(agent.metrics().episodes, 1);
        assert_eq!(agent.metrics().wins, 1);

        let max_value = agent
            .learner()
            .table()
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(max_value > 0.0);
    }

    #[test]
    fn test_table_persisted_and_reloaded() {
        let dir = std::env::temp_dir().join(format!("scbot-agent-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let config = BuildManagerConfig {
            data_file: Some(dir.join("bm_agent_data.json.gz")),
            learning: QLearningConfig {
                seed: Some(3),
                ..QLearningConfig::default()
            },
            footprints: FootprintConfig::default(),
        };

        let mut agent = BuildManagerAgent::new(config.clone()).unwrap();
        agent.step(&observation(StepType::First)).unwrap();
        let mut last = observation(StepType::Last);
        last.reward = -1.0;
        agent.step(&last).unwrap();

        let reloaded = BuildManagerAgent::new(config).unwrap();
        assert_eq!(reloaded.learner().table(), agent.learner().table());
        assert!(!reloaded.learner().table().is_empty());
    }
}
