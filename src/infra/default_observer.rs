use tracing::{debug, info, warn};

use super::game_observer::AgentObserver;
use crate::state::{FunctionCall, Observation};

pub struct DefaultObserver;

impl AgentObserver for DefaultObserver {
    fn on_episode_start(&mut self, episode: usize, agent_name: &str) {
        info!("Episode {} started with {}", episode, agent_name);
    }

    fn on_state_update(&mut self, tick: usize, obs: &Observation) {
        debug!(
            "tick: {}, supply: {}/{}, army: {}, actions available: {}",
            tick,
            obs.player.supply_used,
            obs.player.supply_max,
            obs.player.army_supply,
            obs.available_actions.len(),
        );
    }

    fn on_command_issued(&mut self, tick: usize, command: &FunctionCall) {
        if !command.is_no_op() {
            debug!("tick: {}, command: {} {:?}", tick, command.function, command.arguments);
        }
    }

    fn on_episode_finished(&mut self, episode: usize, reward: f64, ticks: usize) {
        info!("Episode {} finished with reward {}", episode, reward);
        info!("Final tick: {}", ticks);
    }

    fn on_slow_tick(&mut self, tick: usize, millis: f64) {
        warn!("Tick {} took {:.2}ms", tick, millis);
    }
}
