use crate::state::{FunctionCall, Observation};

/// Trait for observing the run loop
pub trait AgentObserver {
    /// Called on the first tick of an episode
    fn on_episode_start(&mut self, episode: usize, agent_name: &str);

    /// Called for every observation, before the agent acts
    fn on_state_update(&mut self, tick: usize, obs: &Observation);

    /// Called with the command about to be sent to the host
    fn on_command_issued(&mut self, tick: usize, command: &FunctionCall);

    /// Called on the last tick of an episode
    fn on_episode_finished(&mut self, episode: usize, reward: f64, ticks: usize);

    /// Called when a tick took longer than the host's budget
    fn on_slow_tick(&mut self, _tick: usize, _millis: f64) {
        // Default implementation does nothing
    }
}
