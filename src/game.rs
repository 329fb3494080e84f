use std::io::{BufRead, Write};
use std::time::Instant;

use thiserror::Error;

use crate::infra::{AgentObserver, BridgeError, HostConnection};
use crate::planners::{Agent, AgentError};

/// Host tick budget before a warning is raised
const SLOW_TICK_MS: f64 = 100.0;

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub episodes: usize,
    pub ticks: usize,
}

pub struct Game<R, W> {
    connection: HostConnection<R, W>,
    observer: Box<dyn AgentObserver>,
}

impl<R: BufRead, W: Write> Game<R, W> {
    pub fn new(connection: HostConnection<R, W>, observer: impl AgentObserver + 'static) -> Self {
        Self {
            connection,
            observer: Box::new(observer),
        }
    }

    /// Drive `agent` until the host closes the connection
    pub fn run(&mut self, agent: &mut dyn Agent) -> Result<RunSummary, GameError> {
        let mut summary = RunSummary::default();
        let mut episode_tick = 0;

        while let Some(frame) = self.connection.next_frame()? {
            let tick_start = Instant::now();
            let obs = frame.to_observation()?;

            if obs.is_first() {
                summary.episodes += 1;
                episode_tick = 0;
                self.observer.on_episode_start(summary.episodes, agent.name());
            }
            episode_tick += 1;
            summary.ticks += 1;

            self.observer.on_state_update(episode_tick, &obs);
            let command = agent.step(&obs)?;
            self.observer.on_command_issued(episode_tick, &command);
            self.connection.send(&frame, &command)?;

            if obs.is_last() {
                self.observer
                    .on_episode_finished(summary.episodes, obs.reward, episode_tick);
            }

            let tick_millis = tick_start.elapsed().as_secs_f64() * 1000.0;
            if tick_millis > SLOW_TICK_MS {
                self.observer.on_slow_tick(episode_tick, tick_millis);
            }
        }

        tracing::info!(
            "Host closed the connection after {} episodes ({} ticks)",
            summary.episodes,
            summary.ticks
        );
        Ok(summary)
    }

    pub fn into_connection(self) -> HostConnection<R, W> {
        self.connection
    }
}
