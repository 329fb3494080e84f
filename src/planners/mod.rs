pub mod rl;
pub mod scripted;

use thiserror::Error;

use crate::state::{FunctionCall, Observation};

pub use rl::BuildManagerAgent;
pub use scripted::SimpleAgent;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Store(#[from] rl::StoreError),
}

/// A plugin driven by the host: one observation in, exactly one command out per tick.
pub trait Agent {
    fn name(&self) -> &'static str;

    fn step(&mut self, obs: &Observation) -> Result<FunctionCall, AgentError>;
}
