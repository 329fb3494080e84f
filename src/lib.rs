pub mod config;
pub mod game;
pub mod infra;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{AgentConfig, AgentKind, ConfigError};
pub use game::{Game, GameError};
pub use infra::{HostConnection, Position};
pub use planners::{Agent, AgentError, BuildManagerAgent, SimpleAgent};
