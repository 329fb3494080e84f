mod default_observer;
mod game_observer;
pub mod host;
mod types;

pub use default_observer::DefaultObserver;
pub use game_observer::AgentObserver;
pub use host::{BridgeError, HostConnection, ObservationFrame};
pub use types::{Position, centroid};
