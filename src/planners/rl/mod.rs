//! Tabular Q-learning planner for build/train/attack macro-actions
//!
//! # Architecture
//!
//! ```text
//! Observation
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  EpisodeSession                                             │
//! │  - Base orientation and command center, cached per episode │
//! │  - Refinery setup that pre-empts the cycle                  │
//! └─────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StateEncoder                                               │
//! │  - Building counts from pixel footprints, army supply       │
//! │  - 2x2 enemy-presence grid, mirrored for bottom-right bases │
//! └─────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  QLearningTable                                             │
//! │  - Epsilon-greedy choice over the ActionCatalog             │
//! │  - One-step updates, terminal update at episode end         │
//! └─────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  MacroController                                            │
//! │  - Select source → commit order → cleanup, one per tick     │
//! │  - Returns one FunctionCall per tick                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod action_space;
pub mod agent;
pub mod encoder;
pub mod executor;
pub mod metrics;
pub mod persistence;
pub mod policy;
pub mod session;

pub use action_space::{ActionCatalog, Building, MacroAction, Trainee};
pub use agent::{BuildManagerAgent, BuildManagerConfig};
pub use encoder::{BuildingCounts, FootprintConfig, StateEncoder, StateVector};
pub use executor::{MacroController, Phase};
pub use metrics::{EpisodeMetrics, MovingAverage};
pub use persistence::{StoreError, TableStore};
pub use policy::{NextState, QLearningConfig, QLearningTable, QTable, Transition};
pub use session::EpisodeSession;
