mod feature_layer;
mod functions;
mod observation;
mod orientation;

pub use feature_layer::FeatureLayer;
pub use functions::{FunctionCall, FunctionId, Modifier};
pub use observation::{
    Observation, PlayerCounters, PlayerRelative, SelectedUnit, StepType, UnitType,
};
pub use orientation::{BaseOrientation, MINIMAP_EXTENT};
