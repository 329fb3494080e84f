//! Scripted opening without learning

mod build_order;

pub use build_order::{BuildOrderProgress, SimpleAgent};
