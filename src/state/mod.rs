//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: Where a search run is (idle, searching, enriching, done)
//! - `StateError`: A rejected state change

mod run_state;

// Re-export main types
pub use run_state::{RunState, StateError};
