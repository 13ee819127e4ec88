// =============================================================================
// stockview — historical stock indicators as of a simulated date
// =============================================================================

pub mod api;
pub mod app_state;
pub mod assembler;
pub mod config;
pub mod error;
pub mod indicators;
pub mod overlay;
pub mod series;
pub mod service;
pub mod store;
pub mod timeframe;
pub mod types;
