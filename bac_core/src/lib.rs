#![forbid(unsafe_code)]

//! Core domain model and estimation engine for bactrack.
//!
//! This crate provides:
//! - Domain types (profile, drink events, tracking session, BAC snapshot)
//! - The Widmark-based decay model and per-drink aggregation
//! - Impairment classification and sober-time projection
//! - Input validation and output sanity checks
//! - The periodic recompute scheduler
//! - Drink presets, configuration, and on-disk session state

pub mod types;
pub mod error;
pub mod units;
pub mod decay;
pub mod classify;
pub mod sober;
pub mod validate;
pub mod engine;
pub mod session;
pub mod scheduler;
pub mod catalog;
pub mod config;
pub mod format;
pub mod logging;
pub mod state;

// Re-export commonly used types
pub use error::{ComputationAnomaly, Error, Result, ValidationCode, ValidationError, ValidationResult};
pub use types::*;
pub use classify::{classify, ImpairmentLevel, TargetLevel, LEGAL_LIMIT};
pub use units::standard_drinks_for;
pub use decay::drinks_for_target;
pub use validate::{validate_drink_input, validate_profile, validate_target};
pub use engine::{compute_estimate_bac, compute_live_bac, compute_session_bac};
pub use session::SharedSession;
pub use scheduler::{start_scheduler, stop_scheduler, RecomputeScheduler, SchedulerHandle, SchedulerOptions};
pub use catalog::{find_preset, presets, DrinkPreset};
pub use config::Config;
pub use state::AppState;
