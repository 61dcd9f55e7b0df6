//! Page-level field validation for multi-step journeys
//!
//! Runs one validator unit per field of a waypoint concurrently, gathers every
//! error they report, and resolves a single outcome: `Ok(())` when no field
//! failed, or [`ValidationErrors`](error::ValidationErrors) carrying the
//! per-field error map.

pub mod aggregate;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod validator;

mod engine;

pub use context::FieldPath;
pub use context::JourneyContext;
pub use engine::*;
pub use error::ErrorMap;
pub use error::ErrorRecord;
pub use error::ValidationErrors;
