//! Error types

mod map;
mod record;
mod validation;

pub use map::*;
pub use record::*;
pub use validation::*;
