//! Recommendation records: fixed-shape patient/doctor reports plus next
//! steps, normalized from whatever the recommendation agent returned.

pub mod input;
pub mod normalizer;
pub mod types;

pub use input::*;
pub use normalizer::*;
pub use types::*;
