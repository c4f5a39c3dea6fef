//! Threshold evaluation engine: breach detection, sent-alert state and
//! digest report accumulation.

pub mod evaluator;
pub mod report;
pub mod state;

pub use evaluator::*;
pub use report::*;
pub use state::*;
