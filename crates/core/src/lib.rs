//! Core data types for the price alert bot.

pub mod currency;
pub mod event;
pub mod instrument;
pub mod observation;
pub mod price;
pub mod rule;

pub use currency::*;
pub use event::*;
pub use instrument::*;
pub use observation::*;
pub use price::*;
pub use rule::*;
