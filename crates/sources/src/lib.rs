//! Market data providers.
//!
//! Each provider implements the `PriceSource` capability; the app picks
//! one per rule by configuration instead of duplicating fetch code.

pub mod brapi;
pub mod error;
pub mod fred;
pub mod source;
pub mod yahoo;

#[cfg(test)]
mod testutil;

pub use brapi::BrapiSource;
pub use error::SourceError;
pub use fred::FredSource;
pub use source::{PriceSource, ProviderKind};
pub use yahoo::YahooSource;
