//! Fixed-point price representation.

use serde::{Deserialize, Serialize};

/// Fixed-point number with 8 decimal places.
///
/// Prices and thresholds use this instead of `f64` so that alert keys
/// are `Eq + Hash` and threshold comparisons are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FixedPoint(pub u64);

impl FixedPoint {
    /// Number of decimal places.
    pub const DECIMALS: u32 = 8;
    /// Scale factor: 10^8 (fits comfortably in u64 for market prices).
    pub const SCALE: u64 = 100_000_000;
    /// Zero, also the representation of an invalid price.
    pub const ZERO: FixedPoint = FixedPoint(0);

    /// Create from f64. Non-finite or non-positive input maps to zero,
    /// which downstream code treats as "no usable price".
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self(0);
        }
        Self((value * Self::SCALE as f64) as u64)
    }

    /// Convert to f64 (for display).
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Signed variation of `price` against `target` in basis points:
    /// (price - target) / target * 10000.
    ///
    /// A zero target yields 0 so division-by-zero never reaches callers.
    pub fn variation_bps(target: FixedPoint, price: FixedPoint) -> i32 {
        if target.0 == 0 {
            return 0;
        }
        let diff = price.0 as i128 - target.0 as i128;
        let bps = (diff * 10_000) / target.0 as i128;
        // Extreme price/target ratios exceed i32 bps; saturate instead
        // of wrapping.
        i32::try_from(bps).unwrap_or(if bps > 0 { i32::MAX } else { i32::MIN })
    }

    /// Variation in percent, for display.
    pub fn variation_pct(target: FixedPoint, price: FixedPoint) -> f64 {
        Self::variation_bps(target, price) as f64 / 100.0
    }
}

impl std::fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}
