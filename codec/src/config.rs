//! Limits applied while decoding.
//!
//! Encoded buffers carry no reference to the registry (or the limits) that produced them, so
//! callers decoding untrusted input can bound the work a single buffer may demand.

use core::ops::{Bound, RangeBounds};

/// Bounds on a length or count.
///
/// # Examples
///
/// ```
/// use tagged_codec::RangeCfg;
///
/// let cfg = RangeCfg::new(0..=1024);
/// assert!(cfg.contains(500));
/// assert!(!cfg.contains(2000));
///
/// let cfg: RangeCfg = (1..).into();
/// assert!(!cfg.contains(0));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RangeCfg {
    start: Bound<usize>,
    end: Bound<usize>,
}

impl RangeCfg {
    /// Creates a new `RangeCfg` from any range of `usize`.
    pub fn new(r: impl RangeBounds<usize>) -> Self {
        Self {
            start: r.start_bound().cloned(),
            end: r.end_bound().cloned(),
        }
    }

    /// Returns true if `value` is within this range.
    pub fn contains(&self, value: usize) -> bool {
        let above_start = match self.start {
            Bound::Included(s) => value >= s,
            Bound::Excluded(s) => value > s,
            Bound::Unbounded => true,
        };
        let below_end = match self.end {
            Bound::Included(e) => value <= e,
            Bound::Excluded(e) => value < e,
            Bound::Unbounded => true,
        };
        above_start && below_end
    }
}

impl Default for RangeCfg {
    fn default() -> Self {
        Self::new(..)
    }
}

macro_rules! impl_from_range {
    ($($range:ty),*) => {
        $(
            impl From<$range> for RangeCfg {
                fn from(r: $range) -> Self {
                    Self::new(r)
                }
            }
        )*
    };
}

impl_from_range!(
    core::ops::Range<usize>,
    core::ops::RangeInclusive<usize>,
    core::ops::RangeFrom<usize>,
    core::ops::RangeTo<usize>,
    core::ops::RangeToInclusive<usize>,
    core::ops::RangeFull
);

/// Configuration for a [crate::Registry].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting depth accepted when decoding. The root value is at depth 0.
    ///
    /// Recursion is otherwise bounded only by the input, so decoding deeply nested untrusted
    /// buffers without a limit can exhaust the stack.
    pub max_depth: usize,

    /// Element counts accepted for any composite when decoding.
    pub elements: RangeCfg,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: usize::MAX,
            elements: RangeCfg::default(),
        }
    }
}
