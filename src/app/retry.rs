//! Retry policy shared by the connect and time-fetch loops.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// How many attempts a retry loop may make before giving up.
///
/// Production firmware runs with [`RetryPolicy::Forever`]; tests bound the
/// loops with [`RetryPolicy::Limited`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Never give up.
    #[default]
    Forever,
    /// Give up after this many attempts.
    Limited(NonZeroU32),
}

impl RetryPolicy {
    /// Convenience constructor; `0` is treated as a single attempt.
    pub fn limited(attempts: u32) -> Self {
        Self::Limited(NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN))
    }

    /// Whether another attempt is allowed after `made` attempts.
    pub fn allows(self, made: u32) -> bool {
        match self {
            Self::Forever => true,
            Self::Limited(max) => made < max.get(),
        }
    }
}
