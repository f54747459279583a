//! Native run parameters of the property engine.

use proptest::test_runner::Config as ProptestConfig;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// 32-byte ChaCha seed used to replay a run.
pub type Seed = [u8; 32];

const fn non_zero(n: u32) -> NonZeroU32 {
    match NonZeroU32::new(n) {
        Some(n) => n,
        None => NonZeroU32::MIN,
    }
}

/// Run parameters the engine understands natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineArgs {
    /// Passing cases required before the property is accepted.
    pub max_success: NonZeroU32,
    /// Discarded cases tolerated per required passing case.
    pub max_discard_ratio: NonZeroU32,
    /// Upper bound of the size parameter handed to generators.
    pub max_size: NonZeroU32,
    /// Upper bound on shrink steps after a failure.
    pub max_shrinks: NonZeroU32,
    /// Log a summary line for every run.
    pub chatty: bool,
    /// Seed to replay; `None` draws fresh randomness.
    pub replay: Option<Seed>,
}

impl Default for EngineArgs {
    fn default() -> Self {
        Self {
            max_success: non_zero(100),
            max_discard_ratio: non_zero(10),
            max_size: non_zero(100),
            max_shrinks: NonZeroU32::MAX,
            chatty: true,
            replay: None,
        }
    }
}

impl EngineArgs {
    /// Project a proptest configuration onto engine arguments.
    ///
    /// Zero-valued counts are raised to one. The discard ratio is the
    /// global reject budget divided by the case count.
    pub fn from_proptest(config: &ProptestConfig) -> Self {
        let cases = non_zero(config.cases);
        let ratio = config.max_global_rejects / cases.get();
        let size = u32::try_from(config.max_default_size_range).unwrap_or(u32::MAX);

        Self {
            max_success: cases,
            max_discard_ratio: non_zero(ratio),
            max_size: non_zero(size),
            max_shrinks: non_zero(config.max_shrink_iters),
            chatty: config.verbose > 0,
            replay: None,
        }
    }

    /// Total discards tolerated before giving up.
    pub fn max_discards(&self) -> u32 {
        self.max_success
            .get()
            .saturating_mul(self.max_discard_ratio.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_fixed() {
        let args = EngineArgs::default();
        assert_eq!(args.max_success.get(), 100);
        assert_eq!(args.max_discard_ratio.get(), 10);
        assert_eq!(args.max_size.get(), 100);
        assert_eq!(args.max_shrinks, NonZeroU32::MAX);
        assert!(args.chatty);
        assert!(args.replay.is_none());
        assert_eq!(args.max_discards(), 1_000);
    }

    #[test]
    fn test_from_proptest_config() {
        let config = ProptestConfig {
            cases: 64,
            max_global_rejects: 640,
            max_default_size_range: 30,
            max_shrink_iters: 500,
            verbose: 1,
            ..ProptestConfig::default()
        };
        let args = EngineArgs::from_proptest(&config);
        assert_eq!(args.max_success.get(), 64);
        assert_eq!(args.max_discard_ratio.get(), 10);
        assert_eq!(args.max_size.get(), 30);
        assert_eq!(args.max_shrinks.get(), 500);
        assert!(args.chatty);
    }

    #[test]
    fn test_from_proptest_clamps_zeroes() {
        let config = ProptestConfig {
            cases: 0,
            max_global_rejects: 0,
            max_default_size_range: 0,
            max_shrink_iters: 0,
            verbose: 0,
            ..ProptestConfig::default()
        };
        let args = EngineArgs::from_proptest(&config);
        assert_eq!(args.max_success.get(), 1);
        assert_eq!(args.max_discard_ratio.get(), 1);
        assert_eq!(args.max_size.get(), 1);
        assert_eq!(args.max_shrinks.get(), 1);
        assert!(!args.chatty);
    }

    #[test]
    fn test_max_discards_saturates() {
        let args = EngineArgs {
            max_success: NonZeroU32::MAX,
            max_discard_ratio: non_zero(2),
            ..EngineArgs::default()
        };
        assert_eq!(args.max_discards(), u32::MAX);
    }
}
