//! The configuration record a property test runs under.

use crate::verbosity::Verbosity;
use propbridge_engine::{EngineArgs, Property};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Tunable run parameters of one property test.
///
/// Values are immutable: every `with_*` method returns an updated copy.
/// Integer fields are `NonZeroU32`, so a configuration can never hold a
/// zero bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropConfig {
    /// How much output a run produces.
    pub verbosity: Verbosity,
    /// Record every shrink step.
    pub verbose_shrinking: bool,
    /// Discarded cases tolerated per required passing case.
    pub max_discard_ratio: NonZeroU32,
    /// Report the first failing input without shrinking it.
    pub no_shrinking: bool,
    /// Upper bound on shrink steps.
    pub max_shrinks: NonZeroU32,
    /// Passing cases required.
    pub max_success: NonZeroU32,
    /// Largest size parameter handed to generators.
    pub max_size: NonZeroU32,
    /// Multiplier applied to the size parameter.
    pub size_scale: NonZeroU32,
}

impl Default for PropConfig {
    fn default() -> Self {
        Self::from_engine_args(&EngineArgs::default())
    }
}

impl PropConfig {
    /// Configuration matching the engine's native run parameters.
    ///
    /// Settings the engine has no native form for start off, and the size
    /// scale starts at one.
    pub fn from_engine_args(args: &EngineArgs) -> Self {
        Self {
            verbosity: if args.chatty {
                Verbosity::Normal
            } else {
                Verbosity::Quiet
            },
            verbose_shrinking: false,
            max_discard_ratio: args.max_discard_ratio,
            no_shrinking: false,
            max_shrinks: args.max_shrinks,
            max_success: args.max_success,
            max_size: args.max_size,
            size_scale: NonZeroU32::MIN,
        }
    }

    /// Native engine parameters for a run under this configuration.
    ///
    /// Runs are chatty from `Normal` up and never replay a previous seed.
    pub fn to_engine_args(&self) -> EngineArgs {
        EngineArgs {
            max_success: self.max_success,
            max_discard_ratio: self.max_discard_ratio,
            max_size: self.max_size,
            max_shrinks: self.max_shrinks,
            chatty: self.verbosity >= Verbosity::Normal,
            replay: None,
        }
    }

    /// Attach the modifiers this configuration selects to `property`.
    pub fn apply_modifiers(&self, property: Property) -> Property {
        let mut property = property;
        if self.verbosity == Verbosity::Detailed {
            property = property.verbose();
        }
        if self.verbose_shrinking {
            property = property.verbose_shrinking();
        }
        if self.no_shrinking {
            property = property.no_shrinking();
        }
        if self.size_scale != NonZeroU32::MIN {
            property = property.map_size(self.size_scale);
        }
        property
    }

    #[must_use]
    pub fn with_verbosity(self, verbosity: Verbosity) -> Self {
        Self { verbosity, ..self }
    }

    #[must_use]
    pub fn with_verbose_shrinking(self, verbose_shrinking: bool) -> Self {
        Self {
            verbose_shrinking,
            ..self
        }
    }

    #[must_use]
    pub fn with_max_discard_ratio(self, max_discard_ratio: NonZeroU32) -> Self {
        Self {
            max_discard_ratio,
            ..self
        }
    }

    #[must_use]
    pub fn with_no_shrinking(self, no_shrinking: bool) -> Self {
        Self {
            no_shrinking,
            ..self
        }
    }

    #[must_use]
    pub fn with_max_shrinks(self, max_shrinks: NonZeroU32) -> Self {
        Self {
            max_shrinks,
            ..self
        }
    }

    #[must_use]
    pub fn with_max_success(self, max_success: NonZeroU32) -> Self {
        Self {
            max_success,
            ..self
        }
    }

    #[must_use]
    pub fn with_max_size(self, max_size: NonZeroU32) -> Self {
        Self { max_size, ..self }
    }

    #[must_use]
    pub fn with_size_scale(self, size_scale: NonZeroU32) -> Self {
        Self { size_scale, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use propbridge_engine::proptest::prelude::*;

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn any_nz() -> impl Strategy<Value = NonZeroU32> {
        (1..=u32::MAX).prop_map(nz)
    }

    #[test]
    fn test_default_matches_engine_defaults() {
        let config = PropConfig::default();
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert!(!config.verbose_shrinking);
        assert!(!config.no_shrinking);
        assert_eq!(config.max_success.get(), 100);
        assert_eq!(config.max_discard_ratio.get(), 10);
        assert_eq!(config.max_size.get(), 100);
        assert_eq!(config.size_scale.get(), 1);
        assert_eq!(config.to_engine_args(), EngineArgs::default());
    }

    #[test]
    fn test_quiet_engine_args_start_quiet() {
        let args = EngineArgs {
            chatty: false,
            ..EngineArgs::default()
        };
        assert_eq!(PropConfig::from_engine_args(&args).verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_to_engine_args_resets_replay() {
        let args = EngineArgs {
            replay: Some([1; 32]),
            ..EngineArgs::default()
        };
        let round_trip = PropConfig::from_engine_args(&args).to_engine_args();
        assert!(round_trip.replay.is_none());
    }

    #[test]
    fn test_detailed_is_chatty() {
        let config = PropConfig::default().with_verbosity(Verbosity::Detailed);
        assert!(config.to_engine_args().chatty);
        let config = config.with_verbosity(Verbosity::Quiet);
        assert!(!config.to_engine_args().chatty);
    }

    #[test]
    fn test_apply_modifiers_selects_flags() {
        let property = Property::new(Just(()), |_| Ok(()));

        let plain = PropConfig::default().apply_modifiers(property.clone());
        assert_eq!(plain.modifiers(), property.modifiers());

        let config = PropConfig::default()
            .with_verbosity(Verbosity::Detailed)
            .with_verbose_shrinking(true)
            .with_no_shrinking(true)
            .with_size_scale(nz(4));
        let modified = config.apply_modifiers(property);
        let modifiers = modified.modifiers();
        assert!(modifiers.verbose);
        assert!(modifiers.verbose_shrinking);
        assert!(modifiers.no_shrinking);
        assert_eq!(modifiers.size_scale.get(), 4);
        assert!(!modifiers.expect_failure);
    }

    #[test]
    fn test_normal_verbosity_is_not_verbose() {
        let property = Property::new(Just(()), |_| Ok(()));
        let modified = PropConfig::default().apply_modifiers(property);
        assert!(!modified.modifiers().verbose);
    }

    #[test]
    fn test_serializes_with_option_names() {
        let json = serde_json::to_value(PropConfig::default()).unwrap();
        assert_eq!(json["verbosity"], "Normal");
        assert_eq!(json["maxDiscardRatio"], 10);
        assert_eq!(json["noShrinking"], false);
        assert_eq!(json["sizeScale"], 1);
    }

    proptest! {
        #[test]
        fn engine_args_round_trip(
            max_success in any_nz(),
            max_discard_ratio in any_nz(),
            max_size in any_nz(),
            max_shrinks in any_nz(),
            chatty in any::<bool>(),
        ) {
            let args = EngineArgs {
                max_success,
                max_discard_ratio,
                max_size,
                max_shrinks,
                chatty,
                replay: None,
            };
            prop_assert_eq!(PropConfig::from_engine_args(&args).to_engine_args(), args);
        }
    }
}
