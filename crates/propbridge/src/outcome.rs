//! Maps engine results onto runner verdicts.

use crate::config::PropConfig;
use propbridge_engine::{EngineResult, Property};
use propbridge_runner::Outcome;

/// Verdict for an engine result.
///
/// Giving up is an `Error`: the discard budget ran out before the property
/// could be judged. Both kinds of demonstrated violation are `Fail`.
pub fn translate(result: &EngineResult) -> Outcome {
    match result {
        EngineResult::Success { .. } => Outcome::Pass,
        EngineResult::GaveUp { .. } => Outcome::error(format!("gave up\n{}", result)),
        EngineResult::Failure { .. } => Outcome::fail(format!("a property failed\n{}", result)),
        EngineResult::NoExpectedFailure { .. } => Outcome::fail(format!(
            "a property that should have failed did not\n{}",
            result
        )),
    }
}

/// Check `property` once under `config` and translate the result.
pub fn run_property(config: &PropConfig, property: Property) -> Outcome {
    let property = config.apply_modifiers(property);
    let result = property.check(&config.to_engine_args());
    let outcome = translate(&result);
    tracing::debug!(verdict = outcome.label(), "property run finished");
    outcome
}
