//! Checkable properties and their behaviour modifiers.

use crate::args::EngineArgs;
use crate::result::EngineResult;
use parking_lot::Mutex;
use proptest::strategy::Strategy;
use proptest::test_runner::{
    Config as ProptestConfig, RngAlgorithm, RngSeed, TestCaseError, TestCaseResult, TestError,
    TestRng, TestRunner,
};
use std::cell::Cell;
use std::fmt;
use std::num::NonZeroU32;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

/// Engine-level behaviour toggles attached to a [`Property`].
///
/// Each field is independent of the others, so the order in which the
/// modifier methods are applied does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    /// Record every tested case.
    pub verbose: bool,
    /// Record every shrink step.
    pub verbose_shrinking: bool,
    /// Report the first failing input without shrinking.
    pub no_shrinking: bool,
    /// Multiplier applied to the size parameter.
    pub size_scale: NonZeroU32,
    /// Invert the verdict: failing is success, passing is a failure.
    pub expect_failure: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            verbose: false,
            verbose_shrinking: false,
            no_shrinking: false,
            size_scale: NonZeroU32::MIN,
            expect_failure: false,
        }
    }
}

enum RunError {
    Abort(String),
    Fail(String),
}

trait Check: Send + Sync {
    fn check(&self, runner: &mut TestRunner, size: usize, trace: &Trace) -> Result<(), RunError>;
}

struct FixedCheck<S, T> {
    strategy: S,
    test: T,
}

struct SizedCheck<F, T> {
    make: F,
    test: T,
}

impl<S, T> Check for FixedCheck<S, T>
where
    S: Strategy + Send + Sync,
    T: Fn(S::Value) -> TestCaseResult + Send + Sync,
{
    fn check(&self, runner: &mut TestRunner, _size: usize, trace: &Trace) -> Result<(), RunError> {
        run_strategy(runner, &self.strategy, &self.test, trace)
    }
}

impl<F, S, T> Check for SizedCheck<F, T>
where
    F: Fn(usize) -> S + Send + Sync,
    S: Strategy,
    T: Fn(S::Value) -> TestCaseResult + Send + Sync,
{
    fn check(&self, runner: &mut TestRunner, size: usize, trace: &Trace) -> Result<(), RunError> {
        let strategy = (self.make)(size);
        run_strategy(runner, &strategy, &self.test, trace)
    }
}

fn run_strategy<S, T>(
    runner: &mut TestRunner,
    strategy: &S,
    test: &T,
    trace: &Trace,
) -> Result<(), RunError>
where
    S: Strategy,
    T: Fn(S::Value) -> TestCaseResult,
{
    runner
        .run(strategy, |value| {
            let shown = format!("{:?}", value);
            let result = {
                let _quiet = CatchingPanics::enter();
                panic::catch_unwind(AssertUnwindSafe(|| test(value)))
            }
            .unwrap_or_else(|payload| Err(TestCaseError::fail(panic_message(&*payload))));
            trace.record(&shown, &result);
            result
        })
        .map_err(|err| match err {
            TestError::Abort(reason) => RunError::Abort(reason.message().to_string()),
            TestError::Fail(reason, _) => RunError::Fail(reason.message().to_string()),
        })
}

thread_local! {
    static CATCHING_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_PANIC_HOOK: Once = Once::new();

/// Marks the current thread as catching panics from a property test.
///
/// While any guard is alive the process panic hook stays silent for this
/// thread; the panic message reaches the result through the caught payload.
struct CatchingPanics {
    previous: bool,
}

impl CatchingPanics {
    fn enter() -> Self {
        QUIET_PANIC_HOOK.call_once(|| {
            let hook = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if !CATCHING_PANICS.with(Cell::get) {
                    hook(info);
                }
            }));
        });
        Self {
            previous: CATCHING_PANICS.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for CatchingPanics {
    fn drop(&mut self) {
        CATCHING_PANICS.with(|flag| flag.set(self.previous));
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[derive(Default)]
struct TraceState {
    passed: u32,
    discarded: u32,
    shrinks: u32,
    /// Latest failing input; the original one until a shrink step fails.
    failing: Option<String>,
    lines: Vec<String>,
}

/// Counts cases and records transcript lines while the runner executes.
struct Trace {
    verbose: bool,
    verbose_shrinking: bool,
    state: Mutex<TraceState>,
}

impl Trace {
    fn new(modifiers: &Modifiers) -> Self {
        Self {
            verbose: modifiers.verbose,
            verbose_shrinking: modifiers.verbose_shrinking,
            state: Mutex::new(TraceState::default()),
        }
    }

    fn record(&self, shown: &str, result: &TestCaseResult) {
        let mut state = self.state.lock();

        if state.failing.is_none() {
            let label = match result {
                Ok(()) => {
                    state.passed += 1;
                    "Passed"
                }
                Err(TestCaseError::Reject(_)) => {
                    state.discarded += 1;
                    "Discarded"
                }
                Err(TestCaseError::Fail(_)) => {
                    state.failing = Some(shown.to_string());
                    "Failed"
                }
            };
            tracing::trace!(case = %shown, label, "property case");
            if self.verbose {
                state.lines.push(format!("{}:\n{}", label, shown));
            }
            return;
        }

        let still_fails = matches!(result, Err(TestCaseError::Fail(_)));
        if still_fails {
            state.shrinks += 1;
            state.failing = Some(shown.to_string());
        }
        tracing::trace!(case = %shown, still_fails, "shrink step");
        if self.verbose_shrinking {
            let verdict = if still_fails { "still fails" } else { "passes" };
            state.lines.push(format!("Shrinking: {} {}", shown, verdict));
        }
    }

    fn into_state(self) -> TraceState {
        self.state.into_inner()
    }
}

/// A property the engine can check: a strategy generating inputs and a
/// test over them, plus behaviour modifiers.
///
/// Cloning is cheap; clones share the strategy and test.
#[derive(Clone)]
pub struct Property {
    check: Arc<dyn Check>,
    modifiers: Modifiers,
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

impl Property {
    /// Property over inputs drawn from `strategy`.
    ///
    /// The test returns proptest's `TestCaseResult`, so `prop_assert!` and
    /// `prop_assume!` work as usual. Panics count as failures.
    pub fn new<S, T>(strategy: S, test: T) -> Self
    where
        S: Strategy + Send + Sync + 'static,
        T: Fn(S::Value) -> TestCaseResult + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(FixedCheck { strategy, test }),
            modifiers: Modifiers::default(),
        }
    }

    /// Property whose strategy is built from the run's size parameter
    /// (`max_size` scaled by [`Property::map_size`]).
    pub fn sized<F, S, T>(make: F, test: T) -> Self
    where
        F: Fn(usize) -> S + Send + Sync + 'static,
        S: Strategy + 'static,
        T: Fn(S::Value) -> TestCaseResult + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(SizedCheck { make, test }),
            modifiers: Modifiers::default(),
        }
    }

    /// Modifiers currently attached.
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Record every tested case in the result transcript.
    pub fn verbose(mut self) -> Self {
        self.modifiers.verbose = true;
        self
    }

    /// Record every shrink step in the result transcript.
    pub fn verbose_shrinking(mut self) -> Self {
        self.modifiers.verbose_shrinking = true;
        self
    }

    /// Report the first failing input as found.
    pub fn no_shrinking(mut self) -> Self {
        self.modifiers.no_shrinking = true;
        self
    }

    /// Multiply the size parameter by `factor`.
    pub fn map_size(mut self, factor: NonZeroU32) -> Self {
        self.modifiers.size_scale = self.modifiers.size_scale.saturating_mul(factor);
        self
    }

    /// Expect the property to fail.
    pub fn expect_failure(mut self) -> Self {
        self.modifiers.expect_failure = true;
        self
    }

    fn runner_config(&self, args: &EngineArgs, size: u32) -> ProptestConfig {
        let max_shrink_iters = if self.modifiers.no_shrinking {
            0
        } else {
            // proptest reads u32::MAX as four times the case count.
            args.max_shrinks.get().min(u32::MAX - 1)
        };

        // Every field the PROPTEST_* environment can reach is set here.
        ProptestConfig {
            cases: args.max_success.get(),
            max_local_rejects: args.max_discards(),
            max_global_rejects: args.max_discards(),
            max_flat_map_regens: 1_000_000,
            max_shrink_iters,
            max_shrink_time: 0,
            max_default_size_range: size as usize,
            failure_persistence: None,
            fork: false,
            timeout: 0,
            verbose: 0,
            rng_algorithm: RngAlgorithm::default(),
            rng_seed: RngSeed::Random,
            ..ProptestConfig::default()
        }
    }

    /// Run the property to completion.
    pub fn check(&self, args: &EngineArgs) -> EngineResult {
        let size = args
            .max_size
            .get()
            .saturating_mul(self.modifiers.size_scale.get());
        let config = self.runner_config(args, size);
        let mut runner = match &args.replay {
            Some(seed) => {
                TestRunner::new_with_rng(config, TestRng::from_seed(RngAlgorithm::ChaCha, seed))
            }
            None => TestRunner::new(config),
        };

        let trace = Trace::new(&self.modifiers);
        let outcome = self.check.check(&mut runner, size as usize, &trace);
        let state = trace.into_state();

        let failed = state.failing.is_some();
        let num_tests = state.passed + u32::from(failed);
        let num_discarded = state.discarded;
        let transcript = state.lines;

        let result = match outcome {
            Ok(()) if self.modifiers.expect_failure => EngineResult::NoExpectedFailure {
                num_tests,
                num_discarded,
                transcript,
            },
            Ok(()) => EngineResult::Success {
                num_tests,
                num_discarded,
                expected_failure: None,
                transcript,
            },
            Err(RunError::Abort(reason)) => EngineResult::GaveUp {
                num_tests,
                num_discarded,
                reason,
                transcript,
            },
            Err(RunError::Fail(reason)) if self.modifiers.expect_failure => EngineResult::Success {
                num_tests,
                num_discarded,
                expected_failure: Some(reason),
                transcript,
            },
            Err(RunError::Fail(reason)) => EngineResult::Failure {
                num_tests,
                num_discarded,
                num_shrinks: state.shrinks,
                reason,
                counterexample: state.failing.unwrap_or_default(),
                transcript,
            },
        };

        if args.chatty {
            tracing::info!("{}", result.summary());
        } else {
            tracing::debug!(
                tests = result.num_tests(),
                discarded = result.num_discarded(),
                success = result.is_success(),
                "property checked"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn args(cases: u32) -> EngineArgs {
        EngineArgs {
            max_success: NonZeroU32::new(cases).unwrap(),
            chatty: false,
            ..EngineArgs::default()
        }
    }

    #[test]
    fn test_modifiers_commute() {
        let base = Property::new(Just(()), |_| Ok(()));
        let scale = NonZeroU32::new(3).unwrap();
        let a = base
            .clone()
            .verbose()
            .no_shrinking()
            .map_size(scale)
            .verbose_shrinking();
        let b = base
            .verbose_shrinking()
            .map_size(scale)
            .no_shrinking()
            .verbose();
        assert_eq!(a.modifiers(), b.modifiers());
        assert_eq!(a.modifiers().size_scale.get(), 3);
    }

    #[test]
    fn test_runner_config_maps_args() {
        let property = Property::new(Just(()), |_| Ok(())).map_size(NonZeroU32::new(2).unwrap());
        let args = EngineArgs {
            max_shrinks: NonZeroU32::new(40).unwrap(),
            ..args(20)
        };
        let config = property.runner_config(&args, 200);
        assert_eq!(config.cases, 20);
        assert_eq!(config.max_global_rejects, 200);
        assert_eq!(config.max_local_rejects, 200);
        assert_eq!(config.max_shrink_iters, 40);
        assert_eq!(config.max_default_size_range, 200);
        assert!(config.failure_persistence.is_none());

        let config = property.no_shrinking().runner_config(&args, 200);
        assert_eq!(config.max_shrink_iters, 0);
    }

    #[test]
    fn test_unbounded_shrinks_stay_explicit() {
        let property = Property::new(Just(()), |_| Ok(()));
        let config = property.runner_config(&args(1), 100);
        assert_eq!(config.max_shrink_iters, u32::MAX - 1);
        assert_eq!(config.max_shrink_time, 0);
        assert_eq!(config.max_flat_map_regens, 1_000_000);
        assert!(!config.fork);
        assert_eq!(config.timeout, 0);
        assert_eq!(config.rng_algorithm, RngAlgorithm::ChaCha);
        assert!(matches!(config.rng_seed, RngSeed::Random));
    }

    #[test]
    fn test_catching_panics_flag_nests() {
        let flag = || CATCHING_PANICS.with(Cell::get);
        assert!(!flag());
        {
            let _outer = CatchingPanics::enter();
            assert!(flag());
            {
                let _inner = CatchingPanics::enter();
                assert!(flag());
            }
            assert!(flag());
        }
        assert!(!flag());
    }

    #[test]
    fn test_trace_counts_cases_and_shrinks() {
        let trace = Trace::new(&Modifiers {
            verbose: true,
            verbose_shrinking: true,
            ..Modifiers::default()
        });
        trace.record("1", &Ok(()));
        trace.record("2", &Err(TestCaseError::reject("odd")));
        trace.record("30", &Err(TestCaseError::fail("too big")));
        trace.record("15", &Err(TestCaseError::fail("too big")));
        trace.record("7", &Ok(()));

        let state = trace.into_state();
        assert_eq!(state.passed, 1);
        assert_eq!(state.discarded, 1);
        assert_eq!(state.shrinks, 1);
        assert_eq!(state.failing.as_deref(), Some("15"));
        assert_eq!(
            state.lines,
            vec![
                "Passed:\n1",
                "Discarded:\n2",
                "Failed:\n30",
                "Shrinking: 15 still fails",
                "Shrinking: 7 passes",
            ]
        );
    }

    #[test]
    fn test_panics_become_failures() {
        let property = Property::new(0u8..10, |x| {
            if x > 3 {
                panic!("value {} too large", x);
            }
            Ok(())
        });
        match property.check(&args(200)) {
            EngineResult::Failure { reason, .. } => assert!(reason.contains("too large")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_replay_seed_is_deterministic() {
        let seeded = EngineArgs {
            replay: Some([7; 32]),
            ..args(50)
        };
        let property = Property::new(any::<u32>(), |x| {
            prop_assert!(x % 5 != 0);
            Ok(())
        });
        assert_eq!(property.check(&seeded), property.check(&seeded));
    }
}
