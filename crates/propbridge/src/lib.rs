//! Run proptest properties as units of a structured test runner.
//!
//! Each property becomes a [`PropertyTest`]: a named, tagged unit carrying
//! an immutable [`PropConfig`]. The runner discovers the unit's options
//! with [`describe_options`], changes them by name through
//! [`set_option`], and executes the unit to get a pass, fail or error
//! verdict.
//!
//! ```no_run
//! use propbridge::{test_properties, NamedProperty};
//! use propbridge_engine::proptest::prelude::*;
//! use propbridge_engine::Property;
//! use std::process::ExitCode;
//!
//! fn main() -> ExitCode {
//!     let tree = test_properties(
//!         "arithmetic",
//!         vec![NamedProperty::new(
//!             "addition commutes",
//!             Property::new((any::<i32>(), any::<i32>()), |(a, b)| {
//!                 prop_assert_eq!(a.wrapping_add(b), b.wrapping_add(a));
//!                 Ok(())
//!             }),
//!         )],
//!     );
//!     propbridge_runner::default_main(tree)
//! }
//! ```

pub mod config;
pub mod options;
pub mod outcome;
pub mod unit;
pub mod verbosity;

pub use config::PropConfig;
pub use options::{describe_options, option_names, set_option};
pub use outcome::{run_property, translate};
pub use unit::{
    test_properties, test_properties_with, test_property, test_property_with, NamedProperty,
    PropertyFn, PropertySource, PropertyTest,
};
pub use verbosity::{Verbosity, VerbosityOption};
