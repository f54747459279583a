//! A small property suite runnable from the command line.
//!
//! ```text
//! cargo run -p propbridge --example arithmetic -- --option maxSuccess=500 --format junit
//! ```

use propbridge::{test_properties, NamedProperty};
use propbridge_engine::proptest::prelude::*;
use propbridge_engine::Property;
use std::process::ExitCode;

fn main() -> ExitCode {
    let tree = test_properties(
        "arithmetic",
        vec![
            NamedProperty::new(
                "addition commutes",
                Property::new((any::<i64>(), any::<i64>()), |(a, b)| {
                    prop_assert_eq!(a.wrapping_add(b), b.wrapping_add(a));
                    Ok(())
                }),
            )
            .tag("fast"),
            NamedProperty::new(
                "subtraction does not commute",
                Property::new((any::<i64>(), any::<i64>()), |(a, b)| {
                    prop_assert_eq!(a.wrapping_sub(b), b.wrapping_sub(a));
                    Ok(())
                })
                .expect_failure(),
            )
            .tag("fast"),
            NamedProperty::configured("sums stay below the size bound", |config| {
                let bound = u64::from(config.max_size.get());
                Property::new(prop::collection::vec(0..=bound, 0..4), move |v| {
                    prop_assert!(v.iter().sum::<u64>() <= 3 * bound);
                    Ok(())
                })
            }),
        ],
    );
    propbridge_runner::default_main(tree)
}
