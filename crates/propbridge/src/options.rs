//! The option table: every option name a property test understands,
//! how to set it from a string and how to describe it.

use crate::config::PropConfig;
use crate::verbosity::{Verbosity, VerbosityOption};
use propbridge_runner::{parse_value, OptionDescriptor, OptionType, OptionValue, SetOptionError};
use std::num::NonZeroU32;

struct OptionEntry {
    name: &'static str,
    description: &'static str,
    ty: fn() -> OptionType,
    get: fn(&PropConfig) -> String,
    set: fn(&PropConfig, &str) -> Option<PropConfig>,
}

fn flag(raw: &str, apply: impl FnOnce(bool) -> PropConfig) -> Option<PropConfig> {
    parse_value::<bool>(raw).map(apply)
}

fn count(raw: &str, apply: impl FnOnce(NonZeroU32) -> PropConfig) -> Option<PropConfig> {
    parse_value::<NonZeroU32>(raw).map(apply)
}

static OPTIONS: &[OptionEntry] = &[
    OptionEntry {
        name: "silent",
        description: "Suppress all output",
        ty: <bool as OptionValue>::option_type,
        get: |c| (c.verbosity == Verbosity::Quiet).render_option(),
        set: |c, raw| flag(raw, |b| c.with_verbosity(c.verbosity.merge(Verbosity::Normal, !b))),
    },
    OptionEntry {
        name: "chatty",
        description: "Print a summary of each property",
        ty: <bool as OptionValue>::option_type,
        get: |c| (c.verbosity >= Verbosity::Normal).render_option(),
        set: |c, raw| flag(raw, |b| c.with_verbosity(c.verbosity.merge(Verbosity::Normal, b))),
    },
    OptionEntry {
        name: "verbose",
        description: "Print every tested case",
        ty: <bool as OptionValue>::option_type,
        get: |c| (c.verbosity == Verbosity::Detailed).render_option(),
        set: |c, raw| flag(raw, |b| c.with_verbosity(c.verbosity.merge(Verbosity::Detailed, b))),
    },
    OptionEntry {
        name: "verbosity",
        description: "Amount of output",
        ty: <VerbosityOption as OptionValue>::option_type,
        get: |c| VerbosityOption::describe(c.verbosity, c.verbose_shrinking).render_option(),
        set: |c, raw| {
            parse_value::<VerbosityOption>(raw).map(|v| {
                c.with_verbosity(v.verbosity())
                    .with_verbose_shrinking(c.verbose_shrinking || v.verbose_shrinking())
            })
        },
    },
    OptionEntry {
        name: "verboseShrinking",
        description: "Print every shrink step",
        ty: <bool as OptionValue>::option_type,
        get: |c| c.verbose_shrinking.render_option(),
        set: |c, raw| flag(raw, |b| c.with_verbose_shrinking(b)),
    },
    OptionEntry {
        name: "maxDiscardRatio",
        description: "Discarded cases allowed per passing case before giving up",
        ty: <NonZeroU32 as OptionValue>::option_type,
        get: |c| c.max_discard_ratio.render_option(),
        set: |c, raw| count(raw, |n| c.with_max_discard_ratio(n)),
    },
    OptionEntry {
        name: "noShrinking",
        description: "Report the first failing input without shrinking",
        ty: <bool as OptionValue>::option_type,
        get: |c| c.no_shrinking.render_option(),
        set: |c, raw| flag(raw, |b| c.with_no_shrinking(b)),
    },
    OptionEntry {
        name: "shrinking",
        description: "Shrink failing inputs",
        ty: <bool as OptionValue>::option_type,
        get: |c| (!c.no_shrinking).render_option(),
        set: |c, raw| flag(raw, |b| c.with_no_shrinking(!b)),
    },
    OptionEntry {
        name: "maxShrinks",
        description: "Maximum number of shrink steps",
        ty: <NonZeroU32 as OptionValue>::option_type,
        get: |c| c.max_shrinks.render_option(),
        set: |c, raw| count(raw, |n| c.with_max_shrinks(n)),
    },
    OptionEntry {
        name: "maxSuccess",
        description: "Passing cases required",
        ty: <NonZeroU32 as OptionValue>::option_type,
        get: |c| c.max_success.render_option(),
        set: |c, raw| count(raw, |n| c.with_max_success(n)),
    },
    OptionEntry {
        name: "maxSize",
        description: "Largest size parameter passed to generators",
        ty: <NonZeroU32 as OptionValue>::option_type,
        get: |c| c.max_size.render_option(),
        set: |c, raw| count(raw, |n| c.with_max_size(n)),
    },
    OptionEntry {
        name: "sizeScale",
        description: "Multiplier applied to the size parameter",
        ty: <NonZeroU32 as OptionValue>::option_type,
        get: |c| c.size_scale.render_option(),
        set: |c, raw| count(raw, |n| c.with_size_scale(n)),
    },
];

/// Names of every recognised option, in schema order.
pub fn option_names() -> impl Iterator<Item = &'static str> {
    OPTIONS.iter().map(|entry| entry.name)
}

/// Derive a configuration with option `name` set from `raw`.
///
/// Names are case-sensitive. `config` itself is never changed.
pub fn set_option(
    name: &str,
    raw: &str,
    config: &PropConfig,
) -> Result<PropConfig, SetOptionError> {
    let entry = OPTIONS
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| SetOptionError::unknown(name))?;

    let updated = (entry.set)(config, raw).ok_or_else(|| SetOptionError::ParseError {
        name: name.to_string(),
        value: raw.to_string(),
        expected: (entry.ty)().to_string(),
    })?;

    tracing::debug!(option = %name, value = %raw, "option set");
    Ok(updated)
}

/// Option schema with defaults taken from `config`.
pub fn describe_options(config: &PropConfig) -> Vec<OptionDescriptor> {
    OPTIONS
        .iter()
        .map(|entry| {
            OptionDescriptor::new(entry.name, entry.description, (entry.ty)(), (entry.get)(config))
        })
        .collect()
}
