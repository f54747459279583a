//! Test units and the tree the runner executes.

use crate::options::{OptionDescriptor, SetOptionError};
use crate::outcome::Outcome;
use std::collections::HashSet;
use std::fmt;

/// A named, tagged, configurable test the runner can execute.
///
/// Units are immutable: setting an option yields a replacement unit and the
/// original is discarded by the caller.
pub trait TestUnit: Send + Sync {
    /// Test name.
    fn name(&self) -> &str;

    /// Tags attached to the test, in declaration order.
    fn tags(&self) -> &[String];

    /// Option schema, with defaults reflecting the unit's current settings.
    fn options(&self) -> Vec<OptionDescriptor>;

    /// Produce a unit with `name` set to `value`.
    fn set_option(&self, name: &str, value: &str) -> Result<Box<dyn TestUnit>, SetOptionError>;

    /// Execute the test, blocking until a verdict is reached.
    fn run(&self) -> Outcome;
}

/// A tree of test units grouped under names.
pub enum TestTree {
    /// One runnable unit.
    Single(Box<dyn TestUnit>),
    /// A named group of independent subtrees.
    Group {
        /// Group name.
        name: String,
        /// Children, in declaration order.
        children: Vec<TestTree>,
    },
}

/// Group independent subtrees under one name.
pub fn group(name: impl Into<String>, children: Vec<TestTree>) -> TestTree {
    TestTree::Group {
        name: name.into(),
        children,
    }
}

/// A unit together with its slash-joined location in the tree.
pub struct UnitEntry<'a> {
    /// Names of the enclosing groups, outermost first.
    pub groups: Vec<&'a str>,
    /// The unit itself.
    pub unit: &'a dyn TestUnit,
}

impl UnitEntry<'_> {
    /// Slash-joined group path, empty for top-level units.
    pub fn suite(&self) -> String {
        self.groups.join("/")
    }

    /// Slash-joined full path including the unit name.
    pub fn path(&self) -> String {
        let mut parts = self.groups.clone();
        parts.push(self.unit.name());
        parts.join("/")
    }
}

impl TestTree {
    /// Wrap a single unit.
    pub fn single(unit: impl TestUnit + 'static) -> Self {
        Self::Single(Box::new(unit))
    }

    /// Unit name or group name.
    pub fn name(&self) -> &str {
        match self {
            Self::Single(unit) => unit.name(),
            Self::Group { name, .. } => name,
        }
    }

    /// Number of units in the tree.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Group { children, .. } => children.iter().map(TestTree::len).sum(),
        }
    }

    /// Does the tree contain no units?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All units, depth first in declaration order.
    pub fn units(&self) -> Vec<UnitEntry<'_>> {
        let mut entries = Vec::new();
        self.collect_units(&mut Vec::new(), &mut entries);
        entries
    }

    fn collect_units<'a>(&'a self, groups: &mut Vec<&'a str>, out: &mut Vec<UnitEntry<'a>>) {
        match self {
            Self::Single(unit) => out.push(UnitEntry {
                groups: groups.clone(),
                unit: unit.as_ref(),
            }),
            Self::Group { name, children } => {
                groups.push(name);
                for child in children {
                    child.collect_units(groups, out);
                }
                groups.pop();
            }
        }
    }

    /// Union of the option schemas of every unit; the first unit to declare
    /// a name supplies its descriptor.
    pub fn options(&self) -> Vec<OptionDescriptor> {
        let mut seen = HashSet::new();
        self.units()
            .into_iter()
            .flat_map(|entry| entry.unit.options())
            .filter(|descriptor| seen.insert(descriptor.name.clone()))
            .collect()
    }

    /// Set an option on every unit that recognises it.
    ///
    /// Units that report [`SetOptionError::UnknownOption`] are kept as they
    /// are. Fails with `UnknownOption` when no unit recognises the name, and
    /// with the first `ParseError` any unit reports.
    pub fn set_option(self, name: &str, value: &str) -> Result<TestTree, SetOptionError> {
        let mut recognised = false;
        let tree = self.apply_option(name, value, &mut recognised)?;
        if recognised {
            Ok(tree)
        } else {
            tracing::warn!(option = %name, "option not recognised by any test");
            Err(SetOptionError::unknown(name))
        }
    }

    fn apply_option(
        self,
        name: &str,
        value: &str,
        recognised: &mut bool,
    ) -> Result<TestTree, SetOptionError> {
        match self {
            Self::Single(unit) => match unit.set_option(name, value) {
                Ok(updated) => {
                    *recognised = true;
                    Ok(Self::Single(updated))
                }
                Err(err) if err.is_unknown() => Ok(Self::Single(unit)),
                Err(err) => Err(err),
            },
            Self::Group {
                name: group_name,
                children,
            } => {
                let children = children
                    .into_iter()
                    .map(|child| child.apply_option(name, value, recognised))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Group {
                    name: group_name,
                    children,
                })
            }
        }
    }
}

impl fmt::Debug for TestTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(unit) => f
                .debug_struct("Single")
                .field("name", &unit.name())
                .field("tags", &unit.tags())
                .finish(),
            Self::Group { name, children } => f
                .debug_struct("Group")
                .field("name", name)
                .field("children", children)
                .finish(),
        }
    }
}
