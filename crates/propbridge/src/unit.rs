//! Property tests as runner units.

use crate::config::PropConfig;
use crate::options;
use crate::outcome::run_property;
use propbridge_engine::{EngineArgs, Property};
use propbridge_runner::{group, OptionDescriptor, Outcome, SetOptionError, TestTree, TestUnit};
use std::fmt;
use std::sync::Arc;

/// Builds a property from the configuration it will run under.
pub type PropertyFn = dyn Fn(&PropConfig) -> Property + Send + Sync;

/// Where a property test gets its property from.
#[derive(Clone)]
pub enum PropertySource {
    /// The same property for every configuration.
    Fixed(Property),
    /// A property built from the configuration in effect at run time.
    Configured(Arc<PropertyFn>),
}

impl PropertySource {
    fn resolve(&self, config: &PropConfig) -> Property {
        match self {
            Self::Fixed(property) => property.clone(),
            Self::Configured(build) => build(config),
        }
    }
}

impl fmt::Debug for PropertySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(property) => f.debug_tuple("Fixed").field(property).finish(),
            Self::Configured(_) => f.write_str("Configured(..)"),
        }
    }
}

impl From<Property> for PropertySource {
    fn from(property: Property) -> Self {
        Self::Fixed(property)
    }
}

/// A property with the name and tags it is reported under.
#[derive(Debug, Clone)]
pub struct NamedProperty {
    pub name: String,
    pub tags: Vec<String>,
    pub source: PropertySource,
}

impl NamedProperty {
    pub fn new(name: impl Into<String>, property: Property) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            source: PropertySource::Fixed(property),
        }
    }

    /// Property built from the configuration the test runs under, for
    /// properties that read settings such as `max_size` themselves.
    pub fn configured<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&PropConfig) -> Property + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            tags: Vec::new(),
            source: PropertySource::Configured(Arc::new(build)),
        }
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// A runner unit checking one property under one configuration snapshot.
#[derive(Debug, Clone)]
pub struct PropertyTest {
    property: NamedProperty,
    config: PropConfig,
}

impl PropertyTest {
    pub fn new(property: NamedProperty, config: PropConfig) -> Self {
        Self { property, config }
    }

    /// Configuration the next run uses.
    pub fn config(&self) -> &PropConfig {
        &self.config
    }

    /// Replacement test with `name` set from `value`.
    pub fn with_option(&self, name: &str, value: &str) -> Result<Self, SetOptionError> {
        let config = options::set_option(name, value, &self.config)?;
        Ok(Self {
            property: self.property.clone(),
            config,
        })
    }
}

impl TestUnit for PropertyTest {
    fn name(&self) -> &str {
        &self.property.name
    }

    fn tags(&self) -> &[String] {
        &self.property.tags
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        options::describe_options(&self.config)
    }

    fn set_option(&self, name: &str, value: &str) -> Result<Box<dyn TestUnit>, SetOptionError> {
        Ok(Box::new(self.with_option(name, value)?))
    }

    fn run(&self) -> Outcome {
        let span = tracing::info_span!("property", name = %self.property.name);
        let _enter = span.enter();
        run_property(&self.config, self.property.source.resolve(&self.config))
    }
}

/// Runner tree for one property, configured from the engine defaults.
pub fn test_property(property: NamedProperty) -> TestTree {
    test_property_with(&EngineArgs::default(), property)
}

/// Runner tree for one property, configured from `args`.
pub fn test_property_with(args: &EngineArgs, property: NamedProperty) -> TestTree {
    TestTree::single(PropertyTest::new(
        property,
        PropConfig::from_engine_args(args),
    ))
}

/// Group of independent property tests, configured from the engine defaults.
pub fn test_properties(name: impl Into<String>, properties: Vec<NamedProperty>) -> TestTree {
    test_properties_with(&EngineArgs::default(), name, properties)
}

/// Group of independent property tests, each configured from `args`.
pub fn test_properties_with(
    args: &EngineArgs,
    name: impl Into<String>,
    properties: Vec<NamedProperty>,
) -> TestTree {
    group(
        name,
        properties
            .into_iter()
            .map(|property| test_property_with(args, property))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Verbosity;
    use propbridge_engine::proptest::prelude::*;

    fn trivial() -> Property {
        Property::new(Just(()), |_| Ok(()))
    }

    #[test]
    fn test_named_property_tags() {
        let named = NamedProperty::new("p", trivial())
            .tag("fast")
            .with_tags(["arith", "smoke"]);
        assert_eq!(named.tags, vec!["fast", "arith", "smoke"]);
    }

    #[test]
    fn test_set_option_leaves_original_untouched() {
        let test = PropertyTest::new(NamedProperty::new("p", trivial()), PropConfig::default());
        let updated = test.with_option("verbose", "true").unwrap();
        assert_eq!(updated.config().verbosity, Verbosity::Detailed);
        assert_eq!(test.config().verbosity, Verbosity::Normal);
        assert_eq!(updated.name(), "p");
    }

    #[test]
    fn test_options_reflect_current_config() {
        let test = PropertyTest::new(NamedProperty::new("p", trivial()), PropConfig::default());
        let updated = test.set_option("maxSize", "7").unwrap();
        let max_size = updated
            .options()
            .into_iter()
            .find(|d| d.name == "maxSize")
            .map(|d| d.default);
        assert_eq!(max_size.as_deref(), Some("7"));
    }

    #[test]
    fn test_configured_property_sees_config() {
        let named = NamedProperty::configured("bounded", |config| {
            let limit = config.max_size.get();
            Property::new(0..=limit, move |n| {
                prop_assert!(n <= 5);
                Ok(())
            })
        });
        let quiet = PropConfig::default().with_verbosity(Verbosity::Quiet);
        let test = PropertyTest::new(named, quiet);

        assert!(!test.run().is_pass());
        assert!(test.with_option("maxSize", "5").unwrap().run().is_pass());
    }

    #[test]
    fn test_test_properties_groups_units() {
        let tree = test_properties(
            "suite",
            vec![
                NamedProperty::new("a", trivial()),
                NamedProperty::new("b", trivial()).tag("slow"),
            ],
        );
        assert_eq!(tree.name(), "suite");
        assert_eq!(tree.len(), 2);
        let units = tree.units();
        assert_eq!(units[1].path(), "suite/b");
        assert_eq!(units[1].unit.tags(), ["slow".to_string()]);
    }

    #[test]
    fn test_property_with_uses_engine_args() {
        let args = EngineArgs {
            chatty: false,
            ..EngineArgs::default()
        };
        let tree = test_property_with(&args, NamedProperty::new("p", trivial()));
        let silent = tree
            .options()
            .into_iter()
            .find(|d| d.name == "silent")
            .map(|d| d.default);
        assert_eq!(silent.as_deref(), Some("true"));
    }
}
