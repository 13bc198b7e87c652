//! Parse results.
//!
//! A successful [`Registry::parse`](crate::Registry::parse) returns a
//! [`ParsedArgs`] that borrows the registry it was produced from. It records
//! which flags were seen, the values bound to them, and the results of any
//! sub group the parse was handed to.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{ConfigError, FlagError, Result};
use crate::registry::{FlagKind, Registry};

/// Nested view of a parse: key to [`ResultNode`] for every parsed flag.
pub type ResultTree = BTreeMap<String, ResultNode>;

/// One entry of a [`ResultTree`].
///
/// Serializes as `null`, a string, or a nested map.
///
/// # Examples
///
/// ```
/// use flagtree_core::{ResultNode, ResultTree};
///
/// let mut tree = ResultTree::new();
/// tree.insert("verbose".into(), ResultNode::Unset);
/// tree.insert("config".into(), ResultNode::Value("config.json".into()));
///
/// let json = serde_json::to_string(&tree).unwrap();
/// assert_eq!(json, r#"{"config":"config.json","verbose":null}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultNode {
    /// Parsed without an explicit value.
    Unset,
    /// Parsed with a value.
    Value(String),
    /// A sub flag that fired, with its group's results.
    Group(ResultTree),
}

#[derive(Debug, Clone, Default)]
struct Slot<'r> {
    parsed: bool,
    value: Option<String>,
    group: Option<ParsedArgs<'r>>,
}

/// The outcome of parsing one scope.
///
/// # Examples
///
/// ```
/// use flagtree_core::{Flag, Registry};
///
/// let mut registry = Registry::new();
/// registry.define(Flag::optional("mode").with_short('M').with_default("best")).unwrap();
/// registry.define(Flag::switch("verbose").with_short('v')).unwrap();
///
/// let args = registry.parse(["-v"]).unwrap();
/// assert!(args.parsed(&[]));
/// assert!(args.parsed(&["verbose"]));
/// assert!(!args.parsed(&["verbose", "mode"]));
/// assert_eq!(args.value("mode"), "best");
/// ```
#[derive(Debug, Clone)]
pub struct ParsedArgs<'r> {
    registry: &'r Registry,
    slots: Vec<Slot<'r>>,
    complete: bool,
}

impl<'r> ParsedArgs<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            slots: vec![Slot::default(); registry.len()],
            complete: false,
        }
    }

    /// Marks the flag at `index` as parsed, binding `value` if non-empty.
    ///
    /// Fails if the flag was already parsed, or if it is exclusive and
    /// another exclusive flag of the registry was already parsed.
    pub(crate) fn consume(&mut self, index: usize, value: Option<&str>) -> Result<()> {
        let flags = self.registry.flags();
        let flag = &flags[index];
        if self.slots[index].parsed {
            return Err(FlagError::Duplicate(flag.key().to_string()));
        }
        if flag.is_exclusive() {
            let other = flags
                .iter()
                .zip(&self.slots)
                .find(|(other, slot)| other.is_exclusive() && slot.parsed);
            if let Some((other, _)) = other {
                return Err(FlagError::Exclusive {
                    key: flag.key().to_string(),
                    other: other.key().to_string(),
                });
            }
        }

        let slot = &mut self.slots[index];
        slot.parsed = true;
        slot.value = value.filter(|v| !v.is_empty()).map(str::to_string);
        trace!(key = flag.key(), has_value = slot.value.is_some(), "Consumed flag");
        Ok(())
    }

    /// Records that the sub flag at `index` fired and handed off to `group`.
    pub(crate) fn attach_group(&mut self, index: usize, group: ParsedArgs<'r>) {
        let slot = &mut self.slots[index];
        slot.parsed = true;
        slot.group = Some(group);
    }

    /// Runs the end-of-scope checks and marks the scope complete.
    ///
    /// An empty scope fails with [`FlagError::NoArguments`] before any
    /// required flag is looked at.
    pub(crate) fn finish(mut self) -> Result<Self> {
        if !self.slots.iter().any(|slot| slot.parsed) {
            return Err(FlagError::NoArguments);
        }
        let flags = self.registry.flags();
        if let Some((flag, _)) = flags
            .iter()
            .zip(&self.slots)
            .find(|(flag, slot)| flag.kind() == FlagKind::Required && !slot.parsed)
        {
            return Err(FlagError::RequiredMissing(flag.key().to_string()));
        }
        self.complete = true;
        Ok(self)
    }

    /// Returns the registry this result was parsed against.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Returns the value of `key`.
    ///
    /// That is the parsed value when one was given, otherwise the flag's
    /// default. Unknown keys yield an empty string.
    pub fn value(&self, key: &str) -> &str {
        let Some(index) = self.registry.index_of(key) else {
            return "";
        };
        self.slots[index]
            .value
            .as_deref()
            .unwrap_or_else(|| self.registry.flags()[index].default_value())
    }

    /// Returns whether `key` was parsed with an explicit value.
    pub fn has_value(&self, key: &str) -> bool {
        self.slot(key).is_some_and(|slot| slot.value.is_some())
    }

    /// Reports parsed state.
    ///
    /// With no keys, returns whether this scope finished its own validation,
    /// which is false for a scope that handed off to a sub group. Otherwise
    /// returns whether every named flag was parsed; unknown keys count as
    /// not parsed.
    pub fn parsed(&self, keys: &[&str]) -> bool {
        if keys.is_empty() {
            return self.complete;
        }
        keys.iter()
            .all(|key| self.slot(key).is_some_and(|slot| slot.parsed))
    }

    /// Returns the results of the sub group behind `key`, if it fired.
    pub fn group(&self, key: &str) -> Option<&ParsedArgs<'r>> {
        self.slot(key).and_then(|slot| slot.group.as_ref())
    }

    /// Builds the nested key to value view of this result.
    pub fn tree(&self) -> ResultTree {
        self.registry
            .flags()
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.parsed)
            .map(|(flag, slot)| {
                let node = match (&slot.group, &slot.value) {
                    (Some(group), _) => ResultNode::Group(group.tree()),
                    (None, Some(value)) => ResultNode::Value(value.clone()),
                    (None, None) => ResultNode::Unset,
                };
                (flag.key().to_string(), node)
            })
            .collect()
    }

    /// Fills a `T` from the flags parsed in this scope.
    ///
    /// Each parsed flag becomes a field named after its key: a switch is
    /// `true`, a sub flag is the nested struct of its group, and any other
    /// flag is its [`value`](Self::value) as a string. Flags that were not
    /// parsed are left out, so their fields need `#[serde(default)]` or an
    /// `Option`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagtree_core::{Flag, Registry};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Options {
    ///     mode: String,
    ///     #[serde(default)]
    ///     verbose: bool,
    /// }
    ///
    /// let mut registry = Registry::new();
    /// registry.define(Flag::optional("mode").with_short('M').with_default("best")).unwrap();
    /// registry.define(Flag::switch("verbose").with_short('v')).unwrap();
    ///
    /// let options: Options = registry.parse(["-M", "-v"]).unwrap().deserialize().unwrap();
    /// assert_eq!(options.mode, "best");
    /// assert!(options.verbose);
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> std::result::Result<T, ConfigError> {
        Ok(serde_json::from_value(Value::Object(self.fields()))?)
    }

    fn fields(&self) -> Map<String, Value> {
        self.registry
            .flags()
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.parsed)
            .map(|(flag, slot)| {
                let value = match (&slot.group, flag.kind()) {
                    (Some(group), _) => Value::Object(group.fields()),
                    (None, FlagKind::Switch) => Value::Bool(true),
                    (None, _) => Value::String(self.value(flag.key()).to_string()),
                };
                (flag.key().to_string(), value)
            })
            .collect()
    }

    fn slot(&self, key: &str) -> Option<&Slot<'r>> {
        self.registry.index_of(key).map(|index| &self.slots[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Flag;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.define(Flag::optional("list").with_short('l')).unwrap();
        registry.define(Flag::optional("export").with_short('e')).unwrap();
        registry
            .define(Flag::optional("csv").with_default("comma"))
            .unwrap();
        registry.set_exclusive(&["list", "export"]).unwrap();
        registry
    }

    #[test]
    fn test_consume_binds_value() {
        let registry = registry();
        let mut args = ParsedArgs::new(&registry);
        args.consume(2, Some("tab")).unwrap();

        assert!(args.parsed(&["csv"]));
        assert!(args.has_value("csv"));
        assert_eq!(args.value("csv"), "tab");
    }

    #[test]
    fn test_consume_empty_value_falls_back_to_default() {
        let registry = registry();
        let mut args = ParsedArgs::new(&registry);
        args.consume(2, Some("")).unwrap();

        assert!(args.parsed(&["csv"]));
        assert!(!args.has_value("csv"));
        assert_eq!(args.value("csv"), "comma");
    }

    #[test]
    fn test_consume_rejects_duplicate() {
        let registry = registry();
        let mut args = ParsedArgs::new(&registry);
        args.consume(2, None).unwrap();
        assert_eq!(
            args.consume(2, Some("x")),
            Err(FlagError::Duplicate("csv".to_string()))
        );
    }

    #[test]
    fn test_consume_rejects_second_exclusive() {
        let registry = registry();
        let mut args = ParsedArgs::new(&registry);
        args.consume(0, None).unwrap();
        args.consume(2, None).unwrap();
        assert_eq!(
            args.consume(1, None),
            Err(FlagError::Exclusive {
                key: "export".to_string(),
                other: "list".to_string(),
            })
        );
    }

    #[test]
    fn test_finish_requires_something_parsed() {
        let registry = registry();
        let args = ParsedArgs::new(&registry);
        assert_eq!(args.finish().unwrap_err(), FlagError::NoArguments);
    }

    #[test]
    fn test_finish_reports_no_arguments_before_required() {
        let mut registry = registry();
        registry.define(Flag::required("ip")).unwrap();
        let args = ParsedArgs::new(&registry);
        assert_eq!(args.finish().unwrap_err(), FlagError::NoArguments);

        let mut args = ParsedArgs::new(&registry);
        args.consume(2, None).unwrap();
        assert_eq!(
            args.finish().unwrap_err(),
            FlagError::RequiredMissing("ip".to_string())
        );
    }

    #[test]
    fn test_unknown_keys() {
        let registry = registry();
        let mut args = ParsedArgs::new(&registry);
        args.consume(0, None).unwrap();
        let args = args.finish().unwrap();

        assert_eq!(args.value("missing"), "");
        assert!(!args.parsed(&["list", "missing"]));
        assert!(args.group("list").is_none());
    }

    #[test]
    fn test_tree_lists_parsed_flags_only() {
        let registry = registry();
        let mut args = ParsedArgs::new(&registry);
        args.consume(0, None).unwrap();
        args.consume(2, Some("tab")).unwrap();

        let tree = args.tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree["list"], ResultNode::Unset);
        assert_eq!(tree["csv"], ResultNode::Value("tab".to_string()));
    }
}
