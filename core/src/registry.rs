//! Flag definitions and the registry that owns them.
//!
//! A [`Registry`] holds the flags of one scope: the root of a command line or
//! the group behind a [`FlagKind::Sub`] flag. Registries are built once and
//! then parsed any number of times; parsing never mutates them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FlagError, Result};

/// How a flag treats the tokens around it.
///
/// # Examples
///
/// ```
/// use flagtree_core::FlagKind;
///
/// assert_eq!(FlagKind::Required.to_string(), "required");
/// assert!(FlagKind::Optional.takes_value());
/// assert!(!FlagKind::Switch.takes_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// May be omitted; an explicit value is optional.
    #[default]
    Optional,
    /// Must be present and must be given a value.
    Required,
    /// May be omitted; never takes a value.
    Switch,
    /// Hands every following token to a nested registry.
    Sub,
}

impl FlagKind {
    /// Returns whether a flag of this kind can bind a value.
    pub fn takes_value(self) -> bool {
        matches!(self, FlagKind::Optional | FlagKind::Required)
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagKind::Optional => "optional",
            FlagKind::Required => "required",
            FlagKind::Switch => "switch",
            FlagKind::Sub => "sub",
        };
        f.write_str(name)
    }
}

/// A single flag definition.
///
/// Use [`optional`](Flag::optional), [`required`](Flag::required),
/// [`switch`](Flag::switch) or [`sub`](Flag::sub) to create one, then chain
/// the `with_*` builders.
///
/// # Examples
///
/// ```
/// use flagtree_core::{Flag, FlagKind};
///
/// let mode = Flag::optional("mode")
///     .with_short('M')
///     .with_param_help("mode")
///     .with_default("best");
/// assert_eq!(mode.kind(), FlagKind::Optional);
/// assert_eq!(mode.short(), Some('M'));
/// assert_eq!(mode.default_value(), "best");
/// ```
#[derive(Debug, Clone)]
pub struct Flag {
    key: String,
    short: Option<char>,
    help: String,
    param_help: String,
    default: String,
    kind: FlagKind,
    exclusive: bool,
    sub: Option<Registry>,
}

impl Flag {
    fn new(key: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            key: key.into(),
            short: None,
            help: String::new(),
            param_help: String::new(),
            default: String::new(),
            kind,
            exclusive: false,
            sub: None,
        }
    }

    /// Creates an optional flag.
    pub fn optional(key: impl Into<String>) -> Self {
        Self::new(key, FlagKind::Optional)
    }

    /// Creates a required flag.
    pub fn required(key: impl Into<String>) -> Self {
        Self::new(key, FlagKind::Required)
    }

    /// Creates a switch.
    pub fn switch(key: impl Into<String>) -> Self {
        Self::new(key, FlagKind::Switch)
    }

    /// Creates a sub flag that owns `group`.
    pub fn sub(key: impl Into<String>, group: Registry) -> Self {
        let mut flag = Self::new(key, FlagKind::Sub);
        flag.sub = Some(group);
        flag
    }

    /// Sets the short key.
    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Sets the help text describing the flag's value.
    pub fn with_param_help(mut self, param_help: impl Into<String>) -> Self {
        self.param_help = param_help.into();
        self
    }

    /// Sets the value reported when none was parsed.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn param_help(&self) -> &str {
        &self.param_help
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    /// Returns whether the flag belongs to its registry's exclusive set.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Returns the nested registry of a sub flag.
    pub fn group(&self) -> Option<&Registry> {
        self.sub.as_ref()
    }
}

/// An ordered set of uniquely keyed flags for one scope.
///
/// # Examples
///
/// ```
/// use flagtree_core::{Flag, Registry};
///
/// let mut sync = Registry::new();
/// sync.define(Flag::required("target").with_short('t')).unwrap();
///
/// let mut root = Registry::new();
/// root.define(Flag::switch("verbose").with_short('v')).unwrap();
/// root.define_sub("sync", Some('S'), "package sync", sync).unwrap();
///
/// assert_eq!(root.len(), 2);
/// assert!(root.get("sync").unwrap().group().is_some());
/// assert_eq!(root.get_short('v').unwrap().key(), "verbose");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    flags: Vec<Flag>,
    keys: HashMap<String, usize>,
    shorts: HashMap<char, usize>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flag definition.
    ///
    /// Fails without modifying the registry if the key is empty, the key or
    /// short key is already taken, or a sub flag has no group.
    pub fn define(&mut self, flag: Flag) -> Result<()> {
        if flag.key.is_empty() {
            return Err(FlagError::InvalidKey(flag.key));
        }
        if flag.kind == FlagKind::Sub && flag.sub.is_none() {
            return Err(FlagError::InvalidKey(flag.key));
        }
        if self.keys.contains_key(&flag.key) {
            return Err(FlagError::DuplicateKey(flag.key));
        }
        if let Some(short) = flag.short {
            if self.shorts.contains_key(&short) {
                return Err(FlagError::DuplicateShortKey(short));
            }
        }

        let index = self.flags.len();
        self.keys.insert(flag.key.clone(), index);
        if let Some(short) = flag.short {
            self.shorts.insert(short, index);
        }
        self.flags.push(Flag {
            exclusive: false,
            ..flag
        });
        Ok(())
    }

    /// Adds a flag from its individual parts.
    ///
    /// `kind` must not be [`FlagKind::Sub`]; use
    /// [`define_sub`](Registry::define_sub) for those. A sub kind here has no
    /// group to own and is rejected with [`FlagError::InvalidKey`] naming
    /// `key`, since the key cannot be defined this way.
    pub fn def(
        &mut self,
        key: &str,
        short: Option<char>,
        help: &str,
        param_help: &str,
        default: &str,
        kind: FlagKind,
    ) -> Result<()> {
        let mut flag = Flag::new(key, kind)
            .with_help(help)
            .with_param_help(param_help)
            .with_default(default);
        flag.short = short;
        self.define(flag)
    }

    /// Adds a sub flag that takes ownership of `group`.
    pub fn define_sub(
        &mut self,
        key: &str,
        short: Option<char>,
        help: &str,
        group: Registry,
    ) -> Result<()> {
        let mut flag = Flag::sub(key, group).with_help(help);
        flag.short = short;
        self.define(flag)
    }

    /// Replaces the registry's exclusive set with `keys`.
    ///
    /// At most one flag of the set may be parsed per pass. All keys are
    /// checked before anything changes, so a failure keeps the previous set.
    pub fn set_exclusive(&mut self, keys: &[&str]) -> Result<()> {
        let indices = keys
            .iter()
            .map(|key| {
                self.keys
                    .get(*key)
                    .copied()
                    .ok_or_else(|| FlagError::NotFound((*key).to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        for flag in &mut self.flags {
            flag.exclusive = false;
        }
        for index in indices {
            self.flags[index].exclusive = true;
        }
        Ok(())
    }

    /// Looks up a flag by key.
    pub fn get(&self, key: &str) -> Option<&Flag> {
        self.index_of(key).map(|index| &self.flags[index])
    }

    /// Looks up a flag by short key.
    pub fn get_short(&self, short: char) -> Option<&Flag> {
        self.short_index_of(short).map(|index| &self.flags[index])
    }

    /// Returns the flags in definition order.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Returns the keys of the exclusive set in definition order.
    pub fn exclusive_keys(&self) -> Vec<&str> {
        self.flags
            .iter()
            .filter(|flag| flag.exclusive)
            .map(|flag| flag.key.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub(crate) fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.get(key).copied()
    }

    pub(crate) fn short_index_of(&self, short: char) -> Option<usize> {
        self.shorts.get(&short).copied()
    }
}
