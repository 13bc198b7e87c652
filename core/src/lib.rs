//! Hierarchical command-line flag parsing.
//!
//! This crate resolves a sequence of command-line tokens against a tree of
//! declared flags:
//!
//! - [`Registry`] — the flags of one scope, looked up by key or short key,
//!   with an optional exclusive set.
//! - [`Flag`] — one definition: [`FlagKind::Optional`], [`FlagKind::Required`],
//!   [`FlagKind::Switch`], or [`FlagKind::Sub`], which owns a nested registry
//!   and receives every token after it.
//! - [`ParsedArgs`] — the result of [`Registry::parse`]: parsed state and
//!   values per flag, plus the results of any sub group that fired.
//!
//! Values are plain strings; converting them is left to the caller.
//! Registries can also be declared in YAML or JSON ([`RegistryConfig`]) and
//! printed as a usage table ([`render::usage`]).
//!
//! # Example
//!
//! ```
//! use flagtree_core::*;
//!
//! let mut sync = Registry::new();
//! sync.define(Flag::switch("verbose").with_short('v')).unwrap();
//! sync.define(Flag::required("target").with_short('t')).unwrap();
//! sync.define(Flag::required("mode").with_short('m')).unwrap();
//!
//! let mut root = Registry::new();
//! root.define_sub("sync", Some('S'), "package sync", sync).unwrap();
//!
//! let args = root.parse(["-Svt", "target", "-m", "mode"]).unwrap();
//! let sync = args.group("sync").unwrap();
//! assert!(sync.parsed(&["verbose", "target", "mode"]));
//! assert_eq!(sync.value("target"), "target");
//!
//! assert_eq!(root.parse(["-S"]).unwrap_err(), FlagError::SubRequiresArguments("sync".into()));
//! ```

mod config;
mod error;
pub mod matcher;
mod outcome;
mod parser;
mod registry;
pub mod render;

pub use config::{FlagConfig, RegistryConfig};
pub use error::{ConfigError, FlagError, Result};
pub use outcome::{ParsedArgs, ResultNode, ResultTree};
pub use registry::{Flag, FlagKind, Registry};
