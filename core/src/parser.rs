//! The token-by-token parse loop.
//!
//! Each token is matched against the registry of the current scope. A flag
//! that may take a value is held as pending until the next token shows
//! whether a value follows: a token that names no flag becomes the value,
//! another flag (or the end of input) settles the pending one without a value.
//! A sub flag ends the loop for its scope and parses every remaining token,
//! including the rest of a short key cluster, against its own group.

use tracing::debug;

use crate::error::{FlagError, Result};
use crate::matcher::{self, Match};
use crate::outcome::ParsedArgs;
use crate::registry::{FlagKind, Registry};

impl Registry {
    /// Parses `args` against this registry.
    ///
    /// Tokens are trimmed and empty ones are skipped. The registry itself is
    /// left untouched; the result borrows it.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagtree_core::{Flag, FlagError, Registry};
    ///
    /// let mut registry = Registry::new();
    /// registry.define(Flag::required("config").with_short('c')).unwrap();
    /// registry.define(Flag::switch("verbose").with_short('v')).unwrap();
    ///
    /// let args = registry.parse(["-c", "config.json", "-v"]).unwrap();
    /// assert_eq!(args.value("config"), "config.json");
    /// assert!(args.parsed(&["verbose"]));
    ///
    /// let err = registry.parse(["-c", "-v"]).unwrap_err();
    /// assert_eq!(err, FlagError::RequiresValue("config".into()));
    /// ```
    pub fn parse<I, S>(&self, args: I) -> Result<ParsedArgs<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = args
            .into_iter()
            .map(|arg| arg.as_ref().trim().to_string())
            .filter(|arg| !arg.is_empty())
            .collect();
        debug!(flags = self.len(), tokens = tokens.len(), "Parsing arguments");

        ScopeParser::new(self)
            .run(&tokens)
            .inspect_err(|err| debug!(error = %err, "Parse failed"))
    }

    /// Splits `line` on whitespace and parses the pieces.
    pub fn parse_line(&self, line: &str) -> Result<ParsedArgs<'_>> {
        self.parse(line.split_whitespace())
    }
}

/// A token held until the next one shows what it was.
enum Pending {
    /// A flag that may still receive a value. Never a sub flag: those
    /// dispatch as soon as they are seen.
    Flag(usize),
    /// A token that named no flag.
    Stray(String),
}

impl Pending {
    fn flag_index(self) -> Result<usize> {
        match self {
            Pending::Flag(index) => Ok(index),
            Pending::Stray(token) => Err(FlagError::NotFound(token)),
        }
    }
}

struct ScopeParser<'r> {
    registry: &'r Registry,
    args: ParsedArgs<'r>,
}

impl<'r> ScopeParser<'r> {
    fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            args: ParsedArgs::new(registry),
        }
    }

    fn run(mut self, tokens: &[String]) -> Result<ParsedArgs<'r>> {
        let mut pending = None;

        for (i, token) in tokens.iter().enumerate() {
            let Some(found) = matcher::resolve(self.registry, token) else {
                match pending.take() {
                    None => pending = Some(Pending::Stray(token.clone())),
                    Some(held) => self.bind(held, token)?,
                }
                continue;
            };

            if let Some(held) = pending.take() {
                self.settle(held)?;
            }
            if found.flag.kind() == FlagKind::Sub {
                return self.dispatch(&found, &tokens[i + 1..]);
            }
            if !found.cluster_rest.is_empty() {
                return Err(self.cluster_error(&found));
            }
            pending = Some(Pending::Flag(found.index));
        }

        if let Some(held) = pending.take() {
            self.settle(held)?;
        }
        self.args.finish()
    }

    /// Classifies a cluster led by a flag that cannot carry the rest of it.
    ///
    /// A cluster that reaches a sub flag of this scope is a routing attempt;
    /// otherwise a leading switch is being handed trailing characters.
    fn cluster_error(&self, found: &Match<'r>) -> FlagError {
        let key = found.flag.key().to_string();
        let routes = found.cluster_rest.iter().any(|short| {
            self.registry
                .get_short(*short)
                .is_some_and(|flag| flag.kind() == FlagKind::Sub)
        });
        if !routes && found.flag.kind() == FlagKind::Switch {
            FlagError::SwitchTakesNoValue(key)
        } else {
            FlagError::NotASub(key)
        }
    }

    /// Binds `value` to the held flag.
    fn bind(&mut self, held: Pending, value: &str) -> Result<()> {
        let index = held.flag_index()?;
        let flag = &self.registry.flags()[index];
        if flag.kind() == FlagKind::Switch {
            return Err(FlagError::SwitchTakesNoValue(flag.key().to_string()));
        }
        self.args.consume(index, Some(value))
    }

    /// Consumes the held flag without a value.
    fn settle(&mut self, held: Pending) -> Result<()> {
        let index = held.flag_index()?;
        let flag = &self.registry.flags()[index];
        if flag.kind() == FlagKind::Required {
            return Err(FlagError::RequiresValue(flag.key().to_string()));
        }
        self.args.consume(index, None)
    }

    /// Hands the rest of the cluster and the remaining tokens to the group of
    /// the sub flag in `found`.
    fn dispatch(mut self, found: &Match<'r>, rest: &[String]) -> Result<ParsedArgs<'r>> {
        let key = found.flag.key();
        // `define` rejects sub flags without a group.
        let Some(group) = found.flag.group() else {
            return Err(FlagError::InvalidKey(key.to_string()));
        };
        if found.cluster_rest.is_empty() && rest.is_empty() {
            return Err(FlagError::SubRequiresArguments(key.to_string()));
        }

        let forwarded: Vec<String> = found
            .cluster_rest
            .iter()
            .map(|short| format!("-{short}"))
            .chain(rest.iter().cloned())
            .collect();
        debug!(key, forwarded = ?forwarded, "Dispatching to sub group");

        let parsed = group.parse(&forwarded)?;
        self.args.attach_group(found.index, parsed);
        Ok(self.args)
    }
}
