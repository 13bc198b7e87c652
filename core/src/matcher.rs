//! Token classification against a registry.
//!
//! Matching is a pure function of a registry and a token. A token names a
//! flag when it is `-x` for a short key, `--key` for a full key, or a cluster
//! of short keys such as `-Svt`. A cluster may cross into nested groups: every
//! sub flag inside it hands the characters after it to its own registry.

use crate::registry::{Flag, Registry};

/// A token resolved to a flag of the registry it was matched against.
#[derive(Debug, Clone)]
pub struct Match<'r> {
    /// Position of the flag in [`Registry::flags`].
    pub index: usize,
    pub flag: &'r Flag,
    /// Short keys that followed the first one in a cluster token. Empty for
    /// single short keys and full keys.
    pub cluster_rest: Vec<char>,
}

/// Reports whether `chars` decompose into short keys of `registry`.
///
/// Every character must be a short key. A sub flag's short key must be
/// followed by at least one more character, and the rest of the cluster is
/// then matched against the sub flag's group instead.
///
/// # Examples
///
/// ```
/// use flagtree_core::matcher::is_cluster_match;
/// use flagtree_core::{Flag, Registry};
///
/// let mut sync = Registry::new();
/// sync.define(Flag::switch("verbose").with_short('v')).unwrap();
/// sync.define(Flag::required("target").with_short('t')).unwrap();
///
/// let mut root = Registry::new();
/// root.define(Flag::sub("sync", sync).with_short('S')).unwrap();
///
/// assert!(is_cluster_match(&root, &['S', 'v', 't']));
/// assert!(!is_cluster_match(&root, &['S']));
/// assert!(!is_cluster_match(&root, &['S', 'x']));
/// ```
pub fn is_cluster_match(registry: &Registry, chars: &[char]) -> bool {
    for (i, c) in chars.iter().enumerate() {
        let Some(flag) = registry.get_short(*c) else {
            return false;
        };
        if let Some(group) = flag.group() {
            let rest = &chars[i + 1..];
            return !rest.is_empty() && is_cluster_match(group, rest);
        }
    }
    true
}

/// Resolves `token` to a flag of `registry`, if it names one.
///
/// A cluster resolves to its first short key and keeps the remaining keys in
/// [`Match::cluster_rest`]. Tokens that are not clusters are tried as a
/// single short key and then, when they start with `--`, as a full key.
pub fn resolve<'r>(registry: &'r Registry, token: &str) -> Option<Match<'r>> {
    let body = token.strip_prefix('-')?;
    let chars: Vec<char> = body.chars().collect();
    let (&first, rest) = chars.split_first()?;

    if is_cluster_match(registry, &chars) {
        return short_match(registry, first, rest.to_vec());
    }
    if rest.is_empty() {
        if let Some(found) = short_match(registry, first, Vec::new()) {
            return Some(found);
        }
    }

    let key = body.strip_prefix('-')?;
    let index = registry.index_of(key)?;
    Some(Match {
        index,
        flag: &registry.flags()[index],
        cluster_rest: Vec::new(),
    })
}

fn short_match(registry: &Registry, short: char, cluster_rest: Vec<char>) -> Option<Match<'_>> {
    let index = registry.short_index_of(short)?;
    Some(Match {
        index,
        flag: &registry.flags()[index],
        cluster_rest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut packages = Registry::new();
        packages.define(Flag::optional("list").with_short('l')).unwrap();
        packages.define(Flag::optional("csv").with_short('c')).unwrap();

        let mut root = Registry::new();
        root.define(Flag::sub("packages", packages).with_short('P')).unwrap();
        root.define(Flag::switch("verbose").with_short('v')).unwrap();
        root.define(Flag::optional("mode").with_short('M')).unwrap();
        root
    }

    #[test]
    fn test_cluster_of_plain_keys_matches() {
        let root = registry();
        assert!(is_cluster_match(&root, &['v', 'M']));
        assert!(!is_cluster_match(&root, &['v', 'x']));
    }

    #[test]
    fn test_cluster_recurses_into_group() {
        let root = registry();
        assert!(is_cluster_match(&root, &['P', 'l', 'c']));
        assert!(!is_cluster_match(&root, &['P', 'v']));
        assert!(!is_cluster_match(&root, &['P']));
    }

    #[test]
    fn test_cluster_stops_at_first_sub() {
        // `v` is checked here, everything after `P` belongs to the group.
        let root = registry();
        assert!(is_cluster_match(&root, &['v', 'P', 'l']));
        assert!(!is_cluster_match(&root, &['v', 'P', 'M']));
    }

    #[test]
    fn test_resolve_short_and_long() {
        let root = registry();

        let found = resolve(&root, "-v").unwrap();
        assert_eq!(found.flag.key(), "verbose");
        assert!(found.cluster_rest.is_empty());

        let found = resolve(&root, "--mode").unwrap();
        assert_eq!(found.flag.key(), "mode");
        assert!(found.cluster_rest.is_empty());

        assert!(resolve(&root, "mode").is_none());
        assert!(resolve(&root, "-mode").is_none());
        assert!(resolve(&root, "---mode").is_none());
    }

    #[test]
    fn test_resolve_lone_sub_short_key() {
        let root = registry();
        let found = resolve(&root, "-P").unwrap();
        assert_eq!(found.flag.key(), "packages");
        assert!(found.cluster_rest.is_empty());
    }

    #[test]
    fn test_resolve_cluster_keeps_rest() {
        let root = registry();
        let found = resolve(&root, "-Plc").unwrap();
        assert_eq!(found.flag.key(), "packages");
        assert_eq!(found.cluster_rest, vec!['l', 'c']);

        let found = resolve(&root, "-vM").unwrap();
        assert_eq!(found.flag.key(), "verbose");
        assert_eq!(found.cluster_rest, vec!['M']);
    }

    #[test]
    fn test_resolve_rejects_bare_dashes() {
        let root = registry();
        assert!(resolve(&root, "-").is_none());
        assert!(resolve(&root, "--").is_none());
        assert!(resolve(&root, "-Px").is_none());
    }
}
