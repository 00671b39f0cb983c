//! Package version model and ordering.
//!
//! Versions discovered on an index come in two shapes: *standard* versions
//! that follow the PEP 440 precedence scheme, and *legacy* identifiers that
//! do not parse as such but still need a deterministic place in the order.
//! The comparator here defines a strict total order over both shapes:
//!
//! - every legacy version sorts strictly below every standard version;
//! - legacy versions order among themselves by their raw string;
//! - standard versions follow PEP 440 precedence over the supported subset
//!   (epoch, release with implicit zero padding, dev < pre < final < post,
//!   then local label).
//!
//! Equality follows the same key, so `1.0` and `1` compare (and hash) as
//! the same version, the way the index treats them.

mod specifier;

pub use specifier::VersionSpecifiers;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Phase of a pre-release segment, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreTag {
    /// `a` / `alpha`
    Alpha,
    /// `b` / `beta`
    Beta,
    /// `rc` / `c` / `pre` / `preview`
    Rc,
}

impl PreTag {
    fn as_str(self) -> &'static str {
        match self {
            PreTag::Alpha => "a",
            PreTag::Beta => "b",
            PreTag::Rc => "rc",
        }
    }
}

/// A version that parsed as the supported PEP 440 subset.
#[derive(Debug, Clone)]
pub struct StandardVersion {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreTag, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

/// A package version identifier with a strict total order.
#[derive(Debug, Clone)]
pub enum Version {
    /// Follows PEP 440 precedence.
    Standard(StandardVersion),
    /// Did not parse; kept verbatim and ordered below all standard versions.
    Legacy(String),
}

impl Version {
    /// Parse a version string. Never fails: anything outside the supported
    /// PEP 440 subset becomes a [`Version::Legacy`].
    pub fn parse(s: &str) -> Version {
        match StandardVersion::parse(s) {
            Some(v) => Version::Standard(v),
            None => Version::Legacy(s.trim().to_string()),
        }
    }

    /// Whether this version is a pre-release (alpha/beta/rc or dev).
    /// Legacy versions are never treated as pre-releases.
    pub fn is_prerelease(&self) -> bool {
        match self {
            Version::Standard(v) => v.pre.is_some() || v.dev.is_some(),
            Version::Legacy(_) => false,
        }
    }
}

impl StandardVersion {
    /// Parse the supported PEP 440 subset:
    /// `[v][N!]N(.N)*[{a|b|c|rc|alpha|beta|pre|preview}N][.postN][.devN][+local]`
    /// with `.`/`-`/`_` accepted as segment separators and case ignored.
    pub fn parse(s: &str) -> Option<StandardVersion> {
        let s = s.trim().to_ascii_lowercase();
        let mut rest = s.strip_prefix('v').unwrap_or(&s);
        if rest.is_empty() {
            return None;
        }

        // Local label comes after '+', compared separately.
        let local = match rest.split_once('+') {
            Some((head, label)) => {
                if label.is_empty() || !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_') {
                    return None;
                }
                rest = head;
                Some(label.replace(['-', '_'], "."))
            }
            None => None,
        };

        let epoch = match rest.split_once('!') {
            Some((e, tail)) => {
                rest = tail;
                e.parse::<u64>().ok()?
            }
            None => 0,
        };

        let mut release = Vec::new();
        loop {
            let digits = take_digits(&mut rest)?;
            release.push(digits);
            match rest.strip_prefix('.') {
                Some(tail) if tail.starts_with(|c: char| c.is_ascii_digit()) => rest = tail,
                _ => break,
            }
        }

        let pre = if let Some((tag, tail)) = take_pre_tag(rest) {
            rest = tail;
            Some((tag, take_optional_number(&mut rest)))
        } else {
            None
        };

        let post = if let Some(tail) = take_tag(rest, &["post", "rev", "r"]) {
            rest = tail;
            Some(take_optional_number(&mut rest))
        } else if let Some(tail) = rest.strip_prefix('-')
            && tail.starts_with(|c: char| c.is_ascii_digit())
        {
            // Implicit post release, e.g. "1.0-1".
            rest = tail;
            Some(take_digits(&mut rest)?)
        } else {
            None
        };

        let dev = if let Some(tail) = take_tag(rest, &["dev"]) {
            rest = tail;
            Some(take_optional_number(&mut rest))
        } else {
            None
        };

        if !rest.is_empty() {
            return None;
        }

        Some(StandardVersion {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    /// Release digits, zero-padded comparison handled by the comparator.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    fn pre_key(&self) -> PreKey {
        match self.pre {
            Some((tag, n)) => PreKey::Pre(tag, n),
            // A dev release without pre/post sorts before any pre-release
            // of the same release segment.
            None if self.post.is_none() && self.dev.is_some() => PreKey::DevOnly,
            None => PreKey::Final,
        }
    }

    fn cmp_key(&self, other: &StandardVersion) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| cmp_release(&self.release, &other.release))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.map(PostKey::Post).unwrap_or(PostKey::Absent).cmp(
                &other.post.map(PostKey::Post).unwrap_or(PostKey::Absent),
            ))
            .then_with(|| self.dev.map(DevKey::Dev).unwrap_or(DevKey::Final).cmp(
                &other.dev.map(DevKey::Dev).unwrap_or(DevKey::Final),
            ))
            .then_with(|| self.local.cmp(&other.local))
    }
}

/// Key for the pre-release slot: dev-only < pre-release < final.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    DevOnly,
    Pre(PreTag, u64),
    Final,
}

/// Key for the post slot: absent < post.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum PostKey {
    Absent,
    Post(u64),
}

/// Key for the dev slot: dev < absent (1.0.dev1 < 1.0).
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    Final,
}

/// Compare release digit runs with implicit zero padding, so that
/// `1.0` and `1.0.0` compare equal.
fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

fn take_digits(rest: &mut &str) -> Option<u64> {
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let (digits, tail) = rest.split_at(end);
    *rest = tail;
    digits.parse::<u64>().ok()
}

/// Strip an optional separator plus one of the given tags.
fn take_tag<'a>(rest: &'a str, tags: &[&str]) -> Option<&'a str> {
    let trimmed = rest
        .strip_prefix(['.', '-', '_'])
        .unwrap_or(rest);
    for tag in tags {
        if let Some(tail) = trimmed.strip_prefix(tag) {
            // Do not eat a prefix of a longer word ("r" out of "rc1").
            if tail.starts_with(|c: char| c.is_ascii_alphabetic()) {
                continue;
            }
            return Some(tail);
        }
    }
    None
}

fn take_pre_tag(rest: &str) -> Option<(PreTag, &str)> {
    // Longest spellings first so "alpha" is not consumed as "a".
    for (spelling, tag) in [
        ("alpha", PreTag::Alpha),
        ("beta", PreTag::Beta),
        ("preview", PreTag::Rc),
        ("pre", PreTag::Rc),
        ("rc", PreTag::Rc),
        ("a", PreTag::Alpha),
        ("b", PreTag::Beta),
        ("c", PreTag::Rc),
    ] {
        if let Some(tail) = take_tag(rest, &[spelling]) {
            return Some((tag, tail));
        }
    }
    None
}

/// A tag number with an optional separator; defaults to 0 (`1.0a` == `1.0a0`).
fn take_optional_number(rest: &mut &str) -> u64 {
    let trimmed = rest
        .strip_prefix(['.', '-', '_'])
        .unwrap_or(rest);
    let mut tail = trimmed;
    match take_digits(&mut tail) {
        Some(n) => {
            *rest = tail;
            n
        }
        None => 0,
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Version) -> Ordering {
        match (self, other) {
            (Version::Standard(a), Version::Standard(b)) => a.cmp_key(b),
            (Version::Legacy(a), Version::Legacy(b)) => a.cmp(b),
            (Version::Legacy(_), Version::Standard(_)) => Ordering::Less,
            (Version::Standard(_), Version::Legacy(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Version) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Version) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Version::Legacy(raw) => {
                0u8.hash(state);
                raw.hash(state);
            }
            Version::Standard(v) => {
                1u8.hash(state);
                v.epoch.hash(state);
                // Trailing zeros are not significant for equality.
                let mut release = v.release.as_slice();
                while let [head @ .., 0] = release {
                    release = head;
                }
                release.hash(state);
                v.pre.hash(state);
                v.post.hash(state);
                v.dev.hash(state);
                v.local.hash(state);
            }
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Legacy(raw) => write!(f, "{}", raw),
            Version::Standard(v) => {
                if v.epoch > 0 {
                    write!(f, "{}!", v.epoch)?;
                }
                let release: Vec<String> = v.release.iter().map(u64::to_string).collect();
                write!(f, "{}", release.join("."))?;
                if let Some((tag, n)) = v.pre {
                    write!(f, "{}{}", tag.as_str(), n)?;
                }
                if let Some(n) = v.post {
                    write!(f, ".post{}", n)?;
                }
                if let Some(n) = v.dev {
                    write!(f, ".dev{}", n)?;
                }
                if let Some(local) = &v.local {
                    write!(f, "+{}", local)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    fn assert_standard(s: &str) {
        assert!(
            matches!(v(s), Version::Standard(_)),
            "{:?} should parse as standard",
            s
        );
    }

    fn assert_legacy(s: &str) {
        assert!(
            matches!(v(s), Version::Legacy(_)),
            "{:?} should fall back to legacy",
            s
        );
    }

    #[test]
    fn test_parse_standard_shapes() {
        assert_standard("1.0");
        assert_standard("0.9");
        assert_standard("2.0a1");
        assert_standard("2.0.alpha.1");
        assert_standard("1.0b2");
        assert_standard("1.0rc1");
        assert_standard("1.0c1");
        assert_standard("1.0.post2");
        assert_standard("1.0-1");
        assert_standard("1.0.dev3");
        assert_standard("2!1.0");
        assert_standard("v1.2.3");
        assert_standard("1.0+cu118");
        assert_standard("1.0a1.dev1");
    }

    #[test]
    fn test_parse_legacy_shapes() {
        assert_legacy("french toast");
        assert_legacy("1.0.latest");
        assert_legacy("2004d");
        assert_legacy("1.");
        assert_legacy("");
        assert_legacy("1.0+");
    }

    #[test]
    fn test_standard_precedence() {
        assert!(v("1.5") > v("1.0"));
        assert!(v("1.10") > v("1.9"));
        assert!(v("2.0a1") > v("1.0"));
        assert!(v("2.0a1") < v("2.0"));
        assert!(v("2.0a1") < v("2.0b1"));
        assert!(v("2.0b1") < v("2.0rc1"));
        assert!(v("2.0rc1") < v("2.0"));
        assert!(v("1.0") < v("1.0.post1"));
        assert!(v("1.0.dev1") < v("1.0a1"));
        assert!(v("1.0a1.dev1") < v("1.0a1"));
        assert!(v("1.0.post1.dev1") < v("1.0.post1"));
        assert!(v("1!0.5") > v("99.0"));
        assert!(v("1.0+cpu") > v("1.0"));
    }

    #[test]
    fn test_zero_padding_equality() {
        assert_eq!(v("1.0"), v("1"));
        assert_eq!(v("1.0.0"), v("1.0"));
        assert_eq!(v("1.0a1"), v("1.0.a.1"));
        assert_ne!(v("1.0"), v("1.0.1"));
    }

    #[test]
    fn test_zero_padded_versions_dedupe() {
        use std::collections::BTreeSet;
        let set: BTreeSet<Version> = ["1", "1.0", "1.0.0"].iter().map(|s| v(s)).collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_legacy_below_all_standard() {
        assert!(v("2004d") < v("0.0.1"));
        assert!(v("french toast") < v("1.0.dev0"));
    }

    #[test]
    fn test_legacy_order_is_lexical() {
        assert!(v("apple") < v("banana"));
        assert!(v("1.0.latest") > v("1.0.former"));
    }

    #[test]
    fn test_is_prerelease() {
        assert!(!v("1.0").is_prerelease());
        assert!(!v("1.0.post1").is_prerelease());
        assert!(v("2.0a1").is_prerelease());
        assert!(v("2.0b2").is_prerelease());
        assert!(v("2.0rc1").is_prerelease());
        assert!(v("1.0.dev3").is_prerelease());
        assert!(!v("2004d").is_prerelease());
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(v("1.0").to_string(), "1.0");
        assert_eq!(v("V1.0").to_string(), "1.0");
        assert_eq!(v("2.0.alpha.1").to_string(), "2.0a1");
        assert_eq!(v("1.0.preview2").to_string(), "1.0rc2");
        assert_eq!(v("1.0-1").to_string(), "1.0.post1");
        assert_eq!(v("1.0a").to_string(), "1.0a0");
        assert_eq!(v("2!1.0.dev3").to_string(), "2!1.0.dev3");
        assert_eq!(v("french toast").to_string(), "french toast");
    }

    #[test]
    fn test_sort_is_deterministic_under_permutation() {
        let input = ["1.0", "2.0a1", "1.5", "0.9", "2004d", "1.0.post1"];
        let mut expected: Vec<Version> = input.iter().map(|s| v(s)).collect();
        expected.sort();

        // Rotate through every starting point to vary insertion order.
        for offset in 0..input.len() {
            let mut permuted: Vec<Version> = input
                .iter()
                .cycle()
                .skip(offset)
                .take(input.len())
                .map(|s| v(s))
                .collect();
            permuted.sort();
            assert_eq!(permuted, expected);
        }
    }
}
