//! Version specifier sets, as found in `requires_python` metadata.
//!
//! Supports the comparison operators of PEP 440 (`==`, `!=`, `<=`, `>=`,
//! `<`, `>`, `~=`) including trailing `.*` wildcards on equality
//! operators. Arbitrary-equality (`===`) and legacy operands are rejected.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

use super::{StandardVersion, Version};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    Compatible,
}

#[derive(Debug, Clone)]
struct Specifier {
    op: Op,
    operand: StandardVersion,
    /// Trailing `.*`: prefix match on the release digits (== / != only).
    wildcard: bool,
    raw: String,
}

/// A comma-separated conjunction of version specifiers.
#[derive(Debug, Clone)]
pub struct VersionSpecifiers(Vec<Specifier>);

impl FromStr for VersionSpecifiers {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<VersionSpecifiers> {
        let mut clauses = Vec::new();
        for clause in s.split(',') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            clauses.push(parse_clause(clause)?);
        }
        Ok(VersionSpecifiers(clauses))
    }
}

impl fmt::Display for VersionSpecifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw: Vec<&str> = self.0.iter().map(|s| s.raw.as_str()).collect();
        write!(f, "{}", raw.join(","))
    }
}

fn parse_clause(clause: &str) -> Result<Specifier> {
    let (op, rest) = if let Some(rest) = clause.strip_prefix("~=") {
        (Op::Compatible, rest)
    } else if let Some(rest) = clause.strip_prefix("==") {
        (Op::Eq, rest)
    } else if let Some(rest) = clause.strip_prefix("!=") {
        (Op::Ne, rest)
    } else if let Some(rest) = clause.strip_prefix("<=") {
        (Op::Le, rest)
    } else if let Some(rest) = clause.strip_prefix(">=") {
        (Op::Ge, rest)
    } else if let Some(rest) = clause.strip_prefix('<') {
        (Op::Lt, rest)
    } else if let Some(rest) = clause.strip_prefix('>') {
        (Op::Gt, rest)
    } else {
        return Err(anyhow!("Missing comparison operator in specifier {:?}", clause));
    };

    let mut operand = rest.trim();
    let wildcard = match operand.strip_suffix(".*") {
        Some(head) => {
            if !matches!(op, Op::Eq | Op::Ne) {
                return Err(anyhow!(
                    "Wildcard is only valid with == or != in specifier {:?}",
                    clause
                ));
            }
            operand = head;
            true
        }
        None => false,
    };

    let operand = StandardVersion::parse(operand)
        .ok_or_else(|| anyhow!("Invalid version operand in specifier {:?}", clause))?;

    if op == Op::Compatible && operand.release().len() < 2 {
        return Err(anyhow!(
            "~= requires at least a two-segment release in specifier {:?}",
            clause
        ));
    }

    Ok(Specifier {
        op,
        operand,
        wildcard,
        raw: clause.to_string(),
    })
}

impl VersionSpecifiers {
    /// Whether the given version satisfies every clause. Legacy versions
    /// satisfy nothing but the empty specifier set.
    pub fn contains(&self, version: &Version) -> bool {
        let Version::Standard(v) = version else {
            return self.0.is_empty();
        };
        self.0.iter().all(|spec| spec.matches(v))
    }
}

impl Specifier {
    fn matches(&self, version: &StandardVersion) -> bool {
        if self.wildcard {
            let matched = release_prefix_matches(version, &self.operand);
            return match self.op {
                Op::Eq => matched,
                Op::Ne => !matched,
                _ => unreachable!("wildcard rejected for other operators at parse time"),
            };
        }

        let ord = version.cmp_key(&self.operand);
        match self.op {
            Op::Lt => ord.is_lt(),
            Op::Le => ord.is_le(),
            Op::Gt => ord.is_gt(),
            Op::Ge => ord.is_ge(),
            Op::Eq => ord.is_eq(),
            Op::Ne => ord.is_ne(),
            // ~=X.Y.Z means >=X.Y.Z and ==X.Y.* on the shortened release.
            Op::Compatible => {
                let mut prefix = self.operand.clone();
                prefix.release.pop();
                ord.is_ge() && release_prefix_matches(version, &prefix)
            }
        }
    }
}

/// Whether `version` starts with the release digits of `prefix`
/// (zero-padded), with the same epoch.
fn release_prefix_matches(version: &StandardVersion, prefix: &StandardVersion) -> bool {
    if version.epoch != prefix.epoch {
        return false;
    }
    prefix
        .release()
        .iter()
        .enumerate()
        .all(|(i, digit)| version.release().get(i).copied().unwrap_or(0) == *digit)
}
