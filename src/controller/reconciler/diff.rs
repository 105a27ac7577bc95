//! # SAN Diff
//!
//! Set difference over SAN lists.

use std::collections::HashSet;

/// Elements of `a` that do not appear in `b`
///
/// Case-sensitive set subtraction; position never matters. The output keeps
/// the order in which elements first appear in `a` and lists each element
/// once, however often it is repeated.
#[must_use]
pub fn set_difference<'a, S: AsRef<str>>(a: &'a [S], b: &[S]) -> Vec<&'a str> {
    let exclude: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();
    let mut seen = HashSet::new();
    a.iter()
        .map(AsRef::as_ref)
        .filter(|s| !exclude.contains(s) && seen.insert(*s))
        .collect()
}

/// Result of comparing the declared SANs with the SANs ACM reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanDiff {
    /// On the remote certificate, absent from the declaration
    pub extra: Vec<String>,
    /// Declared, absent from the remote certificate
    pub missing: Vec<String>,
}

impl SanDiff {
    #[must_use]
    pub fn compute<S: AsRef<str>>(declared: &[S], current: &[S]) -> Self {
        let owned = |v: Vec<&str>| v.into_iter().map(ToString::to_string).collect();
        Self {
            extra: owned(set_difference(current, declared)),
            missing: owned(set_difference(declared, current)),
        }
    }
}
