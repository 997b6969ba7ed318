// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact textual node-set representation.
//!
//! A hostlist is an ordered collection of node names that parses and renders
//! the bracketed range syntax used by cluster tooling: `n[01-04],gpu3` means
//! `n01,n02,n03,n04,gpu3`. Order is preserved through every operation so
//! drain planning visits jobs in a stable sequence.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from hostlist parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostlistError {
    #[error("unmatched bracket in hostlist expression: {0}")]
    UnmatchedBracket(String),
    #[error("invalid range in hostlist expression: {0}")]
    BadRange(String),
}

/// An ordered set of node names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hostlist {
    hosts: Vec<String>,
}

impl Hostlist {
    /// Create an empty hostlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a hostlist expression, expanding bracketed ranges.
    ///
    /// The empty string parses to the empty hostlist.
    pub fn parse(expr: &str) -> Result<Self, HostlistError> {
        let mut list = Self::new();
        for token in split_top_level(expr)? {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            expand_token(token, &mut list.hosts)?;
        }
        Ok(list)
    }

    /// Append a single host name.
    pub fn push(&mut self, host: impl Into<String>) {
        self.hosts.push(host.into());
    }

    /// Append every host of `other`, preserving order.
    pub fn merge(&mut self, other: &Hostlist) {
        self.hosts.extend(other.hosts.iter().cloned());
    }

    /// Remove duplicate names, keeping the first occurrence of each.
    pub fn dedup(&mut self) {
        let mut seen = Vec::with_capacity(self.hosts.len());
        self.hosts.retain(|h| {
            if seen.contains(h) {
                false
            } else {
                seen.push(h.clone());
                true
            }
        });
    }

    /// Position of `host` in the list, if present.
    pub fn find(&self, host: &str) -> Option<usize> {
        self.hosts.iter().position(|h| h == host)
    }

    /// Whether `host` is a member.
    pub fn contains(&self, host: &str) -> bool {
        self.find(host).is_some()
    }

    /// Number of hosts.
    pub fn count(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Remove and return the first host.
    pub fn shift(&mut self) -> Option<String> {
        if self.hosts.is_empty() {
            None
        } else {
            Some(self.hosts.remove(0))
        }
    }

    /// Iterate host names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    /// Render the list back into compact ranged form.
    ///
    /// Adjacent hosts sharing a prefix and digit width collapse into a
    /// bracketed range; everything else is emitted verbatim.
    pub fn to_ranged_string(&self) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut i = 0;
        while i < self.hosts.len() {
            match numeric_suffix(&self.hosts[i]) {
                None => {
                    out.push(self.hosts[i].clone());
                    i += 1;
                }
                Some((prefix, width, start)) => {
                    let mut end = start;
                    let mut j = i + 1;
                    while j < self.hosts.len() {
                        match numeric_suffix(&self.hosts[j]) {
                            Some((p, w, n)) if p == prefix && w == width && n == end + 1 => {
                                end = n;
                                j += 1;
                            }
                            _ => break,
                        }
                    }
                    if end > start {
                        out.push(format!(
                            "{prefix}[{start:0width$}-{end:0width$}]",
                            width = width
                        ));
                    } else {
                        out.push(self.hosts[i].clone());
                    }
                    i = j;
                }
            }
        }
        out.join(",")
    }
}

impl fmt::Display for Hostlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ranged_string())
    }
}

impl FromStr for Hostlist {
    type Err = HostlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromIterator<String> for Hostlist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            hosts: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Hostlist {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_ranged_string())
    }
}

impl<'de> Deserialize<'de> for Hostlist {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// Split on commas that are not inside brackets.
fn split_top_level(expr: &str) -> Result<Vec<&str>, HostlistError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in expr.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| HostlistError::UnmatchedBracket(expr.to_string()))?;
            }
            ',' if depth == 0 => {
                parts.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(HostlistError::UnmatchedBracket(expr.to_string()));
    }
    parts.push(&expr[start..]);
    Ok(parts)
}

/// Expand one token (`n[01-04,09]` or a plain name) into `out`.
fn expand_token(token: &str, out: &mut Vec<String>) -> Result<(), HostlistError> {
    let Some(open) = token.find('[') else {
        out.push(token.to_string());
        return Ok(());
    };
    let close = token
        .rfind(']')
        .ok_or_else(|| HostlistError::UnmatchedBracket(token.to_string()))?;
    if close < open {
        return Err(HostlistError::UnmatchedBracket(token.to_string()));
    }
    let prefix = &token[..open];
    let body = &token[open + 1..close];
    let suffix = &token[close + 1..];

    for part in body.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(HostlistError::BadRange(token.to_string()));
        }
        match part.split_once('-') {
            None => {
                let n: u64 = part
                    .parse()
                    .map_err(|_| HostlistError::BadRange(token.to_string()))?;
                out.push(format!("{prefix}{n:0width$}{suffix}", width = part.len()));
            }
            Some((lo, hi)) => {
                let width = lo.len();
                let lo: u64 = lo
                    .parse()
                    .map_err(|_| HostlistError::BadRange(token.to_string()))?;
                let hi: u64 = hi
                    .parse()
                    .map_err(|_| HostlistError::BadRange(token.to_string()))?;
                if hi < lo {
                    return Err(HostlistError::BadRange(token.to_string()));
                }
                for n in lo..=hi {
                    out.push(format!("{prefix}{n:0width$}{suffix}"));
                }
            }
        }
    }
    Ok(())
}

/// Split a host into (prefix, digit width, value) when it ends in digits.
fn numeric_suffix(host: &str) -> Option<(&str, usize, u64)> {
    let digits = host
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    if digits >= host.len() {
        return None;
    }
    let (prefix, num) = host.split_at(digits);
    let value: u64 = num.parse().ok()?;
    Some((prefix, num.len(), value))
}

#[cfg(test)]
#[path = "hostlist_tests.rs"]
mod tests;
