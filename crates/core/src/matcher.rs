// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attribute filtering for listings
//!
//! A filter maps attribute names to comma-separated glob options. Options
//! within a key are OR'd, keys are AND'd. Comparison ignores case and treats
//! `_` and `-` as the same character.

use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("invalid filter '{0}': expected key=pattern[,pattern...]")]
    InvalidFilter(String),
    #[error("invalid pattern for '{key}': {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
struct Clause {
    key: String,
    pattern: Regex,
}

/// Compiled attribute filter
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    clauses: Vec<Clause>,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace('_', "-")
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out
}

impl Matcher {
    /// A matcher with no constraints
    pub fn all() -> Self {
        Self::default()
    }

    /// Compile a filter of attribute name to comma-separated glob options
    pub fn new(filter: &BTreeMap<String, String>) -> Result<Self, MatcherError> {
        let mut clauses = Vec::new();
        for (key, options) in filter {
            let globs: Vec<String> = options
                .split(',')
                .map(normalize)
                .filter(|o| !o.is_empty())
                .map(|o| glob_to_regex(&o))
                .collect();
            if globs.is_empty() {
                continue;
            }
            let source = format!("(?s)^(?:{})$", globs.join("|"));
            let pattern = Regex::new(&source).map_err(|source| MatcherError::InvalidPattern {
                key: key.clone(),
                source,
            })?;
            clauses.push(Clause {
                key: normalize(key),
                pattern,
            });
        }
        Ok(Self { clauses })
    }

    /// Compile repeated `key=patterns` arguments; repeating a key adds options
    pub fn parse<S: AsRef<str>>(filters: &[S]) -> Result<Self, MatcherError> {
        let mut filter: BTreeMap<String, String> = BTreeMap::new();
        for raw in filters {
            let raw = raw.as_ref();
            let (key, options) = raw
                .split_once('=')
                .ok_or_else(|| MatcherError::InvalidFilter(raw.to_string()))?;
            if key.trim().is_empty() {
                return Err(MatcherError::InvalidFilter(raw.to_string()));
            }
            filter
                .entry(key.trim().to_string())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(options);
                })
                .or_insert_with(|| options.to_string());
        }
        Self::new(&filter)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether `attributes` satisfies every key of the filter. Attributes
    /// the map lacks are matched as the empty string.
    pub fn matches(&self, attributes: &BTreeMap<String, String>) -> bool {
        self.clauses.iter().all(|clause| {
            let value = attributes
                .iter()
                .find(|(name, _)| normalize(name) == clause.key)
                .map(|(_, value)| normalize(value))
                .unwrap_or_default();
            clause.pattern.is_match(&value)
        })
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
