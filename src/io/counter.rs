//! Tab-separated count files.
//!
//! Each line is `<count>\t<field>[\t<field>...]`. A single field is a scalar
//! key, several fields form a tuple key, and repeated keys are summed.

use crate::error::{Result, WkrError};
use crate::io::lines::{lines, Encoding};
use crate::io::reference::IntoFileReference;
use std::collections::hash_map::{self, HashMap};
use std::fmt;

/// Key of a tally entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TallyKey {
    Scalar(String),
    /// Zero or several fields
    Tuple(Vec<String>),
}

impl TallyKey {
    fn from_fields(mut fields: Vec<String>) -> Self {
        if fields.len() == 1 {
            Self::Scalar(fields.remove(0))
        } else {
            Self::Tuple(fields)
        }
    }
}

impl From<&str> for TallyKey {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for TallyKey {
    fn from(fields: [&str; N]) -> Self {
        Self::from_fields(fields.iter().map(|f| f.to_string()).collect())
    }
}

impl fmt::Display for TallyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.write_str(value),
            Self::Tuple(fields) => f.write_str(&fields.join("\t")),
        }
    }
}

/// Multiset of keys with integer counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<TallyKey, i64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` to `key`, creating it if needed
    pub fn add(&mut self, key: impl Into<TallyKey>, count: i64) {
        *self.counts.entry(key.into()).or_insert(0) += count;
    }

    /// Count for `key`; absent keys count zero
    pub fn get(&self, key: &TallyKey) -> i64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, TallyKey, i64> {
        self.counts.iter()
    }

    /// Entries ordered by descending count, then key
    pub fn most_common(&self) -> Vec<(&TallyKey, i64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, &v)| (k, v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl<K: Into<TallyKey>> FromIterator<(K, i64)> for Tally {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        let mut tally = Self::new();
        for (key, count) in iter {
            tally.add(key, count);
        }
        tally
    }
}

impl<'t> IntoIterator for &'t Tally {
    type Item = (&'t TallyKey, &'t i64);
    type IntoIter = hash_map::Iter<'t, TallyKey, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

/// Parse one tally line into its key and count
fn parse_line(line: &str, line_number: usize) -> Result<(TallyKey, i64)> {
    let mut fields = line.trim_end().split('\t');
    let count_field = match fields.next() {
        Some(field) => field,
        None => {
            return Err(WkrError::FormatError {
                line_number,
                message: "line has no fields".to_string(),
            })
        }
    };
    let count = count_field
        .trim_start()
        .parse::<i64>()
        .map_err(|e| WkrError::FormatError {
            line_number,
            message: format!("invalid count {:?}: {}", count_field, e),
        })?;
    let key = TallyKey::from_fields(fields.map(str::to_string).collect());
    Ok((key, count))
}

/// Load a tab-separated count file.
///
/// # Errors
/// * [`WkrError::FormatError`] - a count field is not a base-10 integer (including blank lines)
/// * [`WkrError::DecodeError`] - a line is not valid under `encoding`
pub fn load_counter<'a>(target: impl IntoFileReference<'a>, encoding: Encoding) -> Result<Tally> {
    let mut tally = Tally::new();
    for (index, line) in lines(target, encoding)?.enumerate() {
        let (key, count) = parse_line(&line?, index + 1)?;
        tally.add(key, count);
    }
    Ok(tally)
}
