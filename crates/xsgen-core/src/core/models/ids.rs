use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

new_key_type! {
    pub struct BlockId;
}

/// A cross-section identifier: a type code followed by a single burnup-group code.
///
/// Identifiers such as `"AA"` or `"FUELB"` group regions of similar composition and
/// burnup so that they can share one set of multigroup cross sections. Ordering and
/// equality follow the concatenated string form, which keeps sorted collections of
/// identifiers stable for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct XsId(String);

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum XsIdError {
    #[error("XS ID '{0}' is too short; it needs a type code and a burnup-group code")]
    TooShort(String),
    #[error("XS ID '{0}' contains characters other than ASCII letters and digits")]
    InvalidCharacter(String),
}

impl XsId {
    /// Builds an identifier from its type code and burnup-group code.
    pub fn from_parts(xs_type: &str, bu_group: char) -> Result<Self, XsIdError> {
        let mut raw = String::with_capacity(xs_type.len() + 1);
        raw.push_str(xs_type);
        raw.push(bu_group);
        raw.parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The type code, i.e. everything but the trailing burnup-group character.
    pub fn xs_type(&self) -> &str {
        &self.0[..self.0.len() - 1]
    }

    pub fn bu_group(&self) -> char {
        // Validated ASCII on construction, so the last byte is the last char.
        self.0.as_bytes()[self.0.len() - 1] as char
    }
}

impl FromStr for XsId {
    type Err = XsIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 2 {
            return Err(XsIdError::TooShort(s.to_string()));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(XsIdError::InvalidCharacter(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for XsId {
    type Error = XsIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<XsId> for String {
    fn from(id: XsId) -> Self {
        id.0
    }
}

impl fmt::Display for XsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Formats identifiers as a bracketed, quoted list, e.g. `['AA', 'BB']`.
///
/// The iteration order of the input is kept; pass a sorted collection for
/// reproducible output.
pub fn format_xs_ids<'a>(ids: impl IntoIterator<Item = &'a XsId>) -> String {
    let quoted: Vec<String> = ids.into_iter().map(|id| format!("'{}'", id)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Parses a comma-separated list such as `"AA, BB"` into a sorted identifier set.
pub fn parse_xs_id_list(list: &str) -> Result<BTreeSet<XsId>, XsIdError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
