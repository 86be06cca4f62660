use crate::core::models::ids::XsId;
use std::collections::{BTreeMap, BTreeSet};

/// Multigroup data generated for one XS ID.
///
/// The payload is whatever the lattice physics code produced for that identifier.
/// It is carried through the library untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XsData {
    pub payload: Vec<u8>,
}

impl XsData {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// The set of cross sections available to the simulation, keyed by XS ID.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XsLibrary {
    name: String,
    entries: BTreeMap<XsId, XsData>,
}

impl XsLibrary {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, xs_id: XsId, data: XsData) -> Self {
        self.insert(xs_id, data);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Inserts data for an identifier, returning the entry it replaced.
    pub fn insert(&mut self, xs_id: XsId, data: XsData) -> Option<XsData> {
        self.entries.insert(xs_id, data)
    }

    pub fn get(&self, xs_id: &XsId) -> Option<&XsData> {
        self.entries.get(xs_id)
    }

    /// Whether the library already holds an entry for `xs_id`.
    pub fn contains(&self, xs_id: &XsId) -> bool {
        self.entries.contains_key(xs_id)
    }

    pub fn xs_ids(&self) -> impl Iterator<Item = &XsId> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&XsId, &XsData)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The identifiers of `required` that this library has no entry for.
    pub fn missing_from(&self, required: &BTreeSet<XsId>) -> BTreeSet<XsId> {
        required
            .iter()
            .filter(|id| !self.contains(id))
            .cloned()
            .collect()
    }

    /// Returns a new library holding this library's entries overlaid with `other`'s.
    ///
    /// Entries present in both are taken from `other`. The name of `self` is kept.
    pub fn merged_with(&self, other: &XsLibrary) -> XsLibrary {
        let mut merged = self.clone();
        for (xs_id, data) in other.entries() {
            merged.insert(xs_id.clone(), data.clone());
        }
        merged
    }
}

impl FromIterator<(XsId, XsData)> for XsLibrary {
    fn from_iter<T: IntoIterator<Item = (XsId, XsData)>>(iter: T) -> Self {
        Self {
            name: String::new(),
            entries: iter.into_iter().collect(),
        }
    }
}
