//! Bidirectional search <-> classification index

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The taxonomy section: one primary classification per search id, the
/// reverse lookup, and non-primary classifications of multi-parent concepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyIndex {
    #[serde(default)]
    pub search_to_classification: BTreeMap<String, String>,
    #[serde(default)]
    pub classification_to_search: BTreeMap<String, String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl TaxonomyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary classification of a search id
    pub fn classification_of(&self, search_path: &str) -> Option<&str> {
        self.search_to_classification
            .get(search_path)
            .map(String::as_str)
    }

    /// Search id owning a primary classification
    pub fn search_of(&self, classification_path: &str) -> Option<&str> {
        self.classification_to_search
            .get(classification_path)
            .map(String::as_str)
    }

    pub fn aliases_of(&self, search_path: &str) -> &[String] {
        self.aliases
            .get(search_path)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Is `path` a registered search id, primary classification or alias?
    pub fn knows(&self, path: &str) -> bool {
        self.owner_of(path).is_some()
    }

    /// Register a primary mapping in both directions
    pub fn register(&mut self, search_path: &str, classification_path: &str) {
        self.search_to_classification
            .insert(search_path.to_string(), classification_path.to_string());
        self.classification_to_search
            .insert(classification_path.to_string(), search_path.to_string());
    }

    /// Record non-primary classifications; an empty list leaves the index as is
    pub fn set_aliases(&mut self, search_path: &str, aliases: Vec<String>) {
        if !aliases.is_empty() {
            self.aliases.insert(search_path.to_string(), aliases);
        }
    }

    /// Replace the primary classification of `search_path`.
    ///
    /// Returns the previous classification, if any.
    pub fn remap(&mut self, search_path: &str, classification_path: &str) -> Option<String> {
        let previous = self
            .search_to_classification
            .insert(search_path.to_string(), classification_path.to_string());
        if let Some(old) = &previous {
            if self.search_of(old) == Some(search_path) {
                self.classification_to_search.remove(old);
            }
        }
        self.classification_to_search
            .insert(classification_path.to_string(), search_path.to_string());
        previous
    }

    /// The search id that owns `path`, whether `path` is a search id,
    /// a primary classification or an alias
    pub fn owner_of(&self, path: &str) -> Option<&str> {
        if let Some((search, _)) = self.search_to_classification.get_key_value(path) {
            return Some(search.as_str());
        }
        if let Some(search) = self.search_of(path) {
            return Some(search);
        }
        self.aliases
            .iter()
            .find(|(_, paths)| paths.iter().any(|p| p == path))
            .map(|(search, _)| search.as_str())
    }

    /// Canonical classification for a declared parent.
    ///
    /// A search id maps to its primary classification; a registered
    /// classification is kept; a sense form `name/qualifier...` maps to the
    /// most specific registered classification ending in `name` that
    /// contains every qualifier. Anything else is returned verbatim.
    pub fn canonical_parent(&self, parent: &str) -> String {
        if let Some(classification) = self.classification_of(parent) {
            return classification.to_string();
        }
        if self.classification_to_search.contains_key(parent) {
            return parent.to_string();
        }
        self.sense_match(parent)
            .unwrap_or(parent)
            .to_string()
    }

    /// Search id a relation target refers to, or the target as written
    pub fn canonical_target(&self, target: &str) -> String {
        let canonical = self.canonical_parent(target);
        self.owner_of(&canonical)
            .unwrap_or(target)
            .to_string()
    }

    pub fn mapping_count(&self) -> usize {
        self.search_to_classification.len()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.values().map(Vec::len).sum()
    }

    fn sense_match(&self, reference: &str) -> Option<&str> {
        let mut segments = reference.split('/');
        let name = segments.next().filter(|s| !s.is_empty())?;
        let qualifiers: Vec<&str> = segments.collect();

        self.classification_to_search
            .keys()
            .filter(|path| {
                let parts: Vec<&str> = path.split('/').collect();
                parts.last() == Some(&name) && qualifiers.iter().all(|q| parts.contains(q))
            })
            // Keys iterate in ascending order; keep the first of the deepest
            .fold(None::<&String>, |best, path| match best {
                Some(current) if segment_count(current) >= segment_count(path) => Some(current),
                _ => Some(path),
            })
            .map(String::as_str)
    }
}

pub(crate) fn segment_count(path: &str) -> usize {
    path.split('/').count()
}
