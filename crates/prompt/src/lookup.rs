//! Read access to the prompt collection.
//!
//! The engine never owns storage. Everything it knows about prompts comes
//! through [`PromptLookup`], so callers can back it with files, a database or
//! the in-memory [`MemoryStore`].

use crate::types::Prompt;
use std::collections::BTreeMap;
use stitch_core::AppResult;

/// Read interface over a consistent snapshot of prompts.
///
/// `Ok(None)` / an empty list means the prompt legitimately does not exist.
/// `Err` is reserved for faults in the backing store and is propagated by the
/// engine unchanged.
pub trait PromptLookup {
    /// Fetch a prompt by exact ID.
    fn get_by_id(&self, id: &str) -> AppResult<Option<Prompt>>;

    /// Fetch a prompt by simple name.
    ///
    /// With `Some(scope)` only prompts whose directory equals `scope` are
    /// candidates. With `None` every prompt is a candidate.
    fn get_by_name(&self, name: &str, scope: Option<&str>) -> AppResult<Option<Prompt>>;

    /// Every prompt with this name, sorted by ID.
    fn find_all_by_name(&self, name: &str) -> AppResult<Vec<Prompt>>;

    /// Every known prompt, sorted by ID.
    fn list_all(&self) -> AppResult<Vec<Prompt>>;
}

/// In-memory prompt snapshot keyed by ID.
///
/// Iteration follows ID order, so every query is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    prompts: BTreeMap<String, Prompt>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a prompt, returning the one it replaced if the ID was taken.
    pub fn insert(&mut self, prompt: Prompt) -> Option<Prompt> {
        self.prompts.insert(prompt.id.clone(), prompt)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.prompts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Iterate over prompts in ID order without cloning.
    pub fn iter(&self) -> impl Iterator<Item = &Prompt> {
        self.prompts.values()
    }
}

impl FromIterator<Prompt> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Prompt>>(iter: I) -> Self {
        let mut store = Self::new();
        for prompt in iter {
            store.insert(prompt);
        }
        store
    }
}

impl PromptLookup for MemoryStore {
    fn get_by_id(&self, id: &str) -> AppResult<Option<Prompt>> {
        Ok(self.prompts.get(id).cloned())
    }

    fn get_by_name(&self, name: &str, scope: Option<&str>) -> AppResult<Option<Prompt>> {
        Ok(self
            .prompts
            .values()
            .filter(|p| p.name == name)
            .find(|p| scope.map_or(true, |dir| p.directory == dir))
            .cloned())
    }

    fn find_all_by_name(&self, name: &str) -> AppResult<Vec<Prompt>> {
        Ok(self
            .prompts
            .values()
            .filter(|p| p.name == name)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> AppResult<Vec<Prompt>> {
        Ok(self.prompts.values().cloned().collect())
    }
}
