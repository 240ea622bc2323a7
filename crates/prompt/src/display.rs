//! Display names.
//!
//! Prompt names are only unique within a directory. This module labels every
//! prompt with the shortest string that tells it apart from the others: a
//! unique name is used as is, a shared name gets directory segments prepended
//! (`proj1:setup`, `proj2:setup`), taken from the most specific segment
//! outward until the label is unique within its group.
//!
//! The table is a pure function of the full entry set and is recomputed on
//! demand rather than maintained incrementally.

use crate::id::ID_SEPARATOR;
use crate::types::Prompt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Separator between directory segments and the name in a display label.
pub const LABEL_SEPARATOR: &str = ":";

/// The `(id, name, directory)` triple needed to label a prompt.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NameEntry {
    pub id: String,
    pub name: String,
    pub directory: String,
}

impl NameEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        directory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            directory: directory.into(),
        }
    }

    fn segments(&self) -> Vec<&str> {
        self.directory
            .split(ID_SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl From<&Prompt> for NameEntry {
    fn from(prompt: &Prompt) -> Self {
        Self::new(&prompt.id, &prompt.name, &prompt.directory)
    }
}

/// Display labels keyed by prompt ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNameTable {
    /// ID to label
    pub names: BTreeMap<String, String>,

    /// Entries that could not be labelled from their path alone
    pub warnings: Vec<String>,
}

impl DisplayNameTable {
    /// Label for `id`, if it was part of the input.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Compute a collision-free label for every entry.
///
/// Input order does not matter: entries are sorted before grouping. Entries
/// that share both name and directory path cannot be told apart by path and
/// are labelled with their full ID, with a warning.
///
/// # Example
/// ```
/// use stitch_prompt::display::{calculate_display_names, NameEntry};
///
/// let table = calculate_display_names(vec![
///     NameEntry::new("/proj1/setup", "setup", "/proj1"),
///     NameEntry::new("/proj2/setup", "setup", "/proj2"),
///     NameEntry::new("/proj1/review", "review", "/proj1"),
/// ]);
/// assert_eq!(table.get("/proj1/setup"), Some("proj1:setup"));
/// assert_eq!(table.get("/proj2/setup"), Some("proj2:setup"));
/// assert_eq!(table.get("/proj1/review"), Some("review"));
/// ```
pub fn calculate_display_names<I>(entries: I) -> DisplayNameTable
where
    I: IntoIterator<Item = NameEntry>,
{
    let mut entries: Vec<NameEntry> = entries.into_iter().collect();
    entries.sort();

    let mut table = DisplayNameTable::default();

    // Collapse repeated IDs; after sorting the first of each run wins
    let mut unique: Vec<NameEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(prev) = unique.last().filter(|prev| prev.id == entry.id) {
            if *prev != entry {
                table.warnings.push(format!(
                    "Duplicate id '{}' registered with different name or directory",
                    entry.id
                ));
            }
            continue;
        }
        unique.push(entry);
    }

    let mut groups: BTreeMap<&str, Vec<&NameEntry>> = BTreeMap::new();
    for entry in &unique {
        groups.entry(entry.name.as_str()).or_default().push(entry);
    }

    for (name, members) in groups {
        if members.len() == 1 {
            table.names.insert(members[0].id.clone(), name.to_string());
            continue;
        }
        label_group(name, &members, &mut table);
    }

    ensure_unique(&mut table);

    for warning in &table.warnings {
        tracing::warn!("{}", warning);
    }

    table
}

/// Label members of a group that share `name`.
fn label_group(name: &str, members: &[&NameEntry], table: &mut DisplayNameTable) {
    let paths: Vec<Vec<&str>> = members.iter().map(|m| m.segments()).collect();

    for (i, member) in members.iter().enumerate() {
        let own = &paths[i];
        let others: Vec<&Vec<&str>> = paths
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| p)
            .collect();

        if others.iter().any(|other| *other == own) {
            table.warnings.push(format!(
                "Prompt '{}' shares name and directory path with another prompt; using its id",
                member.id
            ));
            table.names.insert(member.id.clone(), member.id.clone());
            continue;
        }

        // Some k always works: at k = max path length, suffixes equal full paths
        let longest = paths.iter().map(Vec::len).max().unwrap_or(0);
        let k = (1..=longest.max(1))
            .find(|&k| others.iter().all(|other| suffix(other, k) != suffix(own, k)))
            .unwrap_or(longest);

        let mut label: Vec<&str> = suffix(own, k).to_vec();
        label.push(name);
        table
            .names
            .insert(member.id.clone(), label.join(LABEL_SEPARATOR));
    }
}

/// The last `k` segments of `path`, or all of it when shorter.
fn suffix<'p, 's>(path: &'p [&'s str], k: usize) -> &'p [&'s str] {
    &path[path.len().saturating_sub(k)..]
}

/// Fall back to full IDs for any labels that still collide across groups,
/// e.g. a name containing `:` that matches another group's prefixed label.
fn ensure_unique(table: &mut DisplayNameTable) {
    loop {
        let mut owners: HashMap<&str, Vec<&str>> = HashMap::new();
        for (id, label) in &table.names {
            owners.entry(label.as_str()).or_default().push(id.as_str());
        }

        let mut colliding: Vec<String> = owners
            .into_values()
            .filter(|ids| ids.len() > 1)
            .flatten()
            .filter(|id| table.names.get(*id).map(String::as_str) != Some(*id))
            .map(str::to_string)
            .collect();

        if colliding.is_empty() {
            return;
        }

        colliding.sort();
        for id in colliding {
            table.warnings.push(format!(
                "Display name '{}' collides with another prompt; using its id",
                table.names[&id]
            ));
            table.names.insert(id.clone(), id);
        }
    }
}
