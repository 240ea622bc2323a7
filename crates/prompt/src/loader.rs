//! Prompt loader for reading markdown prompt files into a snapshot.
//!
//! Every `*.md` file below a prompt directory becomes one prompt. Its
//! directory is the parent path relative to the loaded root (empty for files
//! directly in the root) and its name the file stem, so `nested/inner.md`
//! gets the ID `nested/inner` wherever the root lives on disk. A file may
//! start with YAML front matter:
//!
//! ```text
//! ---
//! description: Project bootstrap steps
//! tags: [setup, onboarding]
//! ---
//! Body text, possibly with [[other]] markers.
//! ```
//!
//! Loading is read-only; nothing here writes prompt files.

use crate::lookup::MemoryStore;
use crate::types::Prompt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stitch_core::{AppError, AppResult};

const PROMPT_EXTENSION: &str = "md";

/// Optional metadata block at the top of a prompt file.
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    tags: Vec<String>,
    description: Option<String>,
}

/// Load every prompt below each directory into one snapshot.
///
/// Directories are loaded in order. When two files produce the same ID, e.g.
/// `setup.md` at the top of two roots, the first one loaded is kept.
///
/// # Example
/// ```no_run
/// use stitch_prompt::load_store;
/// use std::path::PathBuf;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = load_store(&[PathBuf::from("prompts")])?;
/// println!("Loaded {} prompts", store.len());
/// # Ok(())
/// # }
/// ```
pub fn load_store(directories: &[PathBuf]) -> AppResult<MemoryStore> {
    let mut store = MemoryStore::new();

    for directory in directories {
        let count = load_directory(directory, &mut store)?;
        tracing::info!("Loaded {} prompts from {:?}", count, directory);
    }

    Ok(store)
}

/// Load the prompts below `root` into `store`, returning how many were added.
pub fn load_directory(root: &Path, store: &mut MemoryStore) -> AppResult<usize> {
    if !root.is_dir() {
        return Err(AppError::Config(format!(
            "Prompt directory does not exist: {:?}",
            root
        )));
    }

    let mut added = 0;

    for entry in walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden files and directories below the root
            e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.')
        })
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();

        if !entry.file_type().is_file()
            || path.extension().and_then(|s| s.to_str()) != Some(PROMPT_EXTENSION)
        {
            continue;
        }

        let directory = logical_directory(root, path)?;
        let prompt = load_prompt_file(path, &directory)?;

        if store.contains(&prompt.id) {
            tracing::warn!("Skipping duplicate prompt id {} from {:?}", prompt.id, path);
            continue;
        }

        tracing::debug!("Loaded prompt {} from {:?}", prompt.id, path);
        store.insert(prompt);
        added += 1;
    }

    Ok(added)
}

/// Read and parse a single prompt file as a prompt under `directory`.
pub fn load_prompt_file(path: &Path, directory: &str) -> AppResult<Prompt> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AppError::Prompt(format!("Prompt file name is not UTF-8: {:?}", path)))?;

    let contents = std::fs::read_to_string(path)?;

    parse_prompt(directory, name, &contents)
        .map_err(|e| AppError::Prompt(format!("Failed to load {:?}: {}", path, e)))
}

/// Build a prompt from raw file contents.
///
/// `name` may still carry its `.md` extension.
pub fn parse_prompt(directory: &str, name: &str, raw: &str) -> AppResult<Prompt> {
    let (front_matter, body) = split_front_matter(raw);

    let meta: FrontMatter = match front_matter {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)
            .map_err(|e| AppError::Prompt(format!("Invalid front matter: {}", e)))?,
        _ => FrontMatter::default(),
    };

    validate_front_matter(&meta)?;

    let mut prompt = Prompt::new(directory, name, body)?.with_tags(meta.tags);
    if let Some(description) = meta.description {
        prompt = prompt.with_description(description);
    }

    Ok(prompt)
}

/// Split a leading `---` delimited YAML block from the body.
fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))
    else {
        return (None, raw);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }

    // Unterminated block: treat the whole file as body
    (None, raw)
}

fn validate_front_matter(meta: &FrontMatter) -> AppResult<()> {
    if meta.tags.iter().any(|t| t.trim().is_empty()) {
        return Err(AppError::Prompt("Tags cannot be empty".to_string()));
    }
    Ok(())
}

/// The parent of `path` relative to `root`, with forward slashes.
fn logical_directory(root: &Path, path: &Path) -> AppResult<String> {
    let relative = path
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .ok_or_else(|| {
            AppError::Prompt(format!("Prompt file {:?} is outside {:?}", path, root))
        })?;

    Ok(path_to_directory(relative))
}

fn path_to_directory(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose_prompt;
    use crate::lookup::PromptLookup;
    use crate::resolver::ResolverOptions;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_split_front_matter() {
        let (meta, body) = split_front_matter("---\ntags: [a]\n---\nbody\n");
        assert_eq!(meta, Some("tags: [a]\n"));
        assert_eq!(body, "body\n");

        let (meta, body) = split_front_matter("no front matter");
        assert!(meta.is_none());
        assert_eq!(body, "no front matter");

        let (meta, body) = split_front_matter("---\nnever closed\n");
        assert!(meta.is_none());
        assert_eq!(body, "---\nnever closed\n");
    }

    #[test]
    fn test_parse_prompt_with_front_matter() {
        let raw = "---\ndescription: Greets\ntags: [intro, short]\n---\nHello [[name]]";
        let prompt = parse_prompt("/p", "greeting.md", raw).unwrap();
        assert_eq!(prompt.id, "/p/greeting");
        assert_eq!(prompt.content, "Hello [[name]]");
        assert_eq!(prompt.tags, vec!["intro", "short"]);
        assert_eq!(prompt.description.as_deref(), Some("Greets"));
    }

    #[test]
    fn test_parse_prompt_invalid_front_matter() {
        let result = parse_prompt("/p", "bad.md", "---\ntags: [unclosed\n---\nbody");
        assert!(matches!(result, Err(AppError::Prompt(_))));

        let result = parse_prompt("/p", "blank.md", "---\ntags: ['  ']\n---\nbody");
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_load_directory_tree() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "setup.md", "top [[nested/inner]]");
        write(temp_dir.path(), "nested/inner.md", "inner");
        write(temp_dir.path(), "notes.txt", "ignored");
        write(temp_dir.path(), ".hidden/secret.md", "ignored");

        let store = load_store(&[temp_dir.path().to_path_buf()]).unwrap();
        assert_eq!(store.len(), 2);

        let setup = store.get_by_id("/setup").unwrap().unwrap();
        assert_eq!(setup.name, "setup");
        assert_eq!(setup.directory, "");

        let inner = store.get_by_id("nested/inner").unwrap().unwrap();
        assert_eq!(inner.name, "inner");
        assert_eq!(inner.directory, "nested");
    }

    #[test]
    fn test_loaded_qualified_marker_expands() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "setup.md", "top [[nested/inner]]");
        write(temp_dir.path(), "nested/inner.md", "inner [[deeper/leaf.md]]");
        write(temp_dir.path(), "nested/deeper/leaf.md", "leaf");

        let store = load_store(&[temp_dir.path().to_path_buf()]).unwrap();
        let composed =
            compose_prompt(&store, "setup", None, &ResolverOptions::default()).unwrap();

        assert_eq!(composed.text, "top inner [[PROMPT NOT FOUND: deeper/leaf]]");
        assert!(composed.metadata.dependencies.contains("nested/inner"));

        let leaf = compose_prompt(
            &store,
            "nested/deeper/leaf",
            None,
            &ResolverOptions::default(),
        )
        .unwrap();
        assert_eq!(leaf.text, "leaf");
    }

    #[test]
    fn test_load_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_store(&[temp_dir.path().join("absent")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_same_layout_in_two_roots_keeps_first() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a/shared.md", "first");
        write(temp_dir.path(), "b/shared.md", "second");

        let store = load_store(&[temp_dir.path().join("a"), temp_dir.path().join("b")]).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_by_id("/shared").unwrap().unwrap().content, "first");
    }
}
