//! Prompt types for Stitch.
//!
//! This module defines the domain entities shared by the codec, the resolver
//! and the reference index.

use crate::id::{generate_id, parse_id, terminal_segment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use stitch_core::AppResult;

/// A stored prompt, as seen by the engine.
///
/// The engine never mutates prompts; it reads them through a
/// [`PromptLookup`](crate::lookup::PromptLookup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Unique identifier derived from directory and name
    pub id: String,

    /// Display-local name (single path segment)
    pub name: String,

    /// Directory the prompt lives under
    pub directory: String,

    /// Raw body, may contain `[[token]]` markers
    pub content: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Prompt {
    /// Create a prompt from its directory and name, generating the ID.
    pub fn new(
        directory: impl Into<String>,
        name: &str,
        content: impl Into<String>,
    ) -> AppResult<Self> {
        let directory = directory.into();
        let id = generate_id(&directory, name)?;
        let name = terminal_segment(&id).to_string();

        Ok(Self {
            id,
            name,
            directory,
            content: content.into(),
            tags: Vec::new(),
            description: None,
        })
    }

    /// Create a prompt from an existing ID.
    ///
    /// The name is the ID's terminal segment and the directory everything
    /// before it. IDs without a separator are rejected.
    pub fn from_id(id: impl Into<String>, content: impl Into<String>) -> AppResult<Self> {
        let id = id.into();
        let (directory, name) = parse_id(&id)?;

        Ok(Self {
            id,
            name,
            directory,
            content: content.into(),
            tags: Vec::new(),
            description: None,
        })
    }

    /// Attach tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Outcome of expanding a piece of prompt text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionResult {
    /// Text with every marker substituted or replaced by a placeholder
    pub text: String,

    /// IDs of every prompt pulled in, at any depth
    pub dependencies: BTreeSet<String>,

    /// One message per anomalous marker, depth-first left-to-right
    pub warnings: Vec<String>,
}

impl ExpansionResult {
    /// True when expansion produced no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// A root prompt expanded in its own context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedPrompt {
    /// Fully expanded text
    pub text: String,

    /// Metadata about the composition
    pub metadata: ComposedPromptMetadata,
}

/// Metadata about a composed prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedPromptMetadata {
    /// Root prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Transitive dependency IDs
    pub dependencies: BTreeSet<String>,

    /// Warnings raised during expansion
    pub warnings: Vec<String>,
}

impl ComposedPrompt {
    /// Build from a root prompt ID and its expansion.
    pub fn new(source_prompt_id: String, result: ExpansionResult) -> Self {
        Self {
            text: result.text,
            metadata: ComposedPromptMetadata {
                source_prompt_id,
                dependencies: result.dependencies,
                warnings: result.warnings,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::AppError;

    #[test]
    fn test_prompt_new_generates_id() {
        let prompt = Prompt::new("/p1", "setup.md", "body").unwrap();
        assert_eq!(prompt.id, "/p1/setup");
        assert_eq!(prompt.name, "setup");
        assert_eq!(prompt.directory, "/p1");
    }

    #[test]
    fn test_prompt_from_id_splits_id() {
        let prompt = Prompt::from_id("/p1/nested/review", "body").unwrap();
        assert_eq!(prompt.name, "review");
        assert_eq!(prompt.directory, "/p1/nested");
        assert_eq!(generate_id(&prompt.directory, &prompt.name).unwrap(), prompt.id);

        let root = Prompt::from_id("/loose", "body").unwrap();
        assert_eq!(root.directory, "");
        assert_eq!(root.name, "loose");
    }

    #[test]
    fn test_prompt_from_id_rejects_bare_name() {
        assert!(matches!(
            Prompt::from_id("loose", "body"),
            Err(AppError::InvalidId(_))
        ));
        assert!(matches!(
            Prompt::from_id("/p1/", "body"),
            Err(AppError::InvalidId(_))
        ));
    }

    #[test]
    fn test_prompt_deserialization_defaults() {
        let json = r#"{"id":"/p/a","name":"a","directory":"/p","content":"x"}"#;
        let prompt: Prompt = serde_json::from_str(json).unwrap();
        assert!(prompt.tags.is_empty());
        assert!(prompt.description.is_none());
    }

    #[test]
    fn test_composed_prompt_creation() {
        let mut result = ExpansionResult {
            text: "see leaf".to_string(),
            ..Default::default()
        };
        result.dependencies.insert("/p1/B".to_string());

        let composed = ComposedPrompt::new("/p1/A".to_string(), result);
        assert_eq!(composed.text, "see leaf");
        assert_eq!(composed.metadata.source_prompt_id, "/p1/A");
        assert!(composed.metadata.dependencies.contains("/p1/B"));
        assert!(composed.metadata.warnings.is_empty());
    }
}
