//! Inclusion resolver.
//!
//! Expands `[[token]]` markers by substituting the referenced prompt's content,
//! recursively. Expansion runs in two explicit steps: [`tokenize`] finds the
//! marker spans in a body, then [`expand`] walks those spans depth-first,
//! resolving each token and descending into the prompt it names.
//!
//! Broken markers never abort expansion. Each one is replaced by an inert
//! placeholder and reported as a warning:
//!
//! | Marker problem         | Placeholder                         |
//! |------------------------|-------------------------------------|
//! | empty token            | `[[EMPTY INCLUSION]]`               |
//! | circular inclusion     | `[[CIRCULAR DEPENDENCY: token]]`    |
//! | unknown prompt         | `[[PROMPT NOT FOUND: token]]`       |
//! | nesting depth exceeded | `[[MAX DEPTH EXCEEDED: token]]`     |
//!
//! Lookup faults are different: they come back as `Err` and stop expansion.

use crate::id::{is_qualified, strip_md_suffix};
use crate::lookup::PromptLookup;
use crate::types::{ExpansionResult, Prompt};
use regex::Regex;
use std::sync::OnceLock;
use stitch_core::{config::DEFAULT_MAX_DEPTH, AppError, AppResult, ResolverConfig};

pub const EMPTY_INCLUSION: &str = "[[EMPTY INCLUSION]]";

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\[\[([^\]]*)\]\]").expect("valid marker regex"))
}

/// Limits applied while expanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Maximum nesting depth, `None` for no cap
    pub max_depth: Option<usize>,

    /// Stop on inclusions already present in the ancestor chain
    pub detect_cycles: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            detect_cycles: true,
        }
    }
}

impl From<&ResolverConfig> for ResolverOptions {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            detect_cycles: config.detect_cycles,
        }
    }
}

impl ResolverOptions {
    /// Options with no depth cap; cycle detection alone bounds recursion.
    pub fn unbounded() -> Self {
        Self {
            max_depth: None,
            detect_cycles: true,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cycle_detection(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }

    /// At least one of cycle detection or a depth cap must be active.
    pub fn validate(&self) -> AppResult<()> {
        if !self.detect_cycles && self.max_depth.is_none() {
            return Err(AppError::Config(
                "resolver needs cycle detection or a depth cap".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where a body is being expanded from.
///
/// Each recursive step gets its own context with one more ancestor; sibling
/// markers never see each other's chains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    directory: Option<String>,
    ancestors: Vec<String>,
    depth: usize,
}

impl ResolutionContext {
    /// A root context with no directory scope and an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// A root context scoped to `directory`.
    pub fn in_directory(directory: impl Into<String>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Self::default()
        }
    }

    /// A root context for expanding `prompt`'s own content: scoped to its
    /// directory, with its ID already in the chain.
    pub fn for_prompt(prompt: &Prompt) -> Self {
        Self {
            directory: Some(prompt.directory.clone()),
            ancestors: vec![prompt.id.clone()],
            depth: 0,
        }
    }

    /// Seed the ancestor chain, e.g. with the ID of the prompt being edited.
    pub fn with_ancestors(mut self, ancestors: Vec<String>) -> Self {
        self.ancestors = ancestors;
        self
    }

    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn is_ancestor(&self, id: &str) -> bool {
        self.ancestors.iter().any(|a| a == id)
    }

    fn descend(&self, prompt: &Prompt) -> Self {
        let mut ancestors = Vec::with_capacity(self.ancestors.len() + 1);
        ancestors.extend(self.ancestors.iter().cloned());
        ancestors.push(prompt.id.clone());

        Self {
            directory: Some(prompt.directory.clone()),
            ancestors,
            depth: self.depth + 1,
        }
    }
}

/// One `[[token]]` occurrence in a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpan<'a> {
    /// Byte offset of the opening `[[`
    pub start: usize,
    /// Byte offset just past the closing `]]`
    pub end: usize,
    /// Raw text between the brackets
    pub token: &'a str,
}

/// Find every inclusion marker in `content`, left to right.
pub fn tokenize(content: &str) -> Vec<MarkerSpan<'_>> {
    marker_regex()
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let token = caps.get(1)?;
            Some(MarkerSpan {
                start: whole.start(),
                end: whole.end(),
                token: token.as_str(),
            })
        })
        .collect()
}

/// Trim whitespace and drop a legacy `.md` suffix.
pub(crate) fn normalize_token(raw: &str) -> &str {
    strip_md_suffix(raw.trim())
}

/// Expand every inclusion marker in `content`.
///
/// # Example
/// ```
/// use stitch_prompt::{expand, MemoryStore, Prompt, ResolutionContext, ResolverOptions};
///
/// let store: MemoryStore = [
///     Prompt::new("/p1", "A", "see [[B]]").unwrap(),
///     Prompt::new("/p1", "B", "leaf").unwrap(),
/// ]
/// .into_iter()
/// .collect();
///
/// let result = expand(
///     &store,
///     "see [[B]]",
///     &ResolutionContext::in_directory("/p1"),
///     &ResolverOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(result.text, "see leaf");
/// assert!(result.dependencies.contains("/p1/B"));
/// assert!(result.warnings.is_empty());
/// ```
pub fn expand<L: PromptLookup + ?Sized>(
    lookup: &L,
    content: &str,
    context: &ResolutionContext,
    options: &ResolverOptions,
) -> AppResult<ExpansionResult> {
    options.validate()?;

    let expander = Expander { lookup, options };
    let mut out = ExpansionResult {
        text: String::with_capacity(content.len()),
        ..ExpansionResult::default()
    };
    expander.expand_into(content, context, &mut out)?;
    Ok(out)
}

struct Expander<'a, L: ?Sized> {
    lookup: &'a L,
    options: &'a ResolverOptions,
}

impl<L: PromptLookup + ?Sized> Expander<'_, L> {
    fn expand_into(
        &self,
        content: &str,
        context: &ResolutionContext,
        out: &mut ExpansionResult,
    ) -> AppResult<()> {
        let mut cursor = 0;

        for span in tokenize(content) {
            out.text.push_str(&content[cursor..span.start]);
            self.expand_marker(normalize_token(span.token), context, out)?;
            cursor = span.end;
        }

        out.text.push_str(&content[cursor..]);
        Ok(())
    }

    fn expand_marker(
        &self,
        token: &str,
        context: &ResolutionContext,
        out: &mut ExpansionResult,
    ) -> AppResult<()> {
        if token.is_empty() {
            record_warning(out, "Empty inclusion marker".to_string());
            out.text.push_str(EMPTY_INCLUSION);
            return Ok(());
        }

        if self.options.detect_cycles && context.is_ancestor(token) {
            circular(out, token);
            return Ok(());
        }

        let resolved = resolve_token(self.lookup, token, context.directory(), &mut out.warnings)?;
        let prompt = match resolved {
            Some(prompt) => prompt,
            None => {
                record_warning(out, format!("Prompt not found: {}", token));
                out.text.push_str(&format!("[[PROMPT NOT FOUND: {}]]", token));
                return Ok(());
            }
        };

        // Unqualified self-references only show up once the name is resolved
        if self.options.detect_cycles && context.is_ancestor(&prompt.id) {
            circular(out, token);
            return Ok(());
        }

        if let Some(max_depth) = self.options.max_depth {
            if context.depth() >= max_depth {
                record_warning(
                    out,
                    format!("Maximum inclusion depth {} exceeded at: {}", max_depth, token),
                );
                out.text.push_str(&format!("[[MAX DEPTH EXCEEDED: {}]]", token));
                return Ok(());
            }
        }

        tracing::debug!(token, id = %prompt.id, depth = context.depth(), "Resolved inclusion");

        out.dependencies.insert(prompt.id.clone());
        let child = context.descend(&prompt);
        self.expand_into(&prompt.content, &child, out)
    }
}

/// Map a token to a prompt: full IDs directly, simple names in `directory`
/// first, then globally with the lowest ID winning ties. An ambiguous global
/// match is reported through `warnings`.
pub(crate) fn resolve_token<L: PromptLookup + ?Sized>(
    lookup: &L,
    token: &str,
    directory: Option<&str>,
    warnings: &mut Vec<String>,
) -> AppResult<Option<Prompt>> {
    if is_qualified(token) {
        return lookup.get_by_id(token);
    }

    if let Some(directory) = directory {
        if let Some(prompt) = lookup.get_by_name(token, Some(directory))? {
            return Ok(Some(prompt));
        }
    }

    let mut candidates = lookup.find_all_by_name(token)?;
    candidates.sort_by(|a, b| a.id.cmp(&b.id));

    if candidates.len() > 1 {
        let directories: Vec<&str> = candidates.iter().map(|p| p.directory.as_str()).collect();
        let message = format!(
            "Ambiguous reference '{}' matches prompts in: {}; using {}",
            token,
            directories.join(", "),
            candidates[0].id
        );
        tracing::warn!("{}", message);
        warnings.push(message);
    }

    Ok(candidates.into_iter().next())
}

fn record_warning(out: &mut ExpansionResult, message: String) {
    tracing::warn!("{}", message);
    out.warnings.push(message);
}

fn circular(out: &mut ExpansionResult, token: &str) {
    record_warning(out, format!("Circular dependency detected: {}", token));
    out.text.push_str(&format!("[[CIRCULAR DEPENDENCY: {}]]", token));
}
