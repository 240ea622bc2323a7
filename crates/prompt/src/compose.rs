//! Prompt composer for expanding a stored prompt into final text.

use crate::lookup::PromptLookup;
use crate::resolver::{expand, normalize_token, resolve_token, ResolutionContext, ResolverOptions};
use crate::types::ComposedPrompt;
use stitch_core::{AppError, AppResult};

/// Compose a stored prompt.
///
/// This function:
/// 1. Resolves `token` to a root prompt (full ID, or a name looked up in
///    `scope` first and then globally)
/// 2. Expands the root's content in its own context, so a prompt that
///    includes itself is reported as circular
/// 3. Returns the text with its dependencies and warnings
///
/// Ambiguity warnings raised while picking the root come first in the
/// returned warnings.
///
/// # Example
/// ```
/// use stitch_prompt::{compose_prompt, MemoryStore, Prompt, ResolverOptions};
///
/// let store: MemoryStore = [
///     Prompt::new("/p1", "greeting", "Hello, [[name]]!").unwrap(),
///     Prompt::new("/p1", "name", "world").unwrap(),
/// ]
/// .into_iter()
/// .collect();
///
/// let composed = compose_prompt(&store, "greeting", None, &ResolverOptions::default()).unwrap();
/// assert_eq!(composed.text, "Hello, world!");
/// assert_eq!(composed.metadata.source_prompt_id, "/p1/greeting");
/// ```
pub fn compose_prompt<L: PromptLookup + ?Sized>(
    lookup: &L,
    token: &str,
    scope: Option<&str>,
    options: &ResolverOptions,
) -> AppResult<ComposedPrompt> {
    let token = normalize_token(token);
    if token.is_empty() {
        return Err(AppError::NotFound("empty prompt reference".to_string()));
    }

    tracing::debug!("Composing prompt: {}", token);

    let mut warnings = Vec::new();
    let root = resolve_token(lookup, token, scope, &mut warnings)?
        .ok_or_else(|| AppError::NotFound(token.to_string()))?;

    let mut result = expand(
        lookup,
        &root.content,
        &ResolutionContext::for_prompt(&root),
        options,
    )?;

    warnings.append(&mut result.warnings);
    result.warnings = warnings;

    tracing::info!(
        "Composed prompt {} ({} dependencies, {} warnings)",
        root.id,
        result.dependencies.len(),
        result.warnings.len()
    );

    Ok(ComposedPrompt::new(root.id, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::MemoryStore;
    use crate::types::Prompt;

    fn store() -> MemoryStore {
        [
            Prompt::new("/p1", "A", "see [[B]]").unwrap(),
            Prompt::new("/p1", "B", "leaf").unwrap(),
            Prompt::new("/p1", "selfish", "me [[selfish]]").unwrap(),
            Prompt::new("/p2", "B", "other leaf").unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_compose_by_id() {
        let composed =
            compose_prompt(&store(), "/p1/A", None, &ResolverOptions::default()).unwrap();
        assert_eq!(composed.text, "see leaf");
        assert!(composed.metadata.dependencies.contains("/p1/B"));
        assert!(composed.metadata.warnings.is_empty());
    }

    #[test]
    fn test_compose_md_suffix() {
        let composed =
            compose_prompt(&store(), "A.md", Some("/p1"), &ResolverOptions::default()).unwrap();
        assert_eq!(composed.metadata.source_prompt_id, "/p1/A");
    }

    #[test]
    fn test_compose_scoped_name() {
        let composed =
            compose_prompt(&store(), "B", Some("/p2"), &ResolverOptions::default()).unwrap();
        assert_eq!(composed.text, "other leaf");
        assert!(composed.metadata.warnings.is_empty());
    }

    #[test]
    fn test_compose_ambiguous_root() {
        let composed = compose_prompt(&store(), "B", None, &ResolverOptions::default()).unwrap();
        assert_eq!(composed.metadata.source_prompt_id, "/p1/B");
        assert_eq!(composed.metadata.warnings.len(), 1);
    }

    #[test]
    fn test_compose_self_reference() {
        let composed =
            compose_prompt(&store(), "selfish", None, &ResolverOptions::default()).unwrap();
        assert_eq!(composed.text, "me [[CIRCULAR DEPENDENCY: selfish]]");
        assert_eq!(composed.metadata.warnings.len(), 1);
    }

    #[test]
    fn test_compose_missing() {
        let result = compose_prompt(&store(), "ghost", None, &ResolverOptions::default());
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = compose_prompt(&store(), "  ", None, &ResolverOptions::default());
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
