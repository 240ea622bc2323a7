//! Reverse dependency lookup.
//!
//! Answers "which prompts include this one, directly or transitively?" by
//! expanding every prompt and checking its dependency set. There is no
//! persistent index; the scan is linear in the number of prompts.

use crate::lookup::PromptLookup;
use crate::resolver::{expand, ResolutionContext, ResolverOptions};
use crate::types::Prompt;
use stitch_core::{AppError, AppResult};

/// Every prompt other than `target_id` whose expansion depends on it.
///
/// Each candidate is expanded in its own context: scoped to its directory,
/// with its own ID at the root of the ancestor chain. Results are in ID order.
///
/// Returns [`AppError::NotFound`] when `target_id` is unknown, so callers can
/// tell "nothing references it" apart from "it does not exist".
pub fn find_references<L: PromptLookup + ?Sized>(
    lookup: &L,
    target_id: &str,
    options: &ResolverOptions,
) -> AppResult<Vec<Prompt>> {
    if lookup.get_by_id(target_id)?.is_none() {
        return Err(AppError::NotFound(target_id.to_string()));
    }

    let mut references = Vec::new();

    for prompt in lookup.list_all()? {
        if prompt.id == target_id {
            continue;
        }

        let context = ResolutionContext::for_prompt(&prompt);
        let result = expand(lookup, &prompt.content, &context, options)?;
        if result.dependencies.contains(target_id) {
            references.push(prompt);
        }
    }

    references.sort_by(|a, b| a.id.cmp(&b.id));

    tracing::debug!(target_id, count = references.len(), "Collected references");

    Ok(references)
}
