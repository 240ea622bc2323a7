//! Prompt composition engine for Stitch.
//!
//! This crate provides:
//! - Prompt identifiers derived from directory and name
//! - Collision-free display names
//! - `[[token]]` inclusion expansion with cycle detection
//! - Reverse dependency queries
//! - A read-only loader for markdown prompt directories
//!
//! Storage is abstracted behind [`PromptLookup`]; the engine itself holds no
//! state between calls.

pub mod compose;
pub mod display;
pub mod id;
pub mod loader;
pub mod lookup;
pub mod references;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export main types
pub use compose::compose_prompt;
pub use display::{calculate_display_names, DisplayNameTable, NameEntry};
pub use id::{generate_id, parse_id};
pub use loader::{load_directory, load_store};
pub use lookup::{MemoryStore, PromptLookup};
pub use references::find_references;
pub use resolver::{expand, tokenize, MarkerSpan, ResolutionContext, ResolverOptions};
pub use types::{ComposedPrompt, ComposedPromptMetadata, ExpansionResult, Prompt};
