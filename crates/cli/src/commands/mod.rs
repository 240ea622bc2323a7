//! Command handlers for the Stitch CLI.
//!
//! Each command loads the prompt snapshot from the configured directories and
//! runs one engine operation against it.

pub mod expand;
pub mod list;
pub mod refs;

pub use expand::ExpandCommand;
pub use list::ListCommand;
pub use refs::RefsCommand;

use stitch_core::{config::AppConfig, AppResult};
use stitch_prompt::{load_store, MemoryStore};

/// Load every configured prompt directory into one snapshot.
fn load_prompts(config: &AppConfig) -> AppResult<MemoryStore> {
    let store = load_store(&config.prompt_directories())?;
    tracing::info!("Loaded {} prompts", store.len());
    Ok(store)
}
