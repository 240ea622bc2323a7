//! Refs command handler.
//!
//! Lists the prompts that include a given prompt, directly or transitively.

use clap::Args;
use stitch_core::{config::AppConfig, AppResult};
use stitch_prompt::{calculate_display_names, find_references, NameEntry, ResolverOptions};

/// Show which prompts include a given prompt
#[derive(Args, Debug)]
pub struct RefsCommand {
    /// Full id of the referenced prompt
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RefsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing refs command for '{}'", self.id);

        let store = super::load_prompts(config)?;
        let options = ResolverOptions::from(&config.resolver);

        let target = stitch_prompt::id::strip_md_suffix(self.id.trim());
        let references = find_references(&store, target, &options)?;

        if self.json {
            let ids: Vec<&str> = references.iter().map(|p| p.id.as_str()).collect();
            let output = serde_json::json!({
                "target": target,
                "references": ids,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if references.is_empty() {
            println!("No prompts include {}", target);
        } else {
            let table = calculate_display_names(store.iter().map(NameEntry::from));
            for prompt in &references {
                let label = table.get(&prompt.id).unwrap_or(&prompt.name);
                println!("{}  {}", label, prompt.id);
            }
        }

        Ok(())
    }
}
