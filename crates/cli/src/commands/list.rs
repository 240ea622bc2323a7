//! List command handler.
//!
//! Prints every prompt with its display name.

use clap::Args;
use stitch_core::{config::AppConfig, AppResult};
use stitch_prompt::{calculate_display_names, NameEntry};

/// List prompts with their display names
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Only show prompts carrying this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing list command");
        tracing::debug!("List options: {:?}", self);

        let store = super::load_prompts(config)?;

        // Labels are computed over the whole set so filtering never changes them
        let table = calculate_display_names(store.iter().map(NameEntry::from));
        for warning in &table.warnings {
            eprintln!("warning: {}", warning);
        }

        let prompts: Vec<_> = store
            .iter()
            .filter(|p| self.tag.as_ref().map_or(true, |tag| p.tags.contains(tag)))
            .collect();

        if self.json {
            let output: Vec<_> = prompts
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "id": p.id,
                        "name": p.name,
                        "directory": p.directory,
                        "displayName": table.get(&p.id),
                        "tags": p.tags,
                        "description": p.description,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if prompts.is_empty() {
            println!("No prompts found");
        } else {
            let width = prompts
                .iter()
                .filter_map(|p| table.get(&p.id))
                .map(str::len)
                .max()
                .unwrap_or(0);

            for prompt in prompts {
                let label = table.get(&prompt.id).unwrap_or(&prompt.name);
                println!("{:<width$}  {}", label, prompt.id, width = width);
            }
        }

        Ok(())
    }
}
