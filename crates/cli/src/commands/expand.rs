//! Expand command handler.
//!
//! Resolves a prompt and prints it with every inclusion substituted.

use clap::Args;
use stitch_core::{config::AppConfig, AppResult};
use stitch_prompt::{compose_prompt, ResolverOptions};

/// Expand a prompt's inclusions and print the result
#[derive(Args, Debug)]
pub struct ExpandCommand {
    /// Prompt id or name
    pub prompt: String,

    /// Directory to search first when PROMPT is a simple name
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Print only the dependency ids
    #[arg(long)]
    pub deps: bool,

    /// Exit with an error if expansion produced warnings
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ExpandCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing expand command for '{}'", self.prompt);
        tracing::debug!("Expand options: {:?}", self);

        let store = super::load_prompts(config)?;
        let options = ResolverOptions::from(&config.resolver);

        let composed = compose_prompt(&store, &self.prompt, self.scope.as_deref(), &options)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&composed)?);
        } else {
            for warning in &composed.metadata.warnings {
                eprintln!("warning: {}", warning);
            }

            if self.deps {
                for id in &composed.metadata.dependencies {
                    println!("{}", id);
                }
            } else {
                print!("{}", composed.text);
                if !composed.text.ends_with('\n') {
                    println!();
                }
            }
        }

        if self.strict && !composed.metadata.warnings.is_empty() {
            return Err(stitch_core::AppError::Prompt(format!(
                "{} expanded with {} warnings",
                composed.metadata.source_prompt_id,
                composed.metadata.warnings.len()
            )));
        }

        Ok(())
    }
}
