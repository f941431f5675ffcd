//! Model listing functionality

use std::error::Error;

use crate::cli::render::format_model_list;
use crate::cli::{Args, Bootstrap};

pub async fn list_models(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut boot = Bootstrap::from_args(args)?;
    boot.resume().await?;

    let models = boot.controller.models();
    println!("🤖 Available models on {}", boot.settings.base_url);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    if let Some(default_model) = boot.settings.default_model.as_deref() {
        println!("🎯 Default model: {default_model} (from config or environment)");
        println!();
    }
    println!("Found {} models:", models.len());
    print!(
        "{}",
        format_model_list(models, boot.controller.active_model())
    );
    Ok(())
}
