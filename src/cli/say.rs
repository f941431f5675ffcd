//! One-shot "say" command

use std::error::Error;

use crate::cli::{Args, Bootstrap};

pub async fn run_say(args: &Args, prompt: Vec<String>) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err("Usage: owchat say <prompt>".into());
    }

    let mut boot = Bootstrap::from_args(args)?;
    boot.resume().await?;

    if let Some(outcome) = boot.controller.send(&prompt).await? {
        println!("{}", outcome.reply.content);
        if !(outcome.user_durable && outcome.reply_durable) {
            eprintln!("⚠️  This exchange was not saved to history");
        }
    }
    Ok(())
}
