//! Sign-in, sign-out and history reset outside the chat loop.

use std::error::Error;

use crate::auth::ui::{prompt_api_key, prompt_confirmation, ConfirmationChoice};
use crate::cli::{Args, Bootstrap};

pub async fn run_auth(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut boot = Bootstrap::from_args(args)?;
    let key = prompt_api_key(&boot.settings.base_url)?;

    if let Err(err) = boot.controller.submit_key(&key).await {
        return Err(format!("❌ Authentication failed: {err}").into());
    }
    boot.apply_default_model();

    println!(
        "✅ Signed in to {} ({} models, using {})",
        boot.settings.base_url,
        boot.controller.models().len(),
        boot.controller.active_model().unwrap_or("none")
    );
    Ok(())
}

pub async fn run_deauth(args: &Args, purge: bool) -> Result<(), Box<dyn Error>> {
    let mut boot = Bootstrap::from_args(args)?;

    let purge = purge
        && match prompt_confirmation("Delete the saved conversation for this key too?")? {
            ConfirmationChoice::Yes => true,
            ConfirmationChoice::No => false,
            ConfirmationChoice::Cancel => {
                println!("Cancelled");
                return Ok(());
            }
        };

    let purged = boot.controller.forget(purge)?;
    if purged.is_durable() {
        println!("✅ Saved conversation deleted");
    }
    println!("✅ API key removed");
    Ok(())
}

pub async fn run_reset(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut boot = Bootstrap::from_args(args)?;
    boot.resume().await?;
    boot.controller.reset()?;
    println!("✅ Conversation cleared");
    Ok(())
}
