//! Interactive line-based chat loop.

use std::error::Error;
use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::auth::ui::{api_key_prompt, sign_in_banner};
use crate::cli::render::{format_model_list, TerminalRenderer};
use crate::cli::{Args, Bootstrap};
use crate::commands::{help_text, process_input, CommandResult};
use crate::core::constants::MAX_INPUT_CHARS;
use crate::core::session::{SessionController, SessionState};

type InputLines = Lines<BufReader<Stdin>>;

enum LoopControl {
    Continue,
    SignIn,
    Quit,
}

pub async fn run_chat(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut boot = Bootstrap::from_args(args)?;
    boot.controller.subscribe(Box::new(TerminalRenderer));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if boot.controller.start().await.is_ok() && boot.controller.state() == SessionState::Ready {
        boot.apply_default_model();
    }

    loop {
        if boot.controller.state() != SessionState::Ready && !sign_in(&mut boot, &mut lines).await? {
            return Ok(());
        }

        println!("Type a message, or /help for commands.");
        match converse(&mut boot, &mut lines).await? {
            LoopControl::SignIn => continue,
            LoopControl::Quit | LoopControl::Continue => return Ok(()),
        }
    }
}

/// Prompt until a key is accepted. Returns `false` when input ends.
async fn sign_in(boot: &mut Bootstrap, lines: &mut InputLines) -> Result<bool, Box<dyn Error>> {
    println!("{}", sign_in_banner(&boot.settings.base_url));
    loop {
        prompt(api_key_prompt());
        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        // Failures were already reported through the renderer.
        if boot.controller.submit_key(&line).await.is_ok() {
            boot.apply_default_model();
            return Ok(true);
        }
    }
}

async fn converse(
    boot: &mut Bootstrap,
    lines: &mut InputLines,
) -> Result<LoopControl, Box<dyn Error>> {
    loop {
        prompt("> ");
        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(LoopControl::Quit);
        };

        if line.chars().count() > MAX_INPUT_CHARS {
            eprintln!("⚠️  Message is too long (limit {MAX_INPUT_CHARS} characters)");
            continue;
        }

        match handle_line(&mut boot.controller, &line).await {
            LoopControl::Continue => {}
            other => return Ok(other),
        }
    }
}

async fn handle_line(controller: &mut SessionController, line: &str) -> LoopControl {
    match process_input(line) {
        CommandResult::ProcessAsMessage(text) => {
            // Errors surface as notices; the loop keeps going.
            if let Err(err) = controller.send(&text).await {
                debug!(error = %err, "send did not complete");
            }
        }
        CommandResult::ShowHelp => println!("{}", help_text()),
        CommandResult::ShowModel => match controller.active_model() {
            Some(model) => println!("Active model: {model}"),
            None => println!("No model selected"),
        },
        CommandResult::ChangeModel(id) => {
            if !controller.change_model(&id) {
                eprintln!("⚠️  Unknown model: {id} (try /models)");
            }
        }
        CommandResult::ListModels => print!(
            "{}",
            format_model_list(controller.models(), controller.active_model())
        ),
        CommandResult::Reset => {
            if let Err(err) = controller.reset() {
                debug!(error = %err, "reset did not complete");
            }
        }
        CommandResult::Logout => {
            if let Err(err) = controller.logout() {
                debug!(error = %err, "logout did not complete");
            }
            return LoopControl::SignIn;
        }
        CommandResult::Quit => return LoopControl::Quit,
        CommandResult::Usage(usage) => eprintln!("Usage: {usage}"),
    }
    LoopControl::Continue
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}
