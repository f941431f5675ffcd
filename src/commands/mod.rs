//! Slash-command parsing for the chat loop.
//!
//! Handlers only interpret the input line; the loop performs the resulting
//! action against the session controller.

mod registry;

#[cfg(test)]
mod tests;

pub use registry::{all_commands, find_command, matching_commands, CommandInvocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    ProcessAsMessage(String),
    ShowHelp,
    ShowModel,
    ChangeModel(String),
    ListModels,
    Reset,
    Logout,
    Quit,
    /// The command was recognized but its arguments were not.
    Usage(&'static str),
}

pub fn process_input(input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => (command.handler)(CommandInvocation {
            input: trimmed,
            args,
        }),
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

/// Plain-text command list for `/help`.
pub fn help_text() -> String {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    let mut text = String::from("Commands:\n");
    for command in all_commands() {
        text.push_str(&format!(
            "  {:<width$}  {}\n",
            command.usage,
            command.help,
            width = width
        ));
    }
    text.push_str("Anything else is sent to the model.");
    text
}

fn expect_no_args(
    invocation: CommandInvocation<'_>,
    usage: &'static str,
    result: CommandResult,
) -> CommandResult {
    if invocation.args.is_empty() {
        result
    } else {
        CommandResult::Usage(usage)
    }
}

pub(super) fn handle_help(invocation: CommandInvocation<'_>) -> CommandResult {
    expect_no_args(invocation, "/help", CommandResult::ShowHelp)
}

pub(super) fn handle_model(invocation: CommandInvocation<'_>) -> CommandResult {
    let mut ids = invocation.args.split_whitespace();
    match (ids.next(), ids.next()) {
        (None, _) => CommandResult::ShowModel,
        (Some(id), None) => CommandResult::ChangeModel(id.to_string()),
        (Some(_), Some(_)) => CommandResult::Usage("/model [id]"),
    }
}

pub(super) fn handle_models(invocation: CommandInvocation<'_>) -> CommandResult {
    expect_no_args(invocation, "/models", CommandResult::ListModels)
}

pub(super) fn handle_reset(invocation: CommandInvocation<'_>) -> CommandResult {
    expect_no_args(invocation, "/reset", CommandResult::Reset)
}

pub(super) fn handle_logout(invocation: CommandInvocation<'_>) -> CommandResult {
    expect_no_args(invocation, "/logout", CommandResult::Logout)
}

pub(super) fn handle_quit(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}
