use std::fmt;
use std::io::{self, Write};

const API_KEY_PROMPT: &str = "Enter your API key: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationChoice {
    Yes,
    No,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UiError {}

fn read_line(prompt: &str) -> Result<String, UiError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|err| UiError::new(err.to_string()))?;

    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .map_err(|err| UiError::new(err.to_string()))?;
    if read == 0 {
        return Err(UiError::new("Input closed"));
    }
    Ok(input)
}

/// Shown before every key prompt, synchronous or not.
pub fn sign_in_banner(base_url: &str) -> String {
    format!("🔐 Sign in to {base_url}\nCreate a key under Settings → Account → API Keys.\n")
}

pub fn api_key_prompt() -> &'static str {
    API_KEY_PROMPT
}

pub fn prompt_api_key(base_url: &str) -> Result<String, UiError> {
    println!("{}", sign_in_banner(base_url));
    let key = read_line(API_KEY_PROMPT)?.trim().to_string();
    if key.is_empty() {
        return Err(UiError::new("Please enter API key"));
    }
    Ok(key)
}

pub fn prompt_confirmation(question: &str) -> Result<ConfirmationChoice, UiError> {
    let answer = read_line(&format!("{question} (y/N): "))?;
    parse_confirmation(&answer)
}

pub fn parse_confirmation(input: &str) -> Result<ConfirmationChoice, UiError> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return Ok(ConfirmationChoice::No);
    }
    match trimmed.as_str() {
        "y" | "yes" => Ok(ConfirmationChoice::Yes),
        "n" | "no" => Ok(ConfirmationChoice::No),
        "c" | "cancel" => Ok(ConfirmationChoice::Cancel),
        _ => Err(UiError::new("Invalid confirmation response")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_parsing_handles_empty_and_cancel() {
        assert_eq!(parse_confirmation("").unwrap(), ConfirmationChoice::No);
        assert_eq!(parse_confirmation(" YES \n").unwrap(), ConfirmationChoice::Yes);
        assert_eq!(parse_confirmation("c").unwrap(), ConfirmationChoice::Cancel);
        assert!(parse_confirmation("maybe").is_err());
    }

    #[test]
    fn banner_names_the_server() {
        let banner = sign_in_banner("http://localhost:3000");
        assert!(banner.contains("http://localhost:3000"));
        assert!(banner.ends_with('\n'));
    }
}
