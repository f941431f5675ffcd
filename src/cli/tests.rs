use super::*;
use crate::api::Model;
use crate::cli::render::{format_message, format_model_list, format_notice};
use crate::core::message::{Message, Notice, Role};

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }
}

use test_helpers::parse_args;

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["owchat"]);
    assert_eq!(args.command, None);
    assert!(!args.no_keyring);
}

#[test]
fn global_flags_work_after_the_subcommand() {
    let argv = [
        "owchat",
        "models",
        "--base-url",
        "https://chat.example.com",
        "-m",
        "llama3",
        "--no-keyring",
    ];
    let args = parse_args(&argv);
    assert_eq!(args.command, Some(Commands::Models));
    assert_eq!(args.base_url.as_deref(), Some("https://chat.example.com"));
    assert_eq!(args.model.as_deref(), Some("llama3"));
    assert!(args.no_keyring);
}

#[test]
fn say_collects_the_whole_prompt() {
    let args = parse_args(&["owchat", "say", "what", "is", "-1", "squared"]);
    assert_eq!(
        args.command,
        Some(Commands::Say {
            prompt: vec![
                "what".to_string(),
                "is".to_string(),
                "-1".to_string(),
                "squared".to_string()
            ]
        })
    );
}

#[test]
fn say_requires_a_prompt() {
    assert!(Args::try_parse_from(["owchat", "say"]).is_err());
}

#[test]
fn deauth_purge_flag() {
    assert_eq!(
        parse_args(&["owchat", "deauth"]).command,
        Some(Commands::Deauth { purge: false })
    );
    assert_eq!(
        parse_args(&["owchat", "deauth", "--purge"]).command,
        Some(Commands::Deauth { purge: true })
    );
}

#[test]
fn set_joins_multi_word_values() {
    let args = parse_args(&["owchat", "set", "default-model", "my", "model"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: Some("default-model".to_string()),
            value: vec!["my".to_string(), "model".to_string()],
        })
    );
    assert_eq!(
        parse_args(&["owchat", "set"]).command,
        Some(Commands::Set {
            key: None,
            value: Vec::new()
        })
    );
}

#[test]
fn unknown_config_keys_are_rejected_with_a_hint() {
    let err = check_key("colour").unwrap_err();
    assert!(err.contains("colour"));
    assert!(err.contains("base-url"));
    assert!(check_key("max-tokens").is_ok());
}

#[test]
fn version_carries_build_metadata() {
    assert!(VERSION.starts_with(env!("CARGO_PKG_VERSION")));
    assert!(VERSION.contains("rustc"));
}

#[test]
fn messages_are_labelled_by_role() {
    let message = Message {
        content: "hi".to_string(),
        role: Role::Assistant,
        timestamp: 0,
    };
    let line = format_message(&message);
    assert!(line.ends_with("assistant: hi"), "{line}");

    let line = format_message(&Message::user("hello"));
    assert!(line.ends_with("you: hello"), "{line}");
}

#[test]
fn notices_carry_their_severity() {
    assert!(format_notice(&Notice::error("boom")).starts_with("❌"));
    assert!(format_notice(&Notice::info("Chat has been reset")).ends_with("Chat has been reset"));
}

#[test]
fn model_list_marks_the_active_model() {
    let models = vec![
        Model::new("m1"),
        Model {
            id: "m2".to_string(),
            name: Some("Model Two".to_string()),
        },
    ];
    assert_eq!(
        format_model_list(&models, Some("m2")),
        "  m1\n* m2  (Model Two)\n"
    );
}
