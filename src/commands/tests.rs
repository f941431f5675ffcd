use super::*;

#[test]
fn plain_text_is_sent_as_a_message() {
    assert_eq!(
        process_input("hello there"),
        CommandResult::ProcessAsMessage("hello there".to_string())
    );
}

#[test]
fn unknown_commands_fall_through_to_the_model() {
    assert_eq!(
        process_input("/shrug ok"),
        CommandResult::ProcessAsMessage("/shrug ok".to_string())
    );
    assert_eq!(
        process_input("/"),
        CommandResult::ProcessAsMessage("/".to_string())
    );
}

#[test]
fn commands_are_case_insensitive_and_trimmed() {
    assert_eq!(process_input("  /RESET  "), CommandResult::Reset);
    assert_eq!(process_input("/Quit"), CommandResult::Quit);
    assert_eq!(process_input("/logout"), CommandResult::Logout);
}

#[test]
fn model_command_shows_or_switches() {
    assert_eq!(process_input("/model"), CommandResult::ShowModel);
    assert_eq!(
        process_input("/model  llama3:8b "),
        CommandResult::ChangeModel("llama3:8b".to_string())
    );
    assert_eq!(process_input("/model a b"), CommandResult::Usage("/model [id]"));
    assert_eq!(process_input("/models"), CommandResult::ListModels);
}

#[test]
fn stray_arguments_produce_usage() {
    assert_eq!(process_input("/reset now"), CommandResult::Usage("/reset"));
    assert_eq!(process_input("/help me"), CommandResult::Usage("/help"));
}

#[test]
fn help_lists_every_command() {
    let help = help_text();
    for command in all_commands() {
        assert!(help.contains(command.usage), "missing {}", command.name);
    }
}

#[test]
fn prefix_matching_finds_commands() {
    let names: Vec<_> = matching_commands("mo").iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["model", "models"]);
    assert!(find_command("LOGOUT").is_some());
}
