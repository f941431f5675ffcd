use std::io::{self, Write};

use chrono::{Local, TimeZone};

use crate::api::Model;
use crate::core::message::{Message, Notice, NoticeKind};
use crate::core::session::{SessionEvent, SessionObserver};

/// Prints session events to the terminal for the interactive chat.
///
/// Conversation lines go to stdout and notices to stderr. User messages are
/// only printed when history is replayed, since the user just typed them.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl SessionObserver for TerminalRenderer {
    fn on_event(&mut self, event: SessionEvent<'_>) {
        match event {
            SessionEvent::StateChanged(_) => {}
            SessionEvent::ModelsLoaded {
                active: Some(active),
                ..
            } => println!("🤖 Using model {active}"),
            SessionEvent::ModelsLoaded { active: None, .. } => {}
            SessionEvent::HistoryReplaced(messages) => {
                if !messages.is_empty() {
                    println!("── {} earlier messages ──", messages.len());
                    for message in messages {
                        println!("{}", format_message(message));
                    }
                    println!("────────────────────────");
                }
            }
            SessionEvent::MessageAppended(message) => {
                if message.is_assistant() {
                    println!("{}", format_message(message));
                }
            }
            SessionEvent::Notice(notice) => eprintln!("{}", format_notice(notice)),
        }
        let _ = io::stdout().flush();
    }
}

pub fn format_message(message: &Message) -> String {
    let label = if message.is_user() { "you" } else { "assistant" };
    match format_time(message.timestamp) {
        Some(time) => format!("[{time}] {label}: {}", message.content),
        None => format!("{label}: {}", message.content),
    }
}

fn format_time(timestamp_millis: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(timestamp_millis)
        .single()
        .map(|time| time.format("%H:%M").to_string())
}

pub fn format_notice(notice: &Notice) -> String {
    let icon = match notice.kind {
        NoticeKind::Info => "ℹ️ ",
        NoticeKind::Warning => "⚠️ ",
        NoticeKind::Error => "❌",
    };
    format!("{icon} {}", notice.text)
}

/// One line per model, with the active one marked.
pub fn format_model_list(models: &[Model], active: Option<&str>) -> String {
    let mut out = String::new();
    for model in models {
        let marker = if Some(model.id.as_str()) == active {
            "*"
        } else {
            " "
        };
        out.push_str(&format!("{marker} {}", model.id));
        if model.label() != model.id {
            out.push_str(&format!("  ({})", model.label()));
        }
        out.push('\n');
    }
    out
}
