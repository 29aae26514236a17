use crate::{notes::NoteEntry, telegram::ParseMode};

use super::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text {
        text: String,
        parse_mode: Option<ParseMode>,
    },
    /// Sent as a file attachment rather than inline text.
    Document { filename: String, content: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            parse_mode: None,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            parse_mode: Some(ParseMode::Markdown),
        }
    }

    pub fn document(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Document {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// `before` followed by the tag as an inline code span. A tag containing a
/// backtick cannot be quoted in Markdown, so the reply falls back to plain text.
fn naming_tag(before: &str, tag: &str) -> Reply {
    if tag.contains('`') {
        Reply::text(format!("{before}{tag}"))
    } else {
        Reply::markdown(format!("{before}`{tag}`"))
    }
}

pub fn welcome() -> Reply {
    let mut text = String::from("👋 Welcome to MemoBot!\n\nUse the following commands:\n");
    for command in Command::ALL {
        if command == Command::Start {
            continue;
        }
        text.push_str(&format!("{} - {}\n", command.usage(), command.description()));
    }
    Reply::text(text.trim_end())
}

pub fn usage(command: Command) -> Reply {
    Reply::text(format!("❗Usage: {}", command.usage()))
}

pub fn unrecognized() -> Reply {
    Reply::text("🤔 Unrecognized command. Send /help to see what I can do.")
}

pub fn failure() -> Reply {
    Reply::text("⚠️ Something went wrong while accessing your notes. Please try again later.")
}

pub fn saved(tag: &str) -> Reply {
    naming_tag("✅ Saved under ", tag)
}

pub fn notes(notes: &[NoteEntry]) -> Reply {
    if notes.is_empty() {
        return Reply::text("📭 No saved notes.");
    }
    Reply::text(lines("📌", notes))
}

pub fn tag_notes(tag: &str, contents: &[String]) -> Reply {
    if contents.is_empty() {
        return Reply::text(format!("📭 No notes under {tag}."));
    }
    let text = contents
        .iter()
        .map(|content| format!("📌 {tag}: {content}"))
        .collect::<Vec<_>>()
        .join("\n");
    Reply::text(text)
}

pub fn search_results(matches: &[NoteEntry]) -> Reply {
    if matches.is_empty() {
        return Reply::text("🔍 No matching notes found.");
    }
    Reply::text(lines("🔍", matches))
}

pub fn deleted(tag: &str, count: usize) -> Reply {
    if count == 0 {
        return Reply::text("⚠️ No notes found for that tag.");
    }
    naming_tag(&format!("🗑️ Deleted {count} note(s) under "), tag)
}

pub fn cleared(count: usize) -> Reply {
    if count == 0 {
        return Reply::text("📭 No saved notes.");
    }
    Reply::text(format!("🧹 Deleted all {count} note(s)."))
}

pub fn nothing_to_export() -> Reply {
    Reply::text("📭 No notes to export.")
}

fn lines(marker: &str, notes: &[NoteEntry]) -> String {
    notes
        .iter()
        .map(|note| format!("{marker} {}: {}", note.tag, note.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_lists_every_command_usage() {
        let Reply::Text { text, .. } = welcome() else {
            panic!("welcome is a text reply");
        };
        for command in Command::ALL.into_iter().filter(|c| *c != Command::Start) {
            assert!(text.contains(command.usage()), "missing {}", command.usage());
        }
    }

    #[test]
    fn saved_quotes_tag_as_code() {
        assert_eq!(saved("work"), Reply::markdown("✅ Saved under `work`"));
        assert_eq!(saved("a`b"), Reply::text("✅ Saved under a`b"));
    }

    #[test]
    fn notes_render_one_line_each() {
        let reply = notes(&[NoteEntry::new("work", "finish report"), NoteEntry::new("home", "buy milk")]);
        assert_eq!(reply, Reply::text("📌 work: finish report\n📌 home: buy milk"));
    }

    #[test]
    fn deleted_reports_count_or_nothing() {
        assert_eq!(deleted("work", 2), Reply::markdown("🗑️ Deleted 2 note(s) under `work`"));
        assert_eq!(deleted("work", 0), Reply::text("⚠️ No notes found for that tag."));
    }
}
