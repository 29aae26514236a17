#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Help,
    Save,
    View,
    Search,
    Delete,
    Clear,
    Export,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::Start,
        Command::Help,
        Command::Save,
        Command::View,
        Command::Search,
        Command::Delete,
        Command::Clear,
        Command::Export,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Save => "save",
            Command::View => "view",
            Command::Search => "search",
            Command::Delete => "delete",
            Command::Clear => "clear",
            Command::Export => "export",
        }
    }

    pub fn usage(self) -> &'static str {
        match self {
            Command::Start => "/start",
            Command::Help => "/help",
            Command::Save => "/save <tag> <note>",
            Command::View => "/view [tag]",
            Command::Search => "/search <keyword>",
            Command::Delete => "/delete <tag>",
            Command::Clear => "/clear",
            Command::Export => "/export",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Start => "Show this message",
            Command::Help => "Show this message",
            Command::Save => "Save a note under a tag",
            Command::View => "View all notes, or one tag",
            Command::Search => "Find notes containing a keyword",
            Command::Delete => "Delete all notes under a tag",
            Command::Clear => "Delete all your notes",
            Command::Export => "Export all notes as a file",
        }
    }
}

/// Whitespace-token argument accessors. Tokens never contain whitespace.
pub mod args {
    /// First token as tag, the rest rejoined as text. Needs at least one word of text.
    pub fn tag_and_text(args: &[String]) -> Option<(&str, String)> {
        match args {
            [tag, text @ ..] if !text.is_empty() => Some((tag.as_str(), text.join(" "))),
            _ => None,
        }
    }

    pub fn text(args: &[String]) -> Option<String> {
        (!args.is_empty()).then(|| args.join(" "))
    }

    pub fn first(args: &[String]) -> Option<&str> {
        args.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn names_are_unique() {
        let mut names = Command::ALL.map(Command::name).to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Command::ALL.len());
    }

    #[test]
    fn tag_and_text_needs_two_tokens() {
        assert_eq!(
            args::tag_and_text(&strings(&["work", "finish", "report"])),
            Some(("work", "finish report".to_string()))
        );
        assert_eq!(args::tag_and_text(&strings(&["work"])), None);
        assert_eq!(args::tag_and_text(&[]), None);
    }

    #[test]
    fn text_rejoins_with_single_spaces() {
        assert_eq!(args::text(&strings(&["call", "client"])), Some("call client".to_string()));
        assert_eq!(args::text(&[]), None);
    }
}
