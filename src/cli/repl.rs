//! Line handling for the interactive `chat` command.

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Quit,
    History,
    Samples,
    /// Blank line, re-prompt.
    Skip,
    Query(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Skip,
            ":quit" | ":q" | ":exit" => Self::Quit,
            ":history" => Self::History,
            ":samples" => Self::Samples,
            query => Self::Query(query.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_meta_commands() {
        assert_eq!(ReplCommand::parse(" :quit "), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse(":history"), ReplCommand::History);
        assert_eq!(ReplCommand::parse(":samples"), ReplCommand::Samples);
        assert_eq!(ReplCommand::parse("   "), ReplCommand::Skip);
    }

    #[test]
    fn anything_else_is_a_query() {
        assert_eq!(
            ReplCommand::parse("items in hallway"),
            ReplCommand::Query("items in hallway".into())
        );
    }
}
