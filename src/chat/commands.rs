//! Command parsing for the chat application.
//!
//! The exit directive `exit()` ends the session.  A handful of slash words
//! (`/help`, `/stats`, ...) control the session locally; everything else,
//! including other input that happens to start with `/`, is a prompt for the
//! model.

/// The literal that ends a session, compared case-insensitively.
pub const EXIT_DIRECTIVE: &str = "exit()";

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Exit the chat application.
    Exit,

    /// Display help information.
    Help,

    /// Display session statistics (message count, token usage).
    Stats,

    /// Show the model and sampling configuration.
    ShowConfig,

    /// Print the conversation so far.
    History,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Returns true if `input` is the exit directive, in any letter case.
///
/// Surrounding whitespace is ignored.
///
/// # Examples
///
/// ```
/// # use gptchat::chat::is_exit_directive;
/// assert!(is_exit_directive("exit()"));
/// assert!(is_exit_directive("EXIT()"));
/// assert!(!is_exit_directive("exit"));
/// ```
pub fn is_exit_directive(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(EXIT_DIRECTIVE)
}

/// Parses user input for the exit directive and slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be sent to the model.
///
/// # Examples
///
/// ```
/// # use gptchat::chat::{parse_command, ChatCommand};
/// assert_eq!(parse_command("Exit()"), Some(ChatCommand::Exit));
/// assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
/// assert!(parse_command("Hello, world!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    if is_exit_directive(input) {
        return Some(ChatCommand::Exit);
    }

    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "help" | "?" => no_argument(ChatCommand::Help, "/help", argument),
        "quit" | "exit" | "q" => no_argument(ChatCommand::Exit, "/quit", argument),
        "stats" | "status" => no_argument(ChatCommand::Stats, "/stats", argument),
        "config" => no_argument(ChatCommand::ShowConfig, "/config", argument),
        "history" => no_argument(ChatCommand::History, "/history", argument),
        // Paths, shebangs and the like are prompts.
        _ => return None,
    };

    Some(result)
}

fn no_argument(command: ChatCommand, name: &str, argument: Option<&str>) -> ChatCommand {
    match argument {
        Some(_) => ChatCommand::Invalid(format!("{name} takes no arguments")),
        None => command,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  exit()                 Exit the chat (any letter case)
  /stats                 Show session statistics
  /config                Show the model and sampling parameters
  /history               Print the conversation so far
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_directive_any_case() {
        for input in ["exit()", "EXIT()", "Exit()", "eXiT()", "  exit()  "] {
            assert!(is_exit_directive(input), "{input:?}");
            assert_eq!(parse_command(input), Some(ChatCommand::Exit));
        }
    }

    #[test]
    fn near_misses_are_not_exit() {
        for input in ["exit", "exit( )", "exit();", "please exit()", "quit()"] {
            assert!(!is_exit_directive(input), "{input:?}");
            assert_eq!(parse_command(input), None);
        }
    }

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Exit));
        assert_eq!(parse_command("  /QUIT  "), Some(ChatCommand::Exit));
    }

    #[test]
    fn parse_session_commands() {
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/status"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/config"), Some(ChatCommand::ShowConfig));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
    }

    #[test]
    fn arguments_are_rejected() {
        assert_eq!(
            parse_command("/stats now"),
            Some(ChatCommand::Invalid("/stats takes no arguments".to_string()))
        );
    }

    #[test]
    fn unknown_slash_words_are_prompts() {
        assert_eq!(parse_command("/model gpt-4"), None);
        assert_eq!(
            parse_command("/usr/bin/env python: what does this shebang do?"),
            None
        );
        assert_eq!(parse_command("/"), None);
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello, world!"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("what does exit() do?"), None);
    }

    #[test]
    fn help_text_lists_commands() {
        let help = help_text();
        assert!(help.contains("exit()"));
        assert!(help.contains("/stats"));
        assert!(help.contains("/history"));
        assert!(help.contains("/quit"));
    }
}
