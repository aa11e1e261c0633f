//! Special commands parser for interactive chat mode
//!
//! Special commands change the session instead of being sent to the tutor:
//! - Switch the active model
//! - Start a new chat (clear the transcript)
//! - Show the transcript, the model list, or the course examples
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive. Plain `exit` and
//! `quit` are accepted as well.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Switch to another model (label, identifier, or list number)
    SwitchModel(String),

    /// List the selectable models
    ListModels,

    /// Clear the transcript and start over with the same model
    NewChat,

    /// Print the transcript so far
    ShowHistory,

    /// Print the course example prompts
    ShowExamples,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input to the tutor
    None,
}

/// Parse a line of user input
///
/// # Errors
///
/// Returns `CommandError` for unknown `/` commands or missing arguments.
///
/// # Examples
///
/// ```
/// use tutorchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/clear").unwrap(), SpecialCommand::NewChat);
/// assert_eq!(
///     parse_special_command("/model 2").unwrap(),
///     SpecialCommand::SwitchModel("2".to_string())
/// );
/// assert_eq!(parse_special_command("Hola").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((c, a)) => (c.to_lowercase(), a.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/model" => {
            if arg.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/model".to_string(),
                    usage: "/model <number|label|id>".to_string(),
                })
            } else {
                Ok(SpecialCommand::SwitchModel(arg.to_string()))
            }
        }
        "/models" => Ok(SpecialCommand::ListModels),
        "/clear" | "/new" => Ok(SpecialCommand::NewChat),
        "/history" => Ok(SpecialCommand::ShowHistory),
        "/examples" | "/ejemplos" => Ok(SpecialCommand::ShowExamples),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(command)),
    }
}

/// Print the list of special commands
pub fn print_help() {
    println!("\nSpecial commands:");
    println!("  /model <n|label|id>  Switch the active model (history is kept)");
    println!("  /models              List available models");
    println!("  /clear, /new         Start a new chat (model is kept)");
    println!("  /history             Show the conversation so far");
    println!("  /examples            Show example prompts from the course");
    println!("  /help                Show this help");
    println!("  /exit, exit          Leave the chat\n");
}
