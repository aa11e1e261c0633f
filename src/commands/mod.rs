/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`: Interactive terminal chat
- `ask`: One question, streamed reply
- `auth`: Store the API key in the OS keyring
- `serve`: HTTP server
- `models`: Model listing

Every handler drives the same turn logic: append the user message, stream the
reply while rendering it, then append the full reply.
*/

use crate::config::Config;
use crate::error::Result;
use crate::providers::create_provider;
use crate::registry::ModelRegistry;
use crate::relay::{is_error_fragment, CompletionRelay};
use crate::session::{Message, SessionStore};
use futures::StreamExt;
use std::io::Write;

// Special commands parser for the terminal chat
pub mod special_commands;

// Model listing
pub mod models;

/// Run one exchange: append `input`, stream the reply into `out`, store it
///
/// Fragments are written and flushed as they arrive. The concatenated reply,
/// or the error fragment if the relay failed, is appended to the session as
/// the assistant's message and returned.
///
/// # Errors
///
/// Returns error if `input` is blank or writing to `out` fails. The reply is
/// stored even when writing fails, so the session is ready for the next turn.
pub async fn handle_turn<W: Write>(
    relay: &CompletionRelay,
    session: &mut SessionStore,
    input: &str,
    out: &mut W,
) -> Result<String> {
    let turn = session.start_turn(Message::user(input))?;

    let mut stream = relay.stream_reply(session.active_model(), session.messages());
    let mut reply = String::new();
    let mut written = Ok(());
    while let Some(fragment) = stream.next().await {
        reply.push_str(&fragment);
        if written.is_ok() {
            written = out
                .write_all(fragment.as_bytes())
                .and_then(|_| out.flush());
        }
    }

    if is_error_fragment(&reply) {
        tracing::debug!("Storing error reply in transcript");
    }
    session.finish_turn(turn, reply.clone());

    written?;
    writeln!(out)?;
    Ok(reply)
}

/// Pick the model a new session starts with
fn initial_model(config: &Config, requested: Option<&str>) -> Result<&'static str> {
    match requested {
        Some(m) => Ok(ModelRegistry::resolve(m)?.id),
        None => config.default_model_id(),
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop. Regular input goes to the tutor and the reply
    //! is rendered as it streams; `/` commands act on the session.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::prompts::{EXAMPLE_PROMPTS, WELCOME_QUESTION, WELCOME_SUGGESTIONS, WELCOME_TEXT};
    use crate::session::Role;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `model` - Optional model to start with instead of the configured default
    ///
    /// # Errors
    ///
    /// Fails before the loop starts if no API key is configured
    pub async fn run_chat(config: Config, model: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let relay = CompletionRelay::new(create_provider(&config)?);
        let mut session = SessionStore::with_model(initial_model(&config, model.as_deref())?);
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&session);

        loop {
            let prompt = format!("[{}] >> ", session.active_model().cyan());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::SwitchModel(choice) => {
                            match ModelRegistry::resolve(&choice) {
                                Ok(entry) => {
                                    session.set_model(entry.id);
                                    println!("Model: {}", entry.label.green());
                                    println!("{}\n", entry.description.dimmed());
                                }
                                Err(e) => eprintln!("{}", e.to_string().red()),
                            }
                            continue;
                        }
                        SpecialCommand::ListModels => {
                            models::list_models(false, Some(session.active_model()))?;
                            continue;
                        }
                        SpecialCommand::NewChat => {
                            session.clear();
                            println!("{}\n", "New chat started.".green());
                            print_welcome_banner(&session);
                            continue;
                        }
                        SpecialCommand::ShowHistory => {
                            print_history(&session);
                            continue;
                        }
                        SpecialCommand::ShowExamples => {
                            print_examples();
                            continue;
                        }
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {}
                    }

                    println!();
                    let mut stdout = std::io::stdout();
                    if let Err(e) = handle_turn(&relay, &mut session, trimmed, &mut stdout).await {
                        eprintln!("Error: {}\n", e);
                    } else {
                        println!();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("¡Hasta luego!");
        Ok(())
    }

    fn print_welcome_banner(session: &SessionStore) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║            IA para Todos - Tu Copiloto de aprendizaje        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("{}\n", WELCOME_TEXT);
        println!("{}", WELCOME_QUESTION.bold());
        for suggestion in WELCOME_SUGGESTIONS {
            println!("  {} '{}'", suggestion.caption.cyan(), suggestion.text.italic());
        }
        println!();
        println!(
            "Model: {}",
            ModelRegistry::label_for(session.active_model()).green()
        );
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_history(session: &SessionStore) {
        if session.is_empty() {
            println!("(no messages yet)\n");
            return;
        }
        for message in session.messages() {
            let tag = match message.role {
                Role::User => "You".cyan().bold(),
                Role::Assistant => "Tutor".green().bold(),
                Role::System => "System".yellow().bold(),
            };
            println!("{}: {}\n", tag, message.content);
        }
    }

    fn print_examples() {
        for module in EXAMPLE_PROMPTS {
            println!("\n{}", module.title.bold());
            println!("{}", module.intro);
            for example in module.prompts {
                println!("  {} {}", "•".cyan(), example.caption.italic());
                println!("    {}", example.text);
            }
        }
        println!();
    }
}

// One-shot question handler
pub mod ask {
    //! Sends one question and streams the reply to stdout.

    use super::*;

    /// Ask a single question
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured, the model is unknown, or
    /// the prompt is blank
    pub async fn run_ask(config: Config, prompt: String, model: Option<String>) -> Result<()> {
        let relay = CompletionRelay::new(create_provider(&config)?);
        let mut session = SessionStore::with_model(initial_model(&config, model.as_deref())?);
        tracing::info!(model = %session.active_model(), "Asking a single question");

        let mut stdout = std::io::stdout();
        handle_turn(&relay, &mut session, &prompt, &mut stdout).await?;
        Ok(())
    }
}

// Authentication command handler
pub mod auth {
    //! Stores the inference API key in the OS keyring.

    use super::*;
    use crate::config::{KEYRING_SERVICE, KEYRING_USER};
    use crate::error::TutorError;

    /// Save `key` so later runs can find it without environment variables
    ///
    /// # Errors
    ///
    /// Returns error if the key is blank or the keyring is unavailable
    pub fn store_api_key(key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(TutorError::Config("API key cannot be empty".to_string()).into());
        }
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        entry.set_password(key)?;
        tracing::info!("API key stored in keyring");
        println!("API key saved.");
        Ok(())
    }
}

// HTTP server handler
pub mod serve {
    //! Starts the HTTP chat API.

    use super::*;
    use crate::server;

    /// Run the server until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured or the address cannot be bound
    pub async fn run_serve(config: Config) -> Result<()> {
        let relay = CompletionRelay::new(create_provider(&config)?);
        let state = server::AppState::new(relay, config.default_model_id()?);
        server::serve(&config.server.bind_address, state).await
    }
}
