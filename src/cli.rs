//! Command-line interface definition for tutorchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for terminal chat, one-shot questions, the HTTP
//! server, and credential setup.

use clap::{Parser, Subcommand};

/// tutorchat - course tutor chat over a hosted completion API
///
/// Streams replies from an OpenAI-compatible inference service using a
/// fixed tutor persona.
#[derive(Parser, Debug, Clone)]
#[command(name = "tutorchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for tutorchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session in the terminal
    Chat {
        /// Model to start with (label, identifier, or number from `models`)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question and stream the reply to stdout
    Ask {
        /// Question to send
        #[arg(short, long)]
        prompt: String,

        /// Model to use (label, identifier, or number from `models`)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the selectable models
    Models {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the chat API over HTTP
    Serve {
        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Store the API key in the OS keyring
    Auth {
        /// API key to store
        #[arg(short, long)]
        key: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Models { json: false },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Models { json: false }));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["tutorchat", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { model: None }));
    }

    #[test]
    fn test_cli_parse_chat_with_model() {
        let cli = Cli::try_parse_from(["tutorchat", "chat", "--model", "2"]).unwrap();
        if let Commands::Chat { model } = cli.command {
            assert_eq!(model, Some("2".to_string()));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_ask_requires_prompt() {
        assert!(Cli::try_parse_from(["tutorchat", "ask"]).is_err());
        let cli = Cli::try_parse_from(["tutorchat", "ask", "--prompt", "Hola"]).unwrap();
        if let Commands::Ask { prompt, model } = cli.command {
            assert_eq!(prompt, "Hola");
            assert_eq!(model, None);
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_serve_with_bind() {
        let cli = Cli::try_parse_from(["tutorchat", "serve", "-b", "0.0.0.0:9000"]).unwrap();
        if let Commands::Serve { bind } = cli.command {
            assert_eq!(bind, Some("0.0.0.0:9000".to_string()));
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_cli_parse_models_json_and_global_verbose() {
        let cli = Cli::try_parse_from(["tutorchat", "models", "--json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Models { json: true }));
    }

    #[test]
    fn test_cli_parse_custom_config() {
        let cli =
            Cli::try_parse_from(["tutorchat", "--config", "custom.yaml", "models"]).unwrap();
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
    }
}
