//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// chainroute - prompt chaining and LLM routing
#[derive(Parser)]
#[command(
    name = "cr",
    about = "Prompt chaining and LLM routing over a single model client",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract search criteria, then recommend a TV series
    Recommend {
        /// What the user is looking for, in free text
        text: String,
    },

    /// Run only the criteria extraction stage
    Extract {
        /// What the user is looking for, in free text
        text: String,
    },

    /// Classify a message and answer it with the chosen route
    Route {
        /// The user's message
        text: String,

        /// Router definition file (YAML); defaults to the medical triage router
        #[arg(short, long)]
        routes: Option<PathBuf>,
    },

    /// List the routes a router can choose from
    Routes {
        /// Router definition file (YAML); defaults to the medical triage router
        #[arg(short, long)]
        routes: Option<PathBuf>,
    },

    /// Interactive session, one independent turn per line
    Chat {
        /// Which pattern answers each line (recommend, route)
        #[arg(short, long, default_value = "route")]
        mode: ChatMode,

        /// Router definition file (YAML), for route mode
        #[arg(short, long)]
        routes: Option<PathBuf>,
    },

    /// Walk through both patterns with a built-in example
    Demo,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chainroute")
        .join("logs")
        .join("chainroute.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with the log location and API key status
pub fn generate_after_help(api_key_env: &str) -> String {
    debug!(%api_key_env, "generate_after_help: called");
    let mut help = String::new();

    help.push_str("API key:\n");
    let icon = if std::env::var(api_key_env).is_ok() {
        debug!("generate_after_help: api key set");
        "\u{2705}"
    } else {
        debug!("generate_after_help: api key not set");
        "\u{274C}"
    };
    help.push_str(&format!("  {} {}\n", icon, api_key_env));

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));

    debug!("generate_after_help: returning help text");
    help
}

/// Output format for command results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => {
                debug!("OutputFormat::from_str: matched Text");
                Ok(Self::Text)
            }
            "json" => {
                debug!("OutputFormat::from_str: matched Json");
                Ok(Self::Json)
            }
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// What answers each line of a chat session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChatMode {
    Recommend,
    #[default]
    Route,
}

impl std::str::FromStr for ChatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "ChatMode::from_str: called");
        match s.to_lowercase().as_str() {
            "recommend" | "chain" => Ok(Self::Recommend),
            "route" | "router" => Ok(Self::Route),
            _ => Err(format!("Unknown mode: {}. Use: recommend or route", s)),
        }
    }
}

impl std::fmt::Display for ChatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recommend => write!(f, "recommend"),
            Self::Route => write!(f, "route"),
        }
    }
}
