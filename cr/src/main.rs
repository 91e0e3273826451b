//! chainroute - prompt chaining and LLM routing
//!
//! CLI entry point for the recommender, the routers and the chat session.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use chainroute::cli::{ChatMode, Cli, Command, OutputFormat, generate_after_help, get_log_path};
use chainroute::config::{Config, LlmConfig};
use chainroute::llm::{LlmClient, create_client};
use chainroute::pipeline::Recommender;
use chainroute::prompts::PromptLoader;
use chainroute::repl::{self, ChatEngine};
use chainroute::router::{RouteTable, Router, RouterDefinition, medical};

/// Example request used by `cr demo` for the chain
const DEMO_SERIES_INPUT: &str = "Queria ver uma série de ficção científica que tenha mistério, tipo Black Mirror, \
     mas que não seja muito longa. E que seja mais nova, dos últimos 2 anos.";

/// Example patient messages used by `cr demo` for routing
const DEMO_TRIAGE_INPUTS: &[&str] = &[
    "Meu filho de 3 anos está com febre desde ontem, o que devo fazer?",
    "Ando muito ansioso e não consigo dormir direito.",
    "Bom dia!",
];

const BANNER_WIDTH: usize = 70;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level_str = cli_log_level.or(config_log_level);
    let level = if let Some(s) = level_str {
        match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        }
    } else {
        tracing::Level::INFO
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Help text reports the key variable of the default config chain
    let api_key_env = Config::load(None)
        .map(|c| c.llm.api_key_env().to_string())
        .unwrap_or_else(|_| LlmConfig::default().api_key_env().to_string());
    let cmd = Cli::command().after_help(generate_after_help(&api_key_env));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, model = %config.llm.model(), "chainroute loaded config");

    let loader = prompt_loader(&config)?;
    let format = cli.format;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Recommend { text }) => {
            debug!("main: matched Recommend command");
            cmd_recommend(&config, &loader, &text, format).await
        }
        Some(Command::Extract { text }) => {
            debug!("main: matched Extract command");
            cmd_extract(&config, &loader, &text, format).await
        }
        Some(Command::Route { text, routes }) => {
            debug!(?routes, "main: matched Route command");
            cmd_route(&config, &loader, routes, &text, format).await
        }
        Some(Command::Routes { routes }) => {
            debug!(?routes, "main: matched Routes command");
            cmd_routes(&config, routes, format)
        }
        Some(Command::Chat { mode, routes }) => {
            debug!(%mode, "main: matched Chat command");
            cmd_chat(&config, &loader, mode, routes).await
        }
        Some(Command::Demo) => {
            debug!("main: matched Demo command");
            cmd_demo(&config, &loader).await
        }
        None => {
            debug!("main: no command, printing help");
            Cli::command()
                .after_help(generate_after_help(config.llm.api_key_env()))
                .print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Prompt lookup rooted at the working directory, plus the configured extra dir
fn prompt_loader(config: &Config) -> Result<PromptLoader> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut loader = PromptLoader::new(cwd);
    if let Some(dir) = &config.prompts.dir {
        debug!(?dir, "prompt_loader: adding configured prompts dir");
        loader = loader.with_dir(dir.clone());
    }
    Ok(loader)
}

/// Validate the API key and build the configured backend
fn llm_client(config: &Config) -> Result<Arc<dyn LlmClient>> {
    config.validate()?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    Ok(llm)
}

/// The YAML router named on the command line or in config, else medical triage
fn router_definition_path(config: &Config, routes: Option<PathBuf>) -> Option<PathBuf> {
    routes.or_else(|| config.router.definition.clone())
}

fn build_router(config: &Config, loader: &PromptLoader, routes: Option<PathBuf>) -> Result<Router> {
    let llm = llm_client(config)?;
    let router = match router_definition_path(config, routes) {
        Some(path) => {
            debug!(?path, "build_router: using router definition");
            RouterDefinition::load(&path)?.build(llm, loader)?
        }
        None => {
            debug!("build_router: using medical triage router");
            medical::triage_router(llm, loader)?
        }
    };
    Ok(router.with_max_tokens(config.llm.max_tokens))
}

fn build_recommender(config: &Config, loader: &PromptLoader) -> Result<Recommender> {
    let llm = llm_client(config)?;
    Ok(Recommender::tv_series(llm, loader)?.with_max_tokens(config.llm.max_tokens))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn banner(title: &str) {
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!("{}", title.bright_cyan().bold());
    println!("{}", "=".repeat(BANNER_WIDTH));
}

async fn cmd_recommend(config: &Config, loader: &PromptLoader, text: &str, format: OutputFormat) -> Result<()> {
    let recommender = build_recommender(config, loader)?;
    let result = recommender.recommend(text).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            println!("{}", "[CRITÉRIOS]".bright_cyan());
            println!("{}", result.criteria);
            println!();
            println!("{}", "[RECOMENDAÇÃO]".bright_cyan());
            println!("{}", result.recommendation);
            Ok(())
        }
    }
}

async fn cmd_extract(config: &Config, loader: &PromptLoader, text: &str, format: OutputFormat) -> Result<()> {
    let recommender = build_recommender(config, loader)?;
    let criteria = recommender.extract_criteria(text).await?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "criteria": criteria })),
        OutputFormat::Text => {
            println!("{}", criteria);
            Ok(())
        }
    }
}

async fn cmd_route(
    config: &Config,
    loader: &PromptLoader,
    routes: Option<PathBuf>,
    text: &str,
    format: OutputFormat,
) -> Result<()> {
    let router = build_router(config, loader, routes)?;
    let result = router.route(text).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            if let Some(notice) = result.fallback_notice() {
                eprintln!("{} {}", "!".yellow(), notice);
            }
            println!("{} {}", "Rota:".bright_cyan(), result.selected_route.bold());
            println!("{}", result.response);
            Ok(())
        }
    }
}

/// List routes without touching the model, so no API key is needed
fn cmd_routes(config: &Config, routes: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let table: RouteTable = match router_definition_path(config, routes) {
        Some(path) => RouterDefinition::load(&path)?.route_table()?,
        None => medical::route_table()?,
    };

    match format {
        OutputFormat::Json => print_json(&table.iter().collect::<Vec<_>>()),
        OutputFormat::Text => {
            for route in table.iter() {
                println!("{:14} {}", route.name().yellow(), route.description());
            }
            Ok(())
        }
    }
}

async fn cmd_chat(config: &Config, loader: &PromptLoader, mode: ChatMode, routes: Option<PathBuf>) -> Result<()> {
    let engine = match mode {
        ChatMode::Recommend => ChatEngine::Recommend(build_recommender(config, loader)?),
        ChatMode::Route => ChatEngine::Route(build_router(config, loader, routes)?),
    };
    repl::run_interactive(engine).await
}

async fn cmd_demo(config: &Config, loader: &PromptLoader) -> Result<()> {
    let llm = llm_client(config)?;
    println!(
        "{} LLM configurado: {} (temperature={})",
        "✓".green(),
        config.llm.model().cyan(),
        config.llm.temperature
    );
    println!();

    banner("PROMPT CHAINING: recomendador de séries");
    let recommender = Recommender::tv_series(llm.clone(), loader)?.with_max_tokens(config.llm.max_tokens);
    println!();
    println!("{}", "[ENTRADA DO USUÁRIO]".bright_cyan());
    println!("\"{}\"", DEMO_SERIES_INPUT);

    let result = recommender.recommend(DEMO_SERIES_INPUT).await?;
    println!();
    println!("{}", "[ETAPA 1: CRITÉRIOS EXTRAÍDOS]".bright_cyan());
    println!("{}", result.criteria);
    println!();
    println!("{}", "[ETAPA 2: RECOMENDAÇÃO FINAL]".bright_cyan());
    println!("{}", result.recommendation);
    println!();

    banner("ROUTING: triagem médica");
    let router = medical::triage_router(llm, loader)?.with_max_tokens(config.llm.max_tokens);
    println!("Rotas: {}", router.available_routes().join(", "));

    for input in DEMO_TRIAGE_INPUTS {
        println!();
        println!("{}", "[ENTRADA DO PACIENTE]".bright_cyan());
        println!("\"{}\"", input);
        let result = router.route(input).await?;
        println!("{} {}", "[ROTA]".bright_cyan(), result.selected_route.bold());
        println!("{}", result.response);
    }

    println!();
    println!("{} Demonstração concluída com sucesso!", "✓".green());
    Ok(())
}
