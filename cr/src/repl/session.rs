//! Chat session management

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use crate::pipeline::Recommender;
use crate::router::Router;

/// What answers each line
pub enum ChatEngine {
    Recommend(Recommender),
    Route(Router),
}

/// Result of a slash command
#[derive(Debug, PartialEq, Eq)]
enum SlashResult {
    Continue,
    Quit,
}

/// Interactive chat session
///
/// Every line is an independent turn: nothing from earlier lines reaches the
/// model, so the session holds only the engine.
pub struct ChatSession {
    engine: ChatEngine,
}

impl ChatSession {
    pub fn new(engine: ChatEngine) -> Self {
        Self { engine }
    }

    /// Run the chat main loop
    pub async fn run(&self) -> Result<()> {
        debug!("ChatSession::run: called");
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else if let Err(e) = self.process_user_input(input).await {
                        // A failed turn does not end the session
                        warn!(error = %e, "ChatSession: turn failed");
                        println!("{} {}", "Erro:".red().bold(), e);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Até logo!");
        Ok(())
    }

    /// Answer one line with the session's engine
    pub async fn process_user_input(&self, input: &str) -> Result<()> {
        debug!(input_len = input.len(), "process_user_input: called");
        match &self.engine {
            ChatEngine::Recommend(recommender) => {
                println!("{}", "Analisando critérios...".dimmed());
                let criteria = recommender.extract_criteria(input).await?;
                println!("{}", "Critérios extraídos:".bright_cyan());
                println!("{}", criteria);
                println!();

                println!("{}", "Gerando recomendação...".dimmed());
                let recommendation = recommender.recommend_from_criteria(&criteria).await?;
                println!("{}", "Recomendação:".bright_cyan());
                println!("{}", recommendation);
            }
            ChatEngine::Route(router) => {
                let result = router.route(input).await?;
                if let Some(notice) = result.fallback_notice() {
                    println!("{} {}", "!".yellow(), notice);
                }
                println!("{} {}", "Rota:".bright_cyan(), result.selected_route.bold());
                println!("{}", result.response);
            }
        }
        println!();
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        match &self.engine {
            ChatEngine::Recommend(_) => {
                println!("{}", "Recomendador de séries".bright_cyan().bold());
                println!("Descreva o que você quer assistir.");
            }
            ChatEngine::Route(router) => {
                println!("{}", "Triagem".bright_cyan().bold());
                println!("Rotas: {}", router.available_routes().join(", "));
            }
        }
        println!("Digite {} para ajuda, {} para sair", "/help".yellow(), "/quit".yellow());
        println!();
    }

    fn handle_slash_command(&self, input: &str) -> SlashResult {
        let cmd = input.split_whitespace().next().unwrap_or("");
        debug!(%cmd, "handle_slash_command: called");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/routes" => {
                self.print_routes();
                SlashResult::Continue
            }
            _ => {
                println!("{} Comando desconhecido: {}", "?".yellow(), cmd);
                println!("Digite {} para ver os comandos", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Comandos:".bright_cyan());
        println!("  {:10} Mostra esta ajuda", "/help".yellow());
        println!("  {:10} Lista as rotas disponíveis", "/routes".yellow());
        println!("  {:10} Sai da sessão", "/quit".yellow());
        println!();
    }

    fn print_routes(&self) {
        match &self.engine {
            ChatEngine::Route(router) => {
                for route in router.routes().iter() {
                    println!("  {:14} {}", route.name().yellow(), route.description());
                }
            }
            ChatEngine::Recommend(_) => {
                println!("{}", "Sem rotas no modo de recomendação.".dimmed());
            }
        }
    }
}
