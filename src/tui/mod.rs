//! Interactive chat shell
//!
//! One streaming turn at a time: the prompt is read, the response streamed
//! fragment by fragment, and only once the stream settles is the next
//! prompt offered. A second concurrent stream per session is therefore
//! impossible by construction.

pub mod commands;
pub mod prompt;
pub mod renderer;
pub mod spinner;
pub mod theme;

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::llm::{
    Aggregate, DrainState, Fragment, LlmProvider, MockProvider, OpenRouterConfig,
    OpenRouterProvider,
};

use commands::{parse_command, render_help, SlashCommand};
use prompt::PromptHandler;
use renderer::TerminalRenderer;
use spinner::WaitingSpinner;

/// Interactive shell with streamed responses and slash commands
pub struct InteractiveShell {
    config: Config,
    provider: Arc<dyn LlmProvider>,
    provider_name: String,
    model: String,
    renderer: TerminalRenderer,
    prompt_handler: PromptHandler,
    /// Turns completed this session
    turn_count: usize,
    /// Response characters received this session
    chars_streamed: u64,
}

impl InteractiveShell {
    pub fn new(config: Config) -> Result<Self> {
        let (provider, provider_name, model) = Self::select_provider(&config)?;

        Ok(Self {
            config,
            provider,
            provider_name,
            model,
            renderer: TerminalRenderer::new(),
            prompt_handler: PromptHandler::new(),
            turn_count: 0,
            chars_streamed: 0,
        })
    }

    /// Build the provider named by the configuration.
    fn select_provider(config: &Config) -> Result<(Arc<dyn LlmProvider>, String, String)> {
        match config.provider.as_str() {
            "openrouter" => {
                let api_key = config.openrouter_api_key().ok_or_else(|| {
                    anyhow::anyhow!(
                        "LLM provider type is 'openrouter' but LLMAGENT_OPENROUTER_API_KEY is not set"
                    )
                })?;
                let model = config.openrouter.model.clone();
                let provider = OpenRouterProvider::new(OpenRouterConfig {
                    api_key,
                    model: model.clone(),
                    base_url: None,
                })?;
                Ok((Arc::new(provider), "OpenRouter".to_string(), model))
            }
            "mock" => Ok((
                Arc::new(MockProvider::new()),
                "Mock".to_string(),
                "canned".to_string(),
            )),
            other => anyhow::bail!(
                "unknown LLM provider type '{other}'; supported types are 'mock' and 'openrouter'"
            ),
        }
    }

    /// Run the shell main loop
    pub async fn run(&mut self) -> Result<()> {
        self.renderer.render_banner(
            env!("CARGO_PKG_VERSION"),
            &self.provider_name,
            &self.model,
        );

        loop {
            let input = match self.prompt_handler.read_line(self.renderer.prompt_color()) {
                Some(input) => input,
                None => {
                    // EOF (Ctrl+D)
                    self.render_session_summary();
                    break;
                }
            };

            if input.is_empty() {
                continue;
            }

            if let Some(cmd) = parse_command(&input) {
                match self.handle_command(cmd) {
                    CommandResult::Continue => continue,
                    CommandResult::Quit => {
                        self.render_session_summary();
                        break;
                    }
                }
            } else {
                self.process_message(&input).await;
            }
        }

        Ok(())
    }

    fn handle_command(&mut self, cmd: SlashCommand) -> CommandResult {
        match cmd {
            SlashCommand::Help => {
                render_help(&self.renderer);
            }
            SlashCommand::Quit => {
                return CommandResult::Quit;
            }
            SlashCommand::Clear => {
                use crossterm::cursor::MoveTo;
                use crossterm::terminal::{Clear, ClearType};
                let _ = crossterm::execute!(std::io::stdout(), Clear(ClearType::All), MoveTo(0, 0));
            }
            SlashCommand::Provider(name) => {
                if let Some(name) = name {
                    match self.switch_provider(&name) {
                        Ok(()) => {
                            self.renderer.render_success(&format!(
                                "Switched to provider: {}",
                                self.provider_name
                            ));
                        }
                        Err(e) => {
                            self.renderer.render_error(&format!("{e}"));
                        }
                    }
                } else {
                    self.renderer.render_info(&format!(
                        "Current provider: {} ({})",
                        self.provider_name, self.model
                    ));
                }
            }
            SlashCommand::Model(name) => {
                if let Some(name) = name {
                    match self.switch_model(&name) {
                        Ok(()) => {
                            self.renderer
                                .render_success(&format!("Model set to: {name}"));
                        }
                        Err(e) => {
                            self.renderer.render_error(&format!("{e}"));
                        }
                    }
                } else {
                    self.renderer
                        .render_info(&format!("Current model: {}", self.model));
                }
            }
            SlashCommand::Stats => {
                self.render_stats();
            }
        }
        CommandResult::Continue
    }

    /// Stream one response: spinner until the first fragment, incremental
    /// echo per delta, one receive outstanding at a time.
    async fn process_message(&mut self, input: &str) {
        let mut spinner = WaitingSpinner::new();
        spinner.start("Waiting for response...");

        let mut rx = match self.provider.stream(input).await {
            Ok(rx) => rx,
            Err(e) => {
                spinner.stop();
                self.renderer.render_error(&format!("Request failed: {e}"));
                return;
            }
        };

        let mut aggregate = Aggregate::new();
        let mut fragments = 0usize;
        let mut first_delta = true;

        while aggregate.state() == DrainState::Draining {
            let message = rx.recv().await;
            if let Some(Fragment::Content(text)) = &message {
                if first_delta {
                    spinner.stop();
                    println!();
                    first_delta = false;
                }
                fragments += 1;
                self.renderer.render_delta(text);
            }
            aggregate.observe(message);
        }
        spinner.stop();

        match aggregate.state() {
            DrainState::Failed => {
                if !aggregate.content().is_empty() {
                    println!();
                }
                self.renderer.render_error(&format!(
                    "Stream error: {}",
                    aggregate.error().unwrap_or("unknown")
                ));
            }
            _ => {
                if aggregate.content().is_empty() {
                    self.renderer
                        .render_info("[No response or stream ended abruptly]");
                } else {
                    self.renderer.render_markdown(aggregate.content());
                    self.renderer
                        .render_turn_line(fragments, aggregate.content().len(), &self.model);
                }
                self.turn_count += 1;
                self.chars_streamed += aggregate.content().len() as u64;
            }
        }
    }

    fn switch_provider(&mut self, name: &str) -> Result<()> {
        let mut config = self.config.clone();
        config.provider = name.to_lowercase();
        let (provider, provider_name, model) = Self::select_provider(&config)?;
        self.config = config;
        self.provider = provider;
        self.provider_name = provider_name;
        self.model = model;
        Ok(())
    }

    fn switch_model(&mut self, model: &str) -> Result<()> {
        self.config.openrouter.model = model.to_string();
        if self.config.provider == "openrouter" {
            let (provider, provider_name, model) = Self::select_provider(&self.config)?;
            self.provider = provider;
            self.provider_name = provider_name;
            self.model = model;
        } else {
            self.model = model.to_string();
        }
        Ok(())
    }

    fn render_stats(&self) {
        println!();
        self.renderer.render_notice("Session statistics:");
        self.renderer
            .render_info(&format!("Turns: {}", self.turn_count));
        self.renderer
            .render_info(&format!("Response chars: {}", self.chars_streamed));
        println!();
    }

    fn render_session_summary(&self) {
        println!();
        self.renderer.render_info(&format!(
            "{} turns, {} response chars. Goodbye!",
            self.turn_count, self.chars_streamed
        ));
        println!();
    }
}

/// Result of handling a slash command
enum CommandResult {
    Continue,
    Quit,
}
