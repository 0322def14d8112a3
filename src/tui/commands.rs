//! Slash command parsing and definitions

use crossterm::style::Stylize;

/// Available slash commands
#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Clear,
    Provider(Option<String>),
    Model(Option<String>),
    Stats,
}

/// Parse a slash command from user input.
/// Returns None if the input is not a slash command.
pub fn parse_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(SlashCommand::Help),
        "/quit" | "/q" | "/exit" => Some(SlashCommand::Quit),
        "/clear" | "/cls" => Some(SlashCommand::Clear),
        "/provider" => Some(SlashCommand::Provider(arg)),
        "/model" => Some(SlashCommand::Model(arg)),
        "/stats" => Some(SlashCommand::Stats),
        _ => None,
    }
}

/// Render help text for all slash commands
pub fn render_help(renderer: &super::renderer::TerminalRenderer) {
    let cmd_color = renderer.command_color();
    let dim_color = renderer.dim_color();

    println!();
    renderer.render_notice("Available commands:");
    println!();

    let commands = [
        ("/help", "Show this help message"),
        ("/quit", "Exit the chat"),
        ("/clear", "Clear the screen"),
        ("/provider [name]", "Show or switch the provider (mock, openrouter)"),
        ("/model [name]", "Show or change the model"),
        ("/stats", "Show session statistics"),
    ];

    for (cmd, desc) in &commands {
        println!("  {:<20} {}", cmd.with(cmd_color), desc.with(dim_color));
    }
    println!();
}
