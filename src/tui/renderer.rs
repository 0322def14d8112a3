//! Terminal rendering with markdown support

use crossterm::style::{Color, Stylize};
use termimad::MadSkin;

use super::theme::Theme;

/// Renders shell output: streamed deltas, completed responses, errors.
pub struct TerminalRenderer {
    theme: Theme,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        let theme = Theme::default();
        let skin = Self::build_skin(&theme);
        Self { theme, skin }
    }

    fn build_skin(theme: &Theme) -> MadSkin {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(to_termimad_color(theme.banner));
        skin.bold.set_fg(to_termimad_color(Color::White));
        skin.inline_code.set_fg(to_termimad_color(Color::Green));
        skin.code_block.set_fg(to_termimad_color(Color::Green));
        skin
    }

    /// Render the welcome banner
    pub fn render_banner(&self, version: &str, provider: &str, model: &str) {
        println!();
        println!("{}", "  llmagent chat".with(self.theme.banner));
        println!(
            "  {} {}",
            "v".with(self.theme.dim),
            version.with(self.theme.dim)
        );
        println!(
            "  {} {}",
            "Provider:".with(self.theme.dim),
            format!("{provider} ({model})").with(self.theme.notice),
        );
        println!(
            "  {}",
            "Type /help for commands, /quit to exit".with(self.theme.dim)
        );
        println!();
    }

    /// Render a streamed text delta as it arrives (no markdown processing)
    pub fn render_delta(&self, text: &str) {
        use std::io::Write;
        print!("{}", text.with(self.theme.response));
        let _ = std::io::stdout().flush();
    }

    /// Re-render a complete response with markdown formatting when it has
    /// anything worth formatting; otherwise just close the line.
    pub fn render_markdown(&self, content: &str) {
        if has_markdown_elements(content) {
            println!();
            self.skin.print_text(content);
        } else {
            println!();
        }
    }

    /// Dim per-turn summary printed after a completed response
    pub fn render_turn_line(&self, fragments: usize, chars: usize, model: &str) {
        println!(
            "\n  {} {} fragments, {} chars [{}]",
            "\u{2022}".with(self.theme.dim),
            format!("{fragments}").with(self.theme.notice),
            format!("{chars}").with(self.theme.notice),
            model.with(self.theme.dim),
        );
        println!();
    }

    /// Render a notice/header line
    pub fn render_notice(&self, msg: &str) {
        println!(
            "  {} {}",
            "\u{25b6}".with(self.theme.notice),
            msg.with(self.theme.notice)
        );
    }

    /// Render an error message
    pub fn render_error(&self, msg: &str) {
        println!(
            "  {} {}",
            "\u{2717}".with(self.theme.error),
            msg.with(self.theme.error)
        );
    }

    /// Render a success message
    pub fn render_success(&self, msg: &str) {
        println!(
            "  {} {}",
            "\u{2713}".with(self.theme.success),
            msg.with(self.theme.success)
        );
    }

    /// Render dim info text
    pub fn render_info(&self, msg: &str) {
        println!("  {}", msg.with(self.theme.dim));
    }

    pub fn prompt_color(&self) -> Color {
        self.theme.prompt
    }

    pub fn command_color(&self) -> Color {
        self.theme.command
    }

    pub fn dim_color(&self) -> Color {
        self.theme.dim
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether content has markdown elements worth re-rendering
fn has_markdown_elements(content: &str) -> bool {
    content.contains("```")
        || content.contains("# ")
        || content.contains("**")
        || content.contains("| ")
}

/// Convert a crossterm color to termimad's re-exported crossterm type
fn to_termimad_color(color: Color) -> termimad::crossterm::style::Color {
    match color {
        Color::Red => termimad::crossterm::style::Color::Red,
        Color::Green => termimad::crossterm::style::Color::Green,
        Color::Yellow => termimad::crossterm::style::Color::Yellow,
        Color::DarkYellow => termimad::crossterm::style::Color::DarkYellow,
        Color::Magenta => termimad::crossterm::style::Color::Magenta,
        Color::Cyan => termimad::crossterm::style::Color::Cyan,
        Color::White => termimad::crossterm::style::Color::White,
        Color::DarkGrey => termimad::crossterm::style::Color::DarkGrey,
        _ => termimad::crossterm::style::Color::Reset,
    }
}
