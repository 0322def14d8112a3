//! Color theme for the interactive shell

use crossterm::style::Color;

/// Colors used by the shell renderer
pub struct Theme {
    /// Prompt symbol
    pub prompt: Color,
    /// Streamed response text
    pub response: Color,
    /// Notices and section headers
    pub notice: Color,
    /// Error messages
    pub error: Color,
    /// Secondary/dim info
    pub dim: Color,
    /// Confirmation messages
    pub success: Color,
    /// Banner title
    pub banner: Color,
    /// Slash command names
    pub command: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            prompt: Color::Cyan,
            response: Color::White,
            notice: Color::DarkYellow,
            error: Color::Red,
            dim: Color::DarkGrey,
            success: Color::Green,
            banner: Color::Magenta,
            command: Color::Yellow,
        }
    }
}
