//! Line input for the interactive shell

use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};

/// Reads user input behind a styled prompt.
pub struct PromptHandler;

impl PromptHandler {
    pub fn new() -> Self {
        Self
    }

    /// Display the prompt and read one line, trimmed.
    /// Returns None on EOF (Ctrl+D).
    pub fn read_line(&mut self, prompt_color: crossterm::style::Color) -> Option<String> {
        print!("{} ", ">".with(prompt_color));
        io::stdout().flush().ok()?;

        let stdin = io::stdin();
        let mut line = String::new();

        match stdin.lock().read_line(&mut line) {
            Ok(0) => None, // EOF
            Ok(_) => Some(line.trim().to_string()),
            Err(_) => None,
        }
    }
}

impl Default for PromptHandler {
    fn default() -> Self {
        Self::new()
    }
}
