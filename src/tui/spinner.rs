//! Waiting spinner shown until the first fragment arrives

use indicatif::{ProgressBar, ProgressStyle};

pub struct WaitingSpinner {
    bar: ProgressBar,
    active: bool,
}

impl WaitingSpinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&[
                    "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}",
                    "\u{2834}", "\u{2826}", "\u{2827}", "\u{2807}", "\u{280f}",
                ]),
        );
        Self { bar, active: false }
    }

    pub fn start(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
        self.bar
            .enable_steady_tick(std::time::Duration::from_millis(80));
        self.active = true;
    }

    /// Stop and clear. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.active {
            self.bar.finish_and_clear();
            self.active = false;
        }
    }
}

impl Default for WaitingSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WaitingSpinner {
    fn drop(&mut self) {
        self.stop();
    }
}
