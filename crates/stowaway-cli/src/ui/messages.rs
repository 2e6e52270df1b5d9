//! Status messages on stderr.

use owo_colors::{OwoColorize, Style};

use super::color_enabled;

fn styled(style: Style) -> Style {
    if color_enabled() { style } else { Style::new() }
}

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".style(styled(Style::new().green().bold())), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".style(styled(Style::new().blue().bold())), message);
}

pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        "⚠".style(styled(Style::new().yellow().bold())),
        message.style(styled(Style::new().yellow()))
    );
}

pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        "✗".style(styled(Style::new().red().bold())),
        message.style(styled(Style::new().red()))
    );
}
