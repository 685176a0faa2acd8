//! Terminal styling, off when stdout is not a terminal or colors are disabled

use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

/// What a piece of output is, independent of how it looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Title,
    Done,
    Caution,
    Label,
    OutOfStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    colored: bool,
}

impl Theme {
    pub fn detect() -> Self {
        Self {
            colored: console::Term::stdout().is_term() && console::colors_enabled(),
        }
    }

    pub fn plain() -> Self {
        Self { colored: false }
    }

    pub fn style(&self, role: Role) -> Style {
        if !self.colored {
            return Style::new();
        }
        match role {
            Role::Title => Style::new().cyan().bold(),
            Role::Done => Style::new().green().bold(),
            Role::Caution => Style::new().yellow().bold(),
            Role::Label => Style::new().white().dimmed(),
            Role::OutOfStock => Style::new().red(),
        }
    }

    pub fn paint(&self, text: &str, role: Role) -> String {
        text.style(self.style(role)).to_string()
    }
}

pub fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_theme_leaves_text_alone() {
        let plain = Theme::plain();
        assert_eq!(plain.paint("0", Role::OutOfStock), "0");
        assert_eq!(plain.paint("Books", Role::Title), "Books");
    }

    #[test]
    fn test_colored_theme_marks_out_of_stock() {
        let colored = Theme { colored: true };
        let painted = colored.paint("0", Role::OutOfStock);
        assert!(painted.contains('0'));
        assert_ne!(painted, "0");
    }
}
