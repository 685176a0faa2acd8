use crate::ui::theme::Role;
use crate::ui::{theme, Icons};

pub fn header(text: &str) {
    println!("{} {}", Icons::BOOKS, theme().paint(text, Role::Title));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, theme().paint(label, Role::Done));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, theme().paint(label, Role::Caution));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, theme().paint(label, Role::Label), value);
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", theme().paint(title, Role::Title));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", theme().paint(label, Role::Label), value);
}
