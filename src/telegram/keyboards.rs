//! Inline keyboards and their callback data.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::reporting::OutputFormat;

pub const START_ANALYSIS: &str = "start_analysis";
pub const FORMAT_TEXT: &str = "format_text";
pub const FORMAT_CSV: &str = "format_csv";
pub const FORMAT_ALL: &str = "format_all";

fn btn(text: &str, callback_data: &str) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.to_string(), callback_data.to_string())
}

pub fn start_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![btn("START", START_ANALYSIS)]])
}

pub fn format_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        btn("Text", FORMAT_TEXT),
        btn("CSV", FORMAT_CSV),
        btn("Text + CSV", FORMAT_ALL),
    ]])
}

/// Output format selected by a format button
pub fn parse_format(data: &str) -> Option<OutputFormat> {
    match data {
        FORMAT_TEXT => Some(OutputFormat::Text),
        FORMAT_CSV => Some(OutputFormat::Csv),
        FORMAT_ALL => Some(OutputFormat::Both),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("format_text"), Some(OutputFormat::Text));
        assert_eq!(parse_format("format_csv"), Some(OutputFormat::Csv));
        assert_eq!(parse_format("format_all"), Some(OutputFormat::Both));
        assert_eq!(parse_format("start_analysis"), None);
    }

    #[test]
    fn test_format_menu_layout() {
        let menu = format_menu();
        assert_eq!(menu.inline_keyboard.len(), 1);
        let labels: Vec<&str> = menu.inline_keyboard[0]
            .iter()
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(labels, vec!["Text", "CSV", "Text + CSV"]);
    }
}
