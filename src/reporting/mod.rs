//! Text and CSV renderings of wallet metrics.

pub mod csv_report;
pub mod text;

pub use csv_report::{generate_filename, write_csv_report, CSV_HEADERS};
pub use text::{format_report, format_wallet_result};

/// Flag cell shared by both renderings
pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Which renderings a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Text,
    Both,
}

impl OutputFormat {
    pub fn includes_text(self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn includes_csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    /// Menu choice of the interactive prompt: 1 CSV, 2 text, 3 both
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(OutputFormat::Csv),
            "2" => Some(OutputFormat::Text),
            "3" => Some(OutputFormat::Both),
            _ => None,
        }
    }
}
