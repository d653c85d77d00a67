use std::collections::HashSet;
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::{MetricsError, MetricsResult};

const ADDRESS_COLUMN: &str = "address";

/// Wallets listed in the kelsier addresses CSV
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    addresses: HashSet<String>,
}

impl Blacklist {
    /// Load the list from a CSV file with an `address` column.
    ///
    /// Never fails: a missing or unreadable file yields an empty list.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            warn!("Blacklist file {} not found", path.display());
            return Self::default();
        }

        match Self::read(path) {
            Ok(list) => {
                info!("Loaded {} blacklisted addresses from {}", list.len(), path.display());
                list
            }
            Err(e) => {
                error!("Error loading blacklist: {}", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> MetricsResult<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let column = reader
            .headers()?
            .iter()
            .position(|header| header.trim() == ADDRESS_COLUMN)
            .ok_or_else(|| MetricsError::Config(format!("no '{}' column", ADDRESS_COLUMN)))?;

        let mut addresses = HashSet::new();
        for (line, row) in reader.records().enumerate() {
            let address = match row {
                Ok(record) => record.get(column).map(|a| a.trim().to_string()),
                Err(e) => {
                    warn!("Skipping blacklist row {}: {}", line + 2, e);
                    continue;
                }
            };
            match address {
                Some(address) if !address.is_empty() => {
                    addresses.insert(address);
                }
                _ => warn!("Skipping blacklist row {}: no address", line + 2),
            }
        }
        Ok(Self { addresses })
    }

    pub fn from_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            addresses: addresses
                .into_iter()
                .map(|a| a.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn contains(&self, wallet: &str) -> bool {
        self.addresses.contains(wallet)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_trims_addresses() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "address").unwrap();
        writeln!(file, "  wallet1  ").unwrap();
        writeln!(file, "wallet2").unwrap();

        let list = Blacklist::load(file.path());
        assert_eq!(list.len(), 2);
        assert!(list.contains("wallet1"));
        assert!(list.contains("wallet2"));
        assert!(!list.contains("wallet3"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let list = Blacklist::load(&dir.path().join("missing.csv"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_missing_column_is_empty() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "wallet,label").unwrap();
        writeln!(file, "wallet1,scam").unwrap();

        let list = Blacklist::load(file.path());
        assert!(list.is_empty());
    }

    #[test]
    fn test_ragged_rows_keep_the_rest() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "address,label").unwrap();
        writeln!(file, "wallet1,scam").unwrap();
        writeln!(file, "wallet2,scam,extra").unwrap();
        writeln!(file, "wallet3").unwrap();
        writeln!(file, ",orphan").unwrap();

        let list = Blacklist::load(file.path());
        assert_eq!(list.len(), 3);
        assert!(list.contains("wallet1"));
        assert!(list.contains("wallet2"));
        assert!(list.contains("wallet3"));
    }

    #[test]
    fn test_from_addresses() {
        let list = Blacklist::from_addresses(["a ", "b"]);
        assert!(list.contains("a"));
        assert!(list.contains("b"));
    }
}
