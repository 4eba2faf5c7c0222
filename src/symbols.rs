use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use error_stack::{Report, ResultExt, bail};
use serde::Deserialize;
use tracing::info;

use crate::error::SymbolError;

/// One row of the symbol table file.
#[derive(Debug, Deserialize)]
struct SymbolRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Symbol")]
    symbol: String,
}

/// Static company-name to ticker lookup table.
///
/// Loaded once at startup from a CSV file with at least `Name` and `Symbol`
/// columns, deduplicated by name (first occurrence wins), read-only
/// afterwards. File order is preserved for the picker list.
#[derive(Debug)]
pub struct SymbolTable {
    names: Vec<String>,
    tickers: HashMap<String, String>,
}

impl SymbolTable {
    pub fn load(path: &Path) -> Result<Self, Report<SymbolError>> {
        let file = std::fs::File::open(path)
            .change_context(SymbolError::ReadTable)
            .attach_with(|| format!("path: {}", path.display()))?;
        let table = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            companies = table.names.len(),
            "symbol table loaded"
        );
        Ok(table)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, Report<SymbolError>> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut names = Vec::new();
        let mut tickers = HashMap::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let record: SymbolRecord =
                result.change_context(SymbolError::ParseRecord { record: index + 1 })?;
            let name = record.name.trim();
            let symbol = record.symbol.trim();
            if name.is_empty() || symbol.is_empty() {
                continue;
            }
            // First occurrence wins on duplicate names
            if tickers.contains_key(name) {
                continue;
            }
            names.push(name.to_owned());
            tickers.insert(name.to_owned(), symbol.to_owned());
        }

        if names.is_empty() {
            bail!(SymbolError::EmptyTable);
        }

        Ok(Self { names, tickers })
    }

    /// Resolve a company name to its ticker symbol.
    pub fn resolve(&self, name: &str) -> Result<&str, Report<SymbolError>> {
        self.tickers
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| {
                Report::new(SymbolError::NotFound {
                    name: name.to_owned(),
                })
            })
    }

    /// Company names in file order, for the picker.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
