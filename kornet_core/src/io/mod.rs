//! Module for reading reference databases and exchanging networks with other tools
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod json;
pub mod kegg;
pub mod modelseed;
pub mod store;

/// Outcome of parsing a single reference row
///
/// Rows that can't be read are not fatal; they are skipped and counted by the loader.
#[derive(Clone, Debug, PartialEq)]
pub enum RowParse<T> {
    Row(T),
    Malformed(String),
}

/// Errors raised while loading reference data
///
/// All of these are fatal: a network can't be built on top of missing or internally
/// inconsistent reference data.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("'{database}' database files were expected but not found in the directory '{path}'")]
    MissingDirectory { database: String, path: PathBuf },
    #[error("Required reference file '{0}' was not found")]
    MissingFile(PathBuf),
    #[error("Reference file '{file}' has no '{column}' column")]
    MissingColumn { file: String, column: String },
    #[error("Line {line} of '{file}' is missing the required field '{field}'")]
    MissingField {
        file: String,
        line: usize,
        field: String,
    },
    #[error("Line {line} of '{file}' has an invalid value {value:?} in field '{field}'")]
    InvalidField {
        file: String,
        line: usize,
        field: String,
        value: String,
    },
    #[error("No KEGG release could be found in '{0}'")]
    MissingRelease(PathBuf),
    #[error("Unable to read reference file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Check that a reference directory exists
pub(crate) fn require_dir(database: &str, path: &Path) -> Result<(), ReferenceError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ReferenceError::MissingDirectory {
            database: database.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Read a required reference file to a string
pub(crate) fn read_required(path: &Path) -> Result<String, ReferenceError> {
    if !path.is_file() {
        return Err(ReferenceError::MissingFile(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Column positions of a tab separated reference table
pub(crate) struct TsvHeader {
    file: String,
    columns: Vec<String>,
}

impl TsvHeader {
    /// Read the header line, checking that every required column is present
    pub(crate) fn new(file: &str, line: &str, required: &[&str]) -> Result<TsvHeader, ReferenceError> {
        let columns: Vec<String> = line.split('\t').map(|c| c.trim().to_string()).collect();
        for column in required {
            if !columns.iter().any(|c| c == column) {
                return Err(ReferenceError::MissingColumn {
                    file: file.to_string(),
                    column: column.to_string(),
                });
            }
        }
        Ok(TsvHeader {
            file: file.to_string(),
            columns,
        })
    }

    pub(crate) fn file(&self) -> &str {
        &self.file
    }

    pub(crate) fn len(&self) -> usize {
        self.columns.len()
    }

    /// Value of a column in a row, None when empty or a null marker
    pub(crate) fn get<'a>(&self, fields: &[&'a str], column: &str) -> Option<&'a str> {
        let position = self.columns.iter().position(|c| c == column)?;
        let value = fields.get(position)?.trim();
        match value {
            "" | "null" | "NULL" | "none" | "None" | "NA" => None,
            v => Some(v),
        }
    }

    /// Value of a column that every row must have
    pub(crate) fn require<'a>(
        &self,
        fields: &[&'a str],
        column: &str,
        line: usize,
    ) -> Result<&'a str, ReferenceError> {
        self.get(fields, column)
            .ok_or_else(|| ReferenceError::MissingField {
                file: self.file.clone(),
                line,
                field: column.to_string(),
            })
    }
}

/// Values stored under one database key in a ModelSEED aliases field
///
/// ModelSEED aliases look like `AraCyc: X|BiGG: IPP1; PPA|KEGG: R00004`, so
/// `database_aliases(field, "KEGG")` returns `["R00004"]`.
pub(crate) fn database_aliases(field: Option<&str>, database: &str) -> Vec<String> {
    let Some(field) = field else {
        return Vec::new();
    };
    field
        .split('|')
        .filter_map(|segment| segment.split_once(':'))
        .filter(|(key, _)| key.trim() == database)
        .flat_map(|(_, values)| values.split(';'))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_columns() {
        let header = TsvHeader::new("t.tsv", "id\tname\tcharge", &["id", "charge"]).unwrap();
        let fields = vec!["cpd00001", "null", "0"];
        assert_eq!(header.get(&fields, "id"), Some("cpd00001"));
        assert_eq!(header.get(&fields, "name"), None);
        assert_eq!(header.get(&fields, "formula"), None);
        assert!(header.require(&fields, "name", 2).is_err());
        assert!(matches!(
            TsvHeader::new("t.tsv", "id\tname", &["id", "charge"]),
            Err(ReferenceError::MissingColumn { .. })
        ));
    }

    #[test]
    fn aliases_by_database() {
        let field = "AraCyc: INORGPYROPHOSPHAT-RXN|BiGG: IPP1; PPA; PPA_1|KEGG: R00004; R12345|MetaCyc: X";
        assert_eq!(database_aliases(Some(field), "KEGG"), vec!["R00004", "R12345"]);
        assert_eq!(database_aliases(Some(field), "BiGG"), vec!["IPP1", "PPA", "PPA_1"]);
        assert!(database_aliases(Some(field), "Rhea").is_empty());
        assert!(database_aliases(None, "KEGG").is_empty());
    }
}
