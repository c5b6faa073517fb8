//! Reading the ModelSEED Biochemistry reactions and compounds tables
use std::path::Path;

use tracing::debug;

use crate::io::{database_aliases, read_required, require_dir, ReferenceError, RowParse, TsvHeader};
use crate::stoichiometry::DirectionCode;
use crate::utils::hashing::sha256_hex;

pub const REACTIONS_FILE: &str = "reactions.tsv";
pub const COMPOUNDS_FILE: &str = "compounds.tsv";
pub const SHA_FILE: &str = "sha.txt";

const REACTION_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "stoichiometry",
    "reversibility",
    "direction",
    "aliases",
    "ec_numbers",
];
const COMPOUND_COLUMNS: [&str; 5] = ["id", "name", "formula", "charge", "aliases"];

/// A row of the ModelSEED reactions table
#[derive(Clone, Debug, PartialEq)]
pub struct ReactionRow {
    pub id: String,
    pub name: Option<String>,
    /// Raw stoichiometry, absent for reactions without one
    pub stoichiometry: Option<String>,
    pub reversibility: DirectionCode,
    pub direction: DirectionCode,
    /// KEGG REACTION IDs from the `KEGG:` aliases
    pub kegg_aliases: Vec<String>,
    pub ec_numbers: Vec<String>,
}

/// A row of the ModelSEED compounds table
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundRow {
    pub id: String,
    pub name: Option<String>,
    pub formula: Option<String>,
    /// Known only when the formula is known
    pub charge: Option<i32>,
    /// KEGG COMPOUND IDs from the `KEGG:` aliases
    pub kegg_aliases: Vec<String>,
}

/// Split the data lines of a table into fields, yielding 1-based line numbers
fn data_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.split('\t').collect()))
}

fn direction_field(
    header: &TsvHeader,
    fields: &[&str],
    column: &str,
    line: usize,
) -> Result<DirectionCode, ReferenceError> {
    let value = header.require(fields, column, line)?;
    DirectionCode::parse(value).ok_or_else(|| ReferenceError::InvalidField {
        file: header.file().to_string(),
        line,
        field: column.to_string(),
        value: value.to_string(),
    })
}

fn parse_reaction_row(
    header: &TsvHeader,
    fields: &[&str],
    line: usize,
) -> Result<RowParse<ReactionRow>, ReferenceError> {
    let id = header.require(fields, "id", line)?;
    let reversibility = direction_field(header, fields, "reversibility", line)?;
    let direction = direction_field(header, fields, "direction", line)?;
    if fields.len() < header.len() {
        return Ok(RowParse::Malformed(format!(
            "line {} has {} of {} fields",
            line,
            fields.len(),
            header.len()
        )));
    }
    let ec_numbers = header
        .get(fields, "ec_numbers")
        .map(|ecs| {
            ecs.split('|')
                .map(str::trim)
                .filter(|ec| !ec.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(RowParse::Row(ReactionRow {
        id: id.to_string(),
        name: header.get(fields, "name").map(str::to_string),
        stoichiometry: header.get(fields, "stoichiometry").map(str::to_string),
        reversibility,
        direction,
        kegg_aliases: database_aliases(header.get(fields, "aliases"), "KEGG"),
        ec_numbers,
    }))
}

fn parse_compound_row(
    header: &TsvHeader,
    fields: &[&str],
    line: usize,
) -> Result<RowParse<CompoundRow>, ReferenceError> {
    let id = header.require(fields, "id", line)?;
    if fields.len() < header.len() {
        return Ok(RowParse::Malformed(format!(
            "line {} has {} of {} fields",
            line,
            fields.len(),
            header.len()
        )));
    }
    let formula = header.get(fields, "formula").map(str::to_string);
    let charge = match (&formula, header.get(fields, "charge")) {
        (None, _) => None,
        (Some(_), Some(charge)) => match charge.parse::<i32>() {
            Ok(c) => Some(c),
            Err(_) => {
                return Ok(RowParse::Malformed(format!(
                    "line {} has an unreadable charge {:?}",
                    line, charge
                )))
            }
        },
        (Some(_), None) => {
            return Ok(RowParse::Malformed(format!(
                "line {} has a formula but no charge",
                line
            )))
        }
    };
    Ok(RowParse::Row(CompoundRow {
        id: id.to_string(),
        name: header.get(fields, "name").map(str::to_string),
        formula,
        charge,
        kegg_aliases: database_aliases(header.get(fields, "aliases"), "KEGG"),
    }))
}

/// Parse the text of a ModelSEED reactions table
///
/// Returns the rows and the number of malformed rows skipped. A row without an id,
/// reversibility or direction is a fatal error.
pub fn parse_reactions_tsv(text: &str) -> Result<(Vec<ReactionRow>, usize), ReferenceError> {
    let header = TsvHeader::new(REACTIONS_FILE, text.lines().next().unwrap_or(""), &REACTION_COLUMNS)?;
    let mut rows = Vec::new();
    let mut malformed = 0;
    for (line, fields) in data_lines(text) {
        match parse_reaction_row(&header, &fields, line)? {
            RowParse::Row(row) => rows.push(row),
            RowParse::Malformed(reason) => {
                debug!(%reason, "skipping malformed ModelSEED reaction");
                malformed += 1;
            }
        }
    }
    Ok((rows, malformed))
}

/// Parse the text of a ModelSEED compounds table
///
/// Returns the rows and the number of malformed rows skipped. A row without an id is a fatal
/// error.
pub fn parse_compounds_tsv(text: &str) -> Result<(Vec<CompoundRow>, usize), ReferenceError> {
    let header = TsvHeader::new(COMPOUNDS_FILE, text.lines().next().unwrap_or(""), &COMPOUND_COLUMNS)?;
    let mut rows = Vec::new();
    let mut malformed = 0;
    for (line, fields) in data_lines(text) {
        match parse_compound_row(&header, &fields, line)? {
            RowParse::Row(row) => rows.push(row),
            RowParse::Malformed(reason) => {
                debug!(%reason, "skipping malformed ModelSEED compound");
                malformed += 1;
            }
        }
    }
    Ok((rows, malformed))
}

/// Tables read from a ModelSEED Biochemistry directory
#[derive(Clone, Debug)]
pub struct ModelSeedTables {
    pub reactions: Vec<ReactionRow>,
    pub compounds: Vec<CompoundRow>,
    /// Git commit of the release, or a content hash of the two tables
    pub sha: String,
    pub malformed_reactions: usize,
    pub malformed_compounds: usize,
}

/// Read `reactions.tsv`, `compounds.tsv` and, if present, `sha.txt` from a directory
pub fn read_modelseed_directory(modelseed_dir: &Path) -> Result<ModelSeedTables, ReferenceError> {
    require_dir("ModelSEED Biochemistry", modelseed_dir)?;
    let reactions_text = read_required(&modelseed_dir.join(REACTIONS_FILE))?;
    let compounds_text = read_required(&modelseed_dir.join(COMPOUNDS_FILE))?;

    let sha_path = modelseed_dir.join(SHA_FILE);
    let sha = if sha_path.is_file() {
        read_required(&sha_path)?.trim().to_string()
    } else {
        String::new()
    };
    let sha = if sha.is_empty() {
        sha256_hex([reactions_text.as_bytes(), compounds_text.as_bytes()])
    } else {
        sha
    };

    let (reactions, malformed_reactions) = parse_reactions_tsv(&reactions_text)?;
    let (compounds, malformed_compounds) = parse_compounds_tsv(&compounds_text)?;
    Ok(ModelSeedTables {
        reactions,
        compounds,
        sha,
        malformed_reactions,
        malformed_compounds,
    })
}
