//! Reading KEGG Orthology flat files and the KEGG release string
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::io::{read_required, require_dir, ReferenceError, RowParse};

/// What the KEGG KO database says about one KO
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KoReference {
    pub id: String,
    pub name: String,
    /// KEGG REACTION IDs from the `RN:` database link
    pub kegg_reaction_ids: Vec<String>,
    /// EC numbers from the `[EC:...]` block of the name
    pub ec_numbers: Vec<String>,
}

impl KoReference {
    pub fn has_aliases(&self) -> bool {
        !self.kegg_reaction_ids.is_empty() || !self.ec_numbers.is_empty()
    }
}

/// Parse the entries of a KEGG KO flat file
///
/// A file may contain several entries separated by `///`. Entries without an `ENTRY` line
/// are returned as [`RowParse::Malformed`].
///
/// # Examples
/// ```rust
/// use kornet_core::io::kegg::parse_ko_entries;
/// use kornet_core::io::RowParse;
/// let text = "ENTRY       K01507                      KO\n\
///             DEFINITION  inorganic pyrophosphatase [EC:3.6.1.1]\n\
///             DBLINKS     RN: R00004\n\
///             ///\n";
/// match &parse_ko_entries(text)[0] {
///     RowParse::Row(ko) => assert_eq!(ko.kegg_reaction_ids, vec!["R00004"]),
///     RowParse::Malformed(_) => panic!("Failed to parse KO entry"),
/// }
/// ```
pub fn parse_ko_entries(text: &str) -> Vec<RowParse<KoReference>> {
    let mut entries = Vec::new();
    let mut fields: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        if line.starts_with("///") {
            if !fields.is_empty() {
                entries.push(ko_from_fields(&fields));
            }
            fields.clear();
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            // Continuation of the previous field
            match fields.last_mut() {
                Some((_, value)) => {
                    value.push('\n');
                    value.push_str(line.trim());
                }
                None => entries.push(RowParse::Malformed(format!(
                    "continuation line before any field: {:?}",
                    line
                ))),
            }
            continue;
        }
        let (key, value) = match line.split_once(char::is_whitespace) {
            Some((k, v)) => (k, v.trim()),
            None => (line, ""),
        };
        fields.push((key.to_string(), value.to_string()));
    }
    if !fields.is_empty() {
        entries.push(ko_from_fields(&fields));
    }
    entries
}

fn ko_from_fields(fields: &[(String, String)]) -> RowParse<KoReference> {
    let field = |key: &str| {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let Some(id) = field("ENTRY").and_then(|v| v.split_whitespace().next()) else {
        return RowParse::Malformed("KO entry without an ENTRY line".to_string());
    };
    let definition = field("DEFINITION").or_else(|| field("NAME")).unwrap_or("");

    let mut ec_numbers = Vec::new();
    for text in [field("NAME"), field("DEFINITION")].into_iter().flatten() {
        for ec in ec_numbers_in(text) {
            if !ec_numbers.contains(&ec) {
                ec_numbers.push(ec);
            }
        }
    }

    let mut kegg_reaction_ids = Vec::new();
    if let Some(links) = field("DBLINKS") {
        for link in links.lines() {
            if let Some(("RN", ids)) = link.split_once(':').map(|(db, ids)| (db.trim(), ids)) {
                kegg_reaction_ids.extend(ids.split_whitespace().map(str::to_string));
            }
        }
    }

    RowParse::Row(KoReference {
        id: id.to_string(),
        name: definition.replace('\n', " "),
        kegg_reaction_ids,
        ec_numbers,
    })
}

/// EC numbers in the `[EC:1.1.1.1 1.1.1.2]` blocks of a KEGG name
fn ec_numbers_in(text: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("[EC:") {
        let after = &rest[start + 4..];
        let Some(end) = after.find(']') else {
            break;
        };
        numbers.extend(after[..end].split_whitespace().map(str::to_string));
        rest = &after[end + 1..];
    }
    numbers
}

/// Read every KO flat file in a directory
///
/// Files are read in name order. Returns the KOs by ID and the number of malformed entries
/// that were skipped.
pub fn read_ko_directory(
    ko_dir: &Path,
) -> Result<(IndexMap<String, KoReference>, usize), ReferenceError> {
    require_dir("KEGG KO", ko_dir)?;
    let mut paths: Vec<_> = fs::read_dir(ko_dir)
        .map_err(|source| ReferenceError::Io {
            path: ko_dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut kos: IndexMap<String, KoReference> = IndexMap::new();
    let mut malformed = 0;
    for path in paths {
        let text = read_required(&path)?;
        for entry in parse_ko_entries(&text) {
            match entry {
                RowParse::Row(ko) => {
                    if kos.contains_key(&ko.id) {
                        warn!(ko = %ko.id, file = %path.display(), "duplicate KO entry ignored");
                        continue;
                    }
                    kos.insert(ko.id.clone(), ko);
                }
                RowParse::Malformed(reason) => {
                    debug!(file = %path.display(), %reason, "skipping malformed KO entry");
                    malformed += 1;
                }
            }
        }
    }
    Ok((kos, malformed))
}

/// Read the KEGG release from the output of the KEGG `info` operation
///
/// The release is the text after `Release ` on the first line containing it, e.g.
/// `108.0+/11-04, Nov 23` from `ko               Release 108.0+/11-04, Nov 23`.
pub fn read_kegg_release(info_path: &Path) -> Result<String, ReferenceError> {
    let text = read_required(info_path)?;
    text.lines()
        .find_map(|line| {
            line.split_once("Release ")
                .map(|(_, release)| release.trim().to_string())
        })
        .filter(|release| !release.is_empty())
        .ok_or_else(|| ReferenceError::MissingRelease(info_path.to_path_buf()))
}
