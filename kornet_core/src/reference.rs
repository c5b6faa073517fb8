//! Lookup tables linking KOs to ModelSEED reactions and compounds
//!
//! The tables are built once from a KEGG and a ModelSEED release and never change afterwards,
//! so one set of tables can be shared by any number of network builds.
use std::path::Path;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::configuration::Configuration;
use crate::io::kegg::{read_kegg_release, read_ko_directory, KoReference};
use crate::io::modelseed::{read_modelseed_directory, CompoundRow, ReactionRow};
use crate::io::ReferenceError;
use crate::network::model::AliasKind;

/// Name of the KO flat file directory within the KEGG data directory
pub const KO_SUBDIR: &str = "ko";
/// Name of the KEGG `info` output within the KEGG data directory
pub const KO_INFO_FILE: &str = "ko_info.txt";

/// Read-only reference data used to resolve KOs into reactions and compounds
#[derive(Clone, Debug, Default)]
pub struct AliasTables {
    kos: IndexMap<String, KoReference>,
    reactions: IndexMap<String, ReactionRow>,
    /// KEGG REACTION ID -> positions in `reactions`, one entry per alias of each row
    kegg_reaction_lookup: IndexMap<String, Vec<usize>>,
    /// EC number -> positions in `reactions`, one entry per alias of each row
    ec_number_lookup: IndexMap<String, Vec<usize>>,
    compounds: IndexMap<String, CompoundRow>,
    kegg_release: String,
    modelseed_sha: String,
    /// Reference rows skipped as malformed while loading
    pub skipped_rows: usize,
}

impl AliasTables {
    /// Load the tables from a KEGG data directory and a ModelSEED Biochemistry directory
    ///
    /// The KEGG directory must contain a `ko` directory of KO flat files and `ko_info.txt`; the
    /// ModelSEED directory must contain `reactions.tsv` and `compounds.tsv`.
    pub fn load(kegg_dir: &Path, modelseed_dir: &Path) -> Result<AliasTables, ReferenceError> {
        crate::io::require_dir("KEGG", kegg_dir)?;
        let (kos, malformed_kos) = read_ko_directory(&kegg_dir.join(KO_SUBDIR))?;
        let kegg_release = read_kegg_release(&kegg_dir.join(KO_INFO_FILE))?;
        let modelseed = read_modelseed_directory(modelseed_dir)?;

        let mut tables = AliasTables::from_parts(
            kos.into_values(),
            modelseed.reactions,
            modelseed.compounds,
            &kegg_release,
            &modelseed.sha,
        );
        tables.skipped_rows =
            malformed_kos + modelseed.malformed_reactions + modelseed.malformed_compounds;
        if tables.skipped_rows > 0 {
            warn!(
                skipped = tables.skipped_rows,
                "malformed reference rows were skipped"
            );
        }
        info!(
            kos = tables.kos.len(),
            reactions = tables.reactions.len(),
            compounds = tables.compounds.len(),
            kegg_release = %tables.kegg_release,
            modelseed_sha = %tables.modelseed_sha,
            "loaded reference tables"
        );
        Ok(tables)
    }

    /// Load the tables from the directories named in a configuration
    pub fn load_from_configuration(config: &Configuration) -> Result<AliasTables, ReferenceError> {
        AliasTables::load(&config.kegg_dir, &config.modelseed_dir)
    }

    /// Assemble tables from already parsed reference rows
    ///
    /// Later rows with an id already seen are ignored.
    pub fn from_parts<K, R, C>(
        kos: K,
        reactions: R,
        compounds: C,
        kegg_release: &str,
        modelseed_sha: &str,
    ) -> AliasTables
    where
        K: IntoIterator<Item = KoReference>,
        R: IntoIterator<Item = ReactionRow>,
        C: IntoIterator<Item = CompoundRow>,
    {
        let mut tables = AliasTables {
            kegg_release: kegg_release.to_string(),
            modelseed_sha: modelseed_sha.to_string(),
            ..Default::default()
        };
        for ko in kos {
            if tables.kos.contains_key(&ko.id) {
                warn!(ko = %ko.id, "duplicate KEGG KO ignored");
                continue;
            }
            tables.kos.insert(ko.id.clone(), ko);
        }
        for row in reactions {
            if tables.reactions.contains_key(&row.id) {
                warn!(reaction = %row.id, "duplicate ModelSEED reaction ignored");
                continue;
            }
            let position = tables.reactions.len();
            for alias in &row.kegg_aliases {
                push_unique(tables.kegg_reaction_lookup.entry(alias.clone()).or_default(), position);
            }
            for alias in &row.ec_numbers {
                push_unique(tables.ec_number_lookup.entry(alias.clone()).or_default(), position);
            }
            tables.reactions.insert(row.id.clone(), row);
        }
        for row in compounds {
            if tables.compounds.contains_key(&row.id) {
                warn!(compound = %row.id, "duplicate ModelSEED compound ignored");
                continue;
            }
            tables.compounds.insert(row.id.clone(), row);
        }
        tables
    }

    /// KEGG KO entry for a KO ID
    pub fn ko(&self, ko_id: &str) -> Option<&KoReference> {
        self.kos.get(ko_id)
    }

    /// Aliases of a KO of one kind; empty when the KO or its aliases are unknown
    pub fn ko_aliases(&self, ko_id: &str, kind: AliasKind) -> &[String] {
        match (self.kos.get(ko_id), kind) {
            (Some(ko), AliasKind::KeggReaction) => &ko.kegg_reaction_ids,
            (Some(ko), AliasKind::EcNumber) => &ko.ec_numbers,
            (None, _) => &[],
        }
    }

    /// ModelSEED reaction rows aliased by a KEGG REACTION ID or EC number
    pub fn reactions_for_alias(&self, kind: AliasKind, alias: &str) -> Vec<&ReactionRow> {
        let lookup = match kind {
            AliasKind::KeggReaction => &self.kegg_reaction_lookup,
            AliasKind::EcNumber => &self.ec_number_lookup,
        };
        lookup
            .get(alias)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|p| self.reactions.get_index(*p).map(|(_, row)| row))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// ModelSEED reaction row by reaction ID
    pub fn reaction(&self, reaction_id: &str) -> Option<&ReactionRow> {
        self.reactions.get(reaction_id)
    }

    /// ModelSEED compound row by compound ID
    pub fn compound(&self, compound_id: &str) -> Option<&CompoundRow> {
        self.compounds.get(compound_id)
    }

    pub fn kegg_release(&self) -> &str {
        &self.kegg_release
    }

    pub fn modelseed_sha(&self) -> &str {
        &self.modelseed_sha
    }

    pub fn ko_count(&self) -> usize {
        self.kos.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    pub fn compound_count(&self) -> usize {
        self.compounds.len()
    }
}

fn push_unique(positions: &mut Vec<usize>, position: usize) {
    if !positions.contains(&position) {
        positions.push(position);
    }
}

#[cfg(test)]
pub(crate) mod test_tables {
    //! Small reference tables shared by the tests of several modules
    use super::*;
    use crate::stoichiometry::DirectionCode;

    pub(crate) fn ko(id: &str, kegg: &[&str], ec: &[&str]) -> KoReference {
        KoReference {
            id: id.to_string(),
            name: format!("{} name", id),
            kegg_reaction_ids: kegg.iter().map(|s| s.to_string()).collect(),
            ec_numbers: ec.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub(crate) fn reaction(
        id: &str,
        kegg: &[&str],
        ec: &[&str],
        stoichiometry: Option<&str>,
        direction: DirectionCode,
        reversibility: DirectionCode,
    ) -> ReactionRow {
        ReactionRow {
            id: id.to_string(),
            name: Some(format!("{} name", id)),
            stoichiometry: stoichiometry.map(str::to_string),
            reversibility,
            direction,
            kegg_aliases: kegg.iter().map(|s| s.to_string()).collect(),
            ec_numbers: ec.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub(crate) fn compound(id: &str) -> CompoundRow {
        CompoundRow {
            id: id.to_string(),
            name: Some(format!("{} name", id)),
            formula: Some("H2O".to_string()),
            charge: Some(0),
            kegg_aliases: vec![],
        }
    }

    /// Tables exercising every alias resolution path of the builder
    ///
    /// - K00001 and K00002 both reach rxn00001, by KEGG REACTION ID and by EC number.
    /// - K00003 has aliases that reach no reaction with a stoichiometry.
    /// - K00004 has no aliases at all.
    /// - K00005 reaches rxn00003 through both an unseen KEGG ID and an unseen EC number.
    /// - K00006 reaches rxn00004, and K00007 reaches it again through an alias K00006 lacked.
    pub(crate) fn tables() -> AliasTables {
        use DirectionCode::{Backward, Forward, Reversible, Unknown};
        AliasTables::from_parts(
            vec![
                ko("K00001", &["R00001"], &[]),
                ko("K00002", &["R99999"], &["1.1.1.1"]),
                ko("K00003", &["R00002"], &["9.9.9.9"]),
                ko("K00004", &[], &[]),
                ko("K00005", &["R00003"], &["2.7.1.1"]),
                ko("K00006", &["R00004"], &[]),
                ko("K00007", &["R00004", "R00005"], &["3.1.1.1"]),
            ],
            vec![
                reaction(
                    "rxn00001",
                    &["R00001"],
                    &["1.1.1.1", "1.1.1.2"],
                    Some("-1:cpd00001:0;1:cpd00002:0;1:cpd00003:1"),
                    Forward,
                    Backward,
                ),
                reaction("rxn00002", &["R00002"], &["9.9.9.9"], None, Forward, Forward),
                reaction(
                    "rxn00003",
                    &["R00003"],
                    &["2.7.1.1"],
                    Some("-0.5:cpd00002:0;1:cpd00004:0"),
                    Forward,
                    Reversible,
                ),
                reaction(
                    "rxn00004",
                    &["R00004", "R00005"],
                    &[],
                    Some("-1:cpd00004:0;1:cpd00005:1"),
                    Backward,
                    Unknown,
                ),
            ],
            ["cpd00001", "cpd00002", "cpd00003", "cpd00004", "cpd00005"]
                .into_iter()
                .map(compound),
            "108.0+/11-04, Nov 23",
            "0f5b0d3c",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_tables::*;
    use super::*;
    use std::fs;

    #[test]
    fn alias_lookup() {
        let tables = tables();
        let ids = |kind, alias| -> Vec<String> {
            tables
                .reactions_for_alias(kind, alias)
                .iter()
                .map(|r| r.id.clone())
                .collect()
        };
        assert_eq!(ids(AliasKind::KeggReaction, "R00001"), vec!["rxn00001"]);
        assert_eq!(ids(AliasKind::EcNumber, "1.1.1.2"), vec!["rxn00001"]);
        assert_eq!(ids(AliasKind::KeggReaction, "R00005"), vec!["rxn00004"]);
        assert!(ids(AliasKind::KeggReaction, "R99999").is_empty());
        assert_eq!(
            tables.ko_aliases("K00002", AliasKind::EcNumber),
            &["1.1.1.1".to_string()]
        );
        assert!(tables.ko_aliases("K99999", AliasKind::EcNumber).is_empty());
        assert_eq!(tables.kegg_release(), "108.0+/11-04, Nov 23");
        assert_eq!(tables.reaction_count(), 4);
        assert_eq!(tables.compound_count(), 5);
    }

    #[test]
    fn duplicate_rows_keep_the_first() {
        use crate::stoichiometry::DirectionCode::Forward;
        let mut second_compound = compound("cpd00001");
        second_compound.name = Some("later".to_string());
        let tables = AliasTables::from_parts(
            vec![ko("K00001", &["R00001"], &[]), ko("K00001", &["R00002"], &[])],
            vec![
                reaction("rxn00001", &["R00001"], &[], None, Forward, Forward),
                reaction("rxn00001", &["R00002"], &[], None, Forward, Forward),
            ],
            vec![compound("cpd00001"), second_compound],
            "108.0",
            "abc",
        );
        assert_eq!(tables.ko_count(), 1);
        assert_eq!(
            tables.ko_aliases("K00001", AliasKind::KeggReaction),
            &["R00001".to_string()]
        );
        assert_eq!(tables.reaction_count(), 1);
        assert!(tables
            .reactions_for_alias(AliasKind::KeggReaction, "R00002")
            .is_empty());
        assert_eq!(tables.compound_count(), 1);
        assert_eq!(
            tables.compound("cpd00001").unwrap().name.as_deref(),
            Some("cpd00001 name")
        );
    }

    #[test]
    fn load_from_directories() {
        let dir = tempfile::tempdir().unwrap();
        let kegg_dir = dir.path().join("KEGG");
        let modelseed_dir = dir.path().join("ModelSEED");
        assert!(matches!(
            AliasTables::load(&kegg_dir, &modelseed_dir),
            Err(ReferenceError::MissingDirectory { .. })
        ));

        fs::create_dir_all(kegg_dir.join(KO_SUBDIR)).unwrap();
        fs::create_dir_all(&modelseed_dir).unwrap();
        fs::write(
            kegg_dir.join(KO_SUBDIR).join("K01507"),
            "ENTRY       K01507                      KO\n\
             NAME        inorganic pyrophosphatase [EC:3.6.1.1]\n\
             DBLINKS     RN: R00004\n\
             ///\n",
        )
        .unwrap();
        fs::write(
            kegg_dir.join(KO_INFO_FILE),
            "ko               Release 108.0+/11-04, Nov 23\n",
        )
        .unwrap();
        fs::write(
            modelseed_dir.join("reactions.tsv"),
            "id\tname\tstoichiometry\treversibility\tdirection\taliases\tec_numbers\n\
             rxn00001\tpyrophosphatase\t-1:cpd00001:0;-1:cpd00012:0;2:cpd00009:0\t>\t>\tKEGG: R00004\t3.6.1.1\n",
        )
        .unwrap();
        fs::write(
            modelseed_dir.join("compounds.tsv"),
            "id\tname\tformula\tcharge\taliases\n\
             cpd00001\tH2O\tH2O\t0\tKEGG: C00001\n\
             cpd00012\tPPi\tHO7P2\t-3\tKEGG: C00013\n\
             cpd00009\tPhosphate\tHO4P\t-2\tKEGG: C00009\n",
        )
        .unwrap();

        let tables = AliasTables::load(&kegg_dir, &modelseed_dir).unwrap();
        assert_eq!(tables.ko_count(), 1);
        assert_eq!(tables.ko("K01507").unwrap().ec_numbers, vec!["3.6.1.1"]);
        assert_eq!(
            tables.reactions_for_alias(AliasKind::KeggReaction, "R00004")[0].id,
            "rxn00001"
        );
        assert_eq!(tables.compound("cpd00012").unwrap().charge, Some(-3));
        assert_eq!(tables.kegg_release(), "108.0+/11-04, Nov 23");
        assert_eq!(tables.modelseed_sha().len(), 64);
        assert_eq!(tables.skipped_rows, 0);
    }
}
