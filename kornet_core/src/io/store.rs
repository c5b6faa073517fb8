//! Interfaces to the stores that supply annotations and keep finished networks
//!
//! A store is anything that can list gene-KO annotations for a dataset and hold one reaction
//! network made from them, such as a contigs or pan database. [`MemoryStore`] implements both
//! sides in memory.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::entity::KoAnnotation;
use crate::network::model::ReactionNetwork;

/// Values stored alongside a network, used to decide whether it is out of date
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMetadata {
    /// Fingerprint of the annotations the network was made from
    pub annotation_fingerprint: String,
    pub kegg_release: String,
    /// ModelSEED Biochemistry commit or content hash
    pub modelseed_sha: String,
}

/// One row of a stored reactions table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactionTableRow {
    pub modelseed_reaction_id: String,
    pub modelseed_reaction_name: Option<String>,
    /// Space separated compound IDs
    pub metabolite_modelseed_ids: String,
    /// Space separated integer coefficients
    pub stoichiometry: String,
    /// Space separated compartment tags
    pub compartments: String,
    pub reversibility: bool,
    /// Which KOs reached the reaction by which KEGG REACTION IDs,
    /// e.g. `K00001: (R00001, R00002); K00002: (R00001)`
    pub ko_kegg_reaction_source: String,
    /// Which KOs reached the reaction by which EC numbers
    pub ko_ec_number_source: String,
}

/// One row of a stored metabolites table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetaboliteTableRow {
    pub modelseed_compound_id: String,
    pub modelseed_compound_name: Option<String>,
    pub formula: Option<String>,
    pub charge: Option<i32>,
}

/// Supplies the gene-KO annotations of a dataset
pub trait AnnotationSource {
    fn ko_annotations(&self) -> Result<Vec<KoAnnotation>, StoreError>;
}

/// Holds at most one stored reaction network
pub trait NetworkStore {
    fn network_exists(&self) -> bool;
    fn stored_metadata(&self) -> Option<NetworkMetadata>;
    fn remove_network(&mut self) -> Result<(), StoreError>;
    /// Store a network, replacing any network already held in the same step
    ///
    /// On error the previously stored network, if any, must be left untouched.
    fn store_network(
        &mut self,
        reactions: Vec<ReactionTableRow>,
        metabolites: Vec<MetaboliteTableRow>,
        metadata: NetworkMetadata,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unable to read annotations: {0}")]
    UnableToRead(String),
    #[error("Unable to write network: {0}")]
    UnableToWrite(String),
}

/// An in-memory annotation source and network store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub annotations: Vec<KoAnnotation>,
    pub reactions: Vec<ReactionTableRow>,
    pub metabolites: Vec<MetaboliteTableRow>,
    pub metadata: Option<NetworkMetadata>,
}

impl MemoryStore {
    pub fn new(annotations: Vec<KoAnnotation>) -> Self {
        MemoryStore {
            annotations,
            ..Default::default()
        }
    }
}

impl AnnotationSource for MemoryStore {
    fn ko_annotations(&self) -> Result<Vec<KoAnnotation>, StoreError> {
        Ok(self.annotations.clone())
    }
}

impl NetworkStore for MemoryStore {
    fn network_exists(&self) -> bool {
        self.metadata.is_some()
    }

    fn stored_metadata(&self) -> Option<NetworkMetadata> {
        self.metadata.clone()
    }

    fn remove_network(&mut self) -> Result<(), StoreError> {
        self.reactions.clear();
        self.metabolites.clear();
        self.metadata = None;
        Ok(())
    }

    fn store_network(
        &mut self,
        reactions: Vec<ReactionTableRow>,
        metabolites: Vec<MetaboliteTableRow>,
        metadata: NetworkMetadata,
    ) -> Result<(), StoreError> {
        self.reactions = reactions;
        self.metabolites = metabolites;
        self.metadata = Some(metadata);
        Ok(())
    }
}

fn join<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render `{KO: [aliases]}` as `K00001: (R00001, R00002); K00002: (R00001)`
fn render_sources(sources: &IndexMap<&str, &Vec<String>>) -> String {
    sources
        .iter()
        .filter(|(_, aliases)| !aliases.is_empty())
        .map(|(ko, aliases)| format!("{}: ({})", ko, aliases.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ReactionNetwork {
    /// Rows of the reactions table for storing the network
    pub fn reaction_table(&self) -> Vec<ReactionTableRow> {
        // Reaction id -> KO id -> aliases, gathered in one pass over the KOs
        let mut kegg_sources: IndexMap<&str, IndexMap<&str, &Vec<String>>> = IndexMap::new();
        let mut ec_sources: IndexMap<&str, IndexMap<&str, &Vec<String>>> = IndexMap::new();
        for ko in self.kos.values() {
            for (reaction_id, aliases) in &ko.kegg_reaction_aliases {
                kegg_sources
                    .entry(reaction_id.as_str())
                    .or_default()
                    .insert(ko.id.as_str(), aliases);
            }
            for (reaction_id, aliases) in &ko.ec_number_aliases {
                ec_sources
                    .entry(reaction_id.as_str())
                    .or_default()
                    .insert(ko.id.as_str(), aliases);
            }
        }
        let empty = IndexMap::new();
        self.reactions
            .values()
            .map(|reaction| ReactionTableRow {
                modelseed_reaction_id: reaction.id.clone(),
                modelseed_reaction_name: reaction.name.clone(),
                metabolite_modelseed_ids: reaction.compound_ids.join(" "),
                stoichiometry: join(&reaction.coefficients),
                compartments: join(&reaction.compartments),
                reversibility: reaction.reversible,
                ko_kegg_reaction_source: render_sources(
                    kegg_sources.get(reaction.id.as_str()).unwrap_or(&empty),
                ),
                ko_ec_number_source: render_sources(
                    ec_sources.get(reaction.id.as_str()).unwrap_or(&empty),
                ),
            })
            .collect()
    }

    /// Rows of the metabolites table for storing the network
    pub fn metabolite_table(&self) -> Vec<MetaboliteTableRow> {
        self.metabolites
            .values()
            .map(|compound| MetaboliteTableRow {
                modelseed_compound_id: compound.id.clone(),
                modelseed_compound_name: compound.name.clone(),
                formula: compound.formula.clone(),
                charge: compound.charge,
            })
            .collect()
    }
}
