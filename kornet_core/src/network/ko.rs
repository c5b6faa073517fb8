//! This module provides the Ko struct, representing a KEGG Ortholog in the network
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A KEGG Ortholog and the reactions it was linked to
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ko {
    /// KO ID, e.g. `K00001`
    pub id: String,
    /// Display name, e.g. `alcohol dehydrogenase [EC:1.1.1.1]`
    pub name: String,
    /// Keys into [`crate::network::model::ReactionNetwork::reactions`]
    pub reaction_ids: IndexSet<String>,
    /// For each linked reaction, the KO's KEGG REACTION aliases that the reaction shares
    pub kegg_reaction_aliases: IndexMap<String, Vec<String>>,
    /// For each linked reaction, the KO's EC number aliases that the reaction shares
    pub ec_number_aliases: IndexMap<String, Vec<String>>,
}

impl Ko {
    pub fn new(id: &str, name: &str) -> Ko {
        Ko {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Link a reaction to the KO, recording which of the KO's aliases it was reached by
    ///
    /// Linking the same reaction twice is a no-op.
    pub fn link_reaction(
        &mut self,
        reaction_id: &str,
        kegg_reaction_aliases: Vec<String>,
        ec_number_aliases: Vec<String>,
    ) {
        if !self.reaction_ids.insert(reaction_id.to_string()) {
            return;
        }
        self.kegg_reaction_aliases
            .insert(reaction_id.to_string(), kegg_reaction_aliases);
        self.ec_number_aliases
            .insert(reaction_id.to_string(), ec_number_aliases);
    }

    /// Whether the KO is linked to any reaction
    pub fn contributes_reactions(&self) -> bool {
        !self.reaction_ids.is_empty()
    }
}
