//! This module provides the ReactionNetwork struct, the KO, reaction and compound graph
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::network::compound::Compound;
use crate::network::ko::Ko;
use crate::network::reaction::Reaction;

/// Which kind of external identifier links a KO to a reaction
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum AliasKind {
    /// KEGG REACTION ID, e.g. `R00001`
    KeggReaction,
    /// EC number, e.g. `1.1.1.1`
    EcNumber,
}

impl Display for AliasKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AliasKind::KeggReaction => write!(f, "KEGG REACTION ID"),
            AliasKind::EcNumber => write!(f, "EC number"),
        }
    }
}

/// Represents a metabolic reaction network of KOs, reactions and compounds
///
/// Every object is owned by exactly one of the maps below and referred to elsewhere by its
/// ID only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionNetwork {
    /// Map of KO ids to KO objects
    pub kos: IndexMap<String, Ko>,
    /// Map of ModelSEED reaction ids to Reaction objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of ModelSEED compound ids to Compound objects
    pub metabolites: IndexMap<String, Compound>,
    /// Map of KEGG REACTION IDs to the ids of the reactions they alias in the network
    pub kegg_reaction_index: IndexMap<String, Vec<String>>,
    /// Map of EC numbers to the ids of the reactions they alias in the network
    pub ec_number_index: IndexMap<String, Vec<String>>,
}

impl ReactionNetwork {
    pub fn new_empty() -> Self {
        ReactionNetwork::default()
    }

    /// Add a KO to the network, replacing any KO with the same id
    pub fn add_ko(&mut self, ko: Ko) {
        let id = ko.id.clone();
        self.kos.insert(id, ko);
    }

    /// Add a reaction to the network
    ///
    /// # Examples
    /// ```rust
    /// use kornet_core::network::model::ReactionNetwork;
    /// use kornet_core::network::reaction::ReactionBuilder;
    /// let mut network = ReactionNetwork::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("rxn00001".to_string()).build().unwrap();
    /// network.add_reaction(new_reaction);
    /// assert!(network.reactions.contains_key("rxn00001"));
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a compound to the network
    pub fn add_compound(&mut self, compound: Compound) {
        let id = compound.id.clone();
        self.metabolites.insert(id, compound);
    }

    /// Reverse index for one kind of alias
    pub fn alias_index(&self, kind: AliasKind) -> &IndexMap<String, Vec<String>> {
        match kind {
            AliasKind::KeggReaction => &self.kegg_reaction_index,
            AliasKind::EcNumber => &self.ec_number_index,
        }
    }

    /// Record that `alias` resolves to the reaction `reaction_id`
    pub fn index_alias(&mut self, kind: AliasKind, alias: &str, reaction_id: &str) {
        let index = match kind {
            AliasKind::KeggReaction => &mut self.kegg_reaction_index,
            AliasKind::EcNumber => &mut self.ec_number_index,
        };
        let reaction_ids = index.entry(alias.to_string()).or_default();
        if !reaction_ids.iter().any(|id| id == reaction_id) {
            reaction_ids.push(reaction_id.to_string());
        }
    }

    /// Reactions linked to a KO, in the order they were linked
    pub fn reactions_of_ko(&self, ko_id: &str) -> Vec<&Reaction> {
        self.kos
            .get(ko_id)
            .map(|ko| {
                ko.reaction_ids
                    .iter()
                    .filter_map(|id| self.reactions.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// KOs linked to a reaction
    pub fn kos_of_reaction(&self, reaction_id: &str) -> Vec<&Ko> {
        self.kos
            .values()
            .filter(|ko| ko.reaction_ids.contains(reaction_id))
            .collect()
    }

    /// Compounds taking part in a reaction, parallel to the reaction's terms
    pub fn compounds_of_reaction(&self, reaction_id: &str) -> Vec<&Compound> {
        self.reactions
            .get(reaction_id)
            .map(|reaction| {
                reaction
                    .compound_ids
                    .iter()
                    .filter_map(|id| self.metabolites.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }
}
