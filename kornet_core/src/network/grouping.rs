//! Networks of genes or gene clusters, and named bins of them
//!
//! The KO, reaction and compound graph is the same for genomes, metagenomes and pangenomes;
//! what differs is what the annotated entities are. An [`EntityNetwork`] pairs a
//! [`ReactionNetwork`] with the entities that reference its KOs by id.
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::entity::{Entity, EntityKind};
use crate::network::model::ReactionNetwork;
use crate::network::reaction::Reaction;

/// A named group of entities, e.g. a metagenome-assembled genome or a set of gene clusters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub name: String,
    /// Keys into [`EntityNetwork::entities`]
    pub entity_ids: IndexSet<String>,
}

/// A reaction network together with the genes or gene clusters annotated with its KOs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityNetwork {
    pub kind: EntityKind,
    pub network: ReactionNetwork,
    /// Map of entity ids to Entity objects
    pub entities: IndexMap<String, Entity>,
    /// Map of bin names to bins
    pub bins: IndexMap<String, Bin>,
}

impl EntityNetwork {
    pub fn new_empty(kind: EntityKind) -> Self {
        EntityNetwork {
            kind,
            network: ReactionNetwork::new_empty(),
            entities: IndexMap::new(),
            bins: IndexMap::new(),
        }
    }

    /// Group entities already in the network under a bin name
    pub fn add_bin<I, S>(&mut self, name: &str, entity_ids: I) -> Result<(), GroupingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.bins.contains_key(name) {
            return Err(GroupingError::DuplicateBin(name.to_string()));
        }
        let mut members = IndexSet::new();
        for id in entity_ids {
            let id = id.as_ref();
            if !self.entities.contains_key(id) {
                return Err(GroupingError::UnknownEntity {
                    bin: name.to_string(),
                    entity: id.to_string(),
                });
            }
            members.insert(id.to_string());
        }
        self.bins.insert(
            name.to_string(),
            Bin {
                name: name.to_string(),
                entity_ids: members,
            },
        );
        Ok(())
    }

    /// Entities matched to a KO
    pub fn entities_of_ko(&self, ko_id: &str) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.ko_matches.iter().any(|m| m.ko_id == ko_id))
            .collect()
    }

    /// Reactions an entity is linked to through its KOs, without repeats
    pub fn reactions_of_entity(&self, entity_id: &str) -> Vec<&Reaction> {
        let Some(entity) = self.entities.get(entity_id) else {
            return Vec::new();
        };
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut reactions = Vec::new();
        for ko_id in entity.ko_ids() {
            for reaction in self.network.reactions_of_ko(ko_id) {
                if seen.insert(reaction.id.as_str()) {
                    reactions.push(reaction);
                }
            }
        }
        reactions
    }

    /// Names of the bins containing an entity
    pub fn bins_of_entity(&self, entity_id: &str) -> Vec<&str> {
        self.bins
            .values()
            .filter(|b| b.entity_ids.contains(entity_id))
            .map(|b| b.name.as_str())
            .collect()
    }

    /// Reduce the network to the KOs, reactions and compounds reachable from one bin
    ///
    /// Reverse index entries are kept only for reactions that remain.
    pub fn subnetwork_of_bin(&self, bin_name: &str) -> Result<EntityNetwork, GroupingError> {
        let bin = self
            .bins
            .get(bin_name)
            .ok_or_else(|| GroupingError::UnknownBin(bin_name.to_string()))?;

        let mut sub = EntityNetwork::new_empty(self.kind);
        for entity_id in &bin.entity_ids {
            if let Some(entity) = self.entities.get(entity_id) {
                sub.entities.insert(entity_id.clone(), entity.clone());
                for ko_id in entity.ko_ids() {
                    if let Some(ko) = self.network.kos.get(ko_id) {
                        sub.network.add_ko(ko.clone());
                    }
                }
            }
        }
        let reaction_ids: IndexSet<String> = sub
            .network
            .kos
            .values()
            .flat_map(|ko| ko.reaction_ids.iter().cloned())
            .collect();
        for reaction_id in &reaction_ids {
            let Some(reaction) = self.network.reactions.get(reaction_id) else {
                continue;
            };
            for compound_id in &reaction.compound_ids {
                if let Some(compound) = self.network.metabolites.get(compound_id) {
                    sub.network.add_compound(compound.clone());
                }
            }
            sub.network.add_reaction(reaction.clone());
        }
        for (target, source) in [
            (&mut sub.network.kegg_reaction_index, &self.network.kegg_reaction_index),
            (&mut sub.network.ec_number_index, &self.network.ec_number_index),
        ] {
            for (alias, ids) in source {
                let kept: Vec<String> = ids
                    .iter()
                    .filter(|id| reaction_ids.contains(*id))
                    .cloned()
                    .collect();
                if !kept.is_empty() {
                    target.insert(alias.clone(), kept);
                }
            }
        }
        sub.bins.insert(bin.name.clone(), bin.clone());
        Ok(sub)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GroupingError {
    #[error("A bin named {0} already exists")]
    DuplicateBin(String),
    #[error("Bin {bin} refers to {entity}, which is not in the network")]
    UnknownEntity { bin: String, entity: String },
    #[error("No bin named {0}")]
    UnknownBin(String),
}
