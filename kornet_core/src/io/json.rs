//! Module providing JSON IO for entity networks
use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::compound::{CompoundBuilder, CompoundBuilderError};
use crate::network::entity::{Entity, EntityKind};
use crate::network::grouping::{EntityNetwork, GroupingError};
use crate::network::ko::Ko;
use crate::network::model::AliasKind;
use crate::network::reaction::{Compartment, ReactionBuilder, ReactionBuilderError};

// region JSON Network
/// Represents a JSON serialized network, used for reading and writing networks in json format
#[derive(Serialize, Deserialize)]
struct JsonNetwork {
    kind: EntityKind,
    kos: Vec<JsonKo>,
    reactions: Vec<JsonReaction>,
    metabolites: Vec<JsonMetabolite>,
    entities: Vec<JsonEntity>,
    bins: Vec<JsonBin>,
}

/// Entities and bins that reach a KO, reaction or metabolite
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub entities: Vec<String>,
    pub bins: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonKo {
    id: String,
    name: String,
    reactions: Vec<JsonKoLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provenance: Option<Provenance>,
}

/// A reaction linked to a KO and the KO's aliases that reached it
#[derive(Serialize, Deserialize)]
struct JsonKoLink {
    reaction: String,
    kegg_reaction_aliases: Vec<String>,
    ec_number_aliases: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    reversible: bool,
    stoichiometry: Vec<JsonTerm>,
    kegg_aliases: Vec<String>,
    ec_number_aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provenance: Option<Provenance>,
}

#[derive(Serialize, Deserialize)]
struct JsonTerm {
    compound: String,
    coefficient: i64,
    compartment: Compartment,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    name: Option<String>,
    formula: Option<String>,
    charge: Option<i32>,
    kegg_aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provenance: Option<Provenance>,
}

#[derive(Serialize, Deserialize)]
struct JsonEntity {
    id: String,
    ko_matches: Vec<JsonKoMatch>,
}

#[derive(Serialize, Deserialize)]
struct JsonKoMatch {
    ko: String,
    score: f64,
}

#[derive(Serialize, Deserialize)]
struct JsonBin {
    name: String,
    entities: Vec<String>,
}
// endregion JSON Network

// region Provenance
/// Which entities reach each KO, reaction and compound, and which bins hold each entity
struct ProvenanceIndex<'a> {
    entity_bins: IndexMap<&'a str, Vec<&'a str>>,
    ko_entities: IndexMap<&'a str, IndexSet<&'a str>>,
    reaction_entities: IndexMap<&'a str, IndexSet<&'a str>>,
    compound_entities: IndexMap<&'a str, IndexSet<&'a str>>,
}

impl<'a> ProvenanceIndex<'a> {
    fn new(net: &'a EntityNetwork) -> Self {
        let mut entity_bins: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for bin in net.bins.values() {
            for entity_id in &bin.entity_ids {
                entity_bins
                    .entry(entity_id.as_str())
                    .or_default()
                    .push(bin.name.as_str());
            }
        }
        let mut ko_entities: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        for entity in net.entities.values() {
            for ko_id in entity.ko_ids() {
                ko_entities.entry(ko_id).or_default().insert(entity.id.as_str());
            }
        }
        let mut reaction_entities: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        for ko in net.network.kos.values() {
            let Some(entities) = ko_entities.get(ko.id.as_str()) else {
                continue;
            };
            for reaction_id in &ko.reaction_ids {
                reaction_entities
                    .entry(reaction_id.as_str())
                    .or_default()
                    .extend(entities.iter().copied());
            }
        }
        let mut compound_entities: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        for reaction in net.network.reactions.values() {
            let Some(entities) = reaction_entities.get(reaction.id.as_str()) else {
                continue;
            };
            for compound_id in &reaction.compound_ids {
                compound_entities
                    .entry(compound_id.as_str())
                    .or_default()
                    .extend(entities.iter().copied());
            }
        }
        ProvenanceIndex {
            entity_bins,
            ko_entities,
            reaction_entities,
            compound_entities,
        }
    }

    fn provenance(&self, entities: Option<&IndexSet<&str>>) -> Provenance {
        let Some(entities) = entities else {
            return Provenance::default();
        };
        let mut bins: IndexSet<&str> = IndexSet::new();
        for entity_id in entities {
            if let Some(names) = self.entity_bins.get(entity_id) {
                bins.extend(names.iter().copied());
            }
        }
        Provenance {
            entities: entities.iter().map(|s| s.to_string()).collect(),
            bins: bins.into_iter().map(String::from).collect(),
        }
    }
}
// endregion Provenance

// region Conversions
impl JsonNetwork {
    fn from_network(net: &EntityNetwork, with_provenance: bool) -> Self {
        let index = with_provenance.then(|| ProvenanceIndex::new(net));
        let kos = net
            .network
            .kos
            .values()
            .map(|ko| JsonKo {
                id: ko.id.clone(),
                name: ko.name.clone(),
                reactions: ko
                    .reaction_ids
                    .iter()
                    .map(|reaction_id| JsonKoLink {
                        reaction: reaction_id.clone(),
                        kegg_reaction_aliases: ko
                            .kegg_reaction_aliases
                            .get(reaction_id)
                            .cloned()
                            .unwrap_or_default(),
                        ec_number_aliases: ko
                            .ec_number_aliases
                            .get(reaction_id)
                            .cloned()
                            .unwrap_or_default(),
                    })
                    .collect(),
                provenance: index
                    .as_ref()
                    .map(|i| i.provenance(i.ko_entities.get(ko.id.as_str()))),
            })
            .collect();
        let reactions = net
            .network
            .reactions
            .values()
            .map(|reaction| JsonReaction {
                id: reaction.id.clone(),
                name: reaction.name.clone(),
                reversible: reaction.reversible,
                stoichiometry: reaction
                    .terms()
                    .map(|(compound, coefficient, compartment)| JsonTerm {
                        compound: compound.to_string(),
                        coefficient,
                        compartment,
                    })
                    .collect(),
                kegg_aliases: reaction.kegg_aliases.clone(),
                ec_number_aliases: reaction.ec_number_aliases.clone(),
                provenance: index
                    .as_ref()
                    .map(|i| i.provenance(i.reaction_entities.get(reaction.id.as_str()))),
            })
            .collect();
        let metabolites = net
            .network
            .metabolites
            .values()
            .map(|compound| JsonMetabolite {
                id: compound.id.clone(),
                name: compound.name.clone(),
                formula: compound.formula.clone(),
                charge: compound.charge,
                kegg_aliases: compound.kegg_aliases.clone(),
                provenance: index
                    .as_ref()
                    .map(|i| i.provenance(i.compound_entities.get(compound.id.as_str()))),
            })
            .collect();
        let entities = net
            .entities
            .values()
            .map(|entity| JsonEntity {
                id: entity.id.clone(),
                ko_matches: entity
                    .ko_matches
                    .iter()
                    .map(|m| JsonKoMatch {
                        ko: m.ko_id.clone(),
                        score: m.score,
                    })
                    .collect(),
            })
            .collect();
        let bins = net
            .bins
            .values()
            .map(|bin| JsonBin {
                name: bin.name.clone(),
                entities: bin.entity_ids.iter().cloned().collect(),
            })
            .collect();
        JsonNetwork {
            kind: net.kind,
            kos,
            reactions,
            metabolites,
            entities,
            bins,
        }
    }

    /// Rebuild the network, checking that every id refers to an object that is present
    ///
    /// The alias reverse indexes are not serialized; they are recovered from the aliases
    /// recorded on each KO-reaction link.
    fn into_network(self) -> Result<EntityNetwork, JsonError> {
        let mut net = EntityNetwork::new_empty(self.kind);
        for m in self.metabolites {
            let compound = CompoundBuilder::default()
                .id(m.id)
                .name(m.name)
                .formula(m.formula)
                .charge(m.charge)
                .kegg_aliases(m.kegg_aliases)
                .build()?;
            net.network.add_compound(compound);
        }
        for r in self.reactions {
            let mut compound_ids = Vec::with_capacity(r.stoichiometry.len());
            let mut coefficients = Vec::with_capacity(r.stoichiometry.len());
            let mut compartments = Vec::with_capacity(r.stoichiometry.len());
            for term in r.stoichiometry {
                if !net.network.metabolites.contains_key(&term.compound) {
                    return Err(JsonError::DanglingReference {
                        from: r.id,
                        to: term.compound,
                    });
                }
                compound_ids.push(term.compound);
                coefficients.push(term.coefficient);
                compartments.push(term.compartment);
            }
            let reaction = ReactionBuilder::default()
                .id(r.id)
                .name(r.name)
                .reversible(r.reversible)
                .kegg_aliases(r.kegg_aliases)
                .ec_number_aliases(r.ec_number_aliases)
                .compound_ids(compound_ids)
                .coefficients(coefficients)
                .compartments(compartments)
                .build()?;
            net.network.add_reaction(reaction);
        }
        for k in self.kos {
            let mut ko = Ko::new(&k.id, &k.name);
            for link in k.reactions {
                if !net.network.reactions.contains_key(&link.reaction) {
                    return Err(JsonError::DanglingReference {
                        from: k.id,
                        to: link.reaction,
                    });
                }
                for alias in &link.kegg_reaction_aliases {
                    net.network
                        .index_alias(AliasKind::KeggReaction, alias, &link.reaction);
                }
                for alias in &link.ec_number_aliases {
                    net.network
                        .index_alias(AliasKind::EcNumber, alias, &link.reaction);
                }
                ko.link_reaction(
                    &link.reaction,
                    link.kegg_reaction_aliases,
                    link.ec_number_aliases,
                );
            }
            net.network.add_ko(ko);
        }
        for e in self.entities {
            let mut entity = Entity::new(&e.id);
            for m in e.ko_matches {
                if !net.network.kos.contains_key(&m.ko) {
                    return Err(JsonError::DanglingReference { from: e.id, to: m.ko });
                }
                entity.add_ko_match(&m.ko, m.score);
            }
            net.entities.insert(e.id, entity);
        }
        for bin in self.bins {
            net.add_bin(&bin.name, &bin.entities)?;
        }
        Ok(net)
    }
}

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("{from} refers to {to}, which is not in the network")]
    DanglingReference { from: String, to: String },
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Unable to build compound")]
    UnableToBuildCompound(#[from] CompoundBuilderError),
    #[error("Invalid bin")]
    InvalidBin(#[from] GroupingError),
    #[error("Serde json error")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}
// endregion Conversions

/// Serialize a network as `{kind, kos, reactions, metabolites, entities, bins}`
///
/// With `with_provenance`, each KO, reaction and metabolite also lists the entities and bins
/// that reach it.
pub fn to_json_string(net: &EntityNetwork, with_provenance: bool) -> Result<String, JsonError> {
    Ok(serde_json::to_string(&JsonNetwork::from_network(
        net,
        with_provenance,
    ))?)
}

/// Write a network to a JSON file, see [`to_json_string`]
pub fn write_network_json<P: AsRef<Path>>(
    net: &EntityNetwork,
    path: P,
    with_provenance: bool,
) -> Result<(), JsonError> {
    let network_string = to_json_string(net, with_provenance)?;
    fs::write(path, network_string)?;
    Ok(())
}

/// Parse a network written by [`to_json_string`]; provenance, if present, is ignored
pub fn from_json_str(json: &str) -> Result<EntityNetwork, JsonError> {
    let json_network = match serde_json::from_str::<JsonNetwork>(json) {
        Ok(network) => network,
        Err(err) => return Err(JsonError::UnableToParse(format!("{:?}", err))),
    };
    json_network.into_network()
}

/// Read a network from a JSON file written by [`write_network_json`]
pub fn read_network_json<P: AsRef<Path>>(path: P) -> Result<EntityNetwork, JsonError> {
    let network_str = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
    };
    from_json_str(&network_str)
}
