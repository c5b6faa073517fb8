//! This module provides the Entity struct, representing a gene or gene cluster annotated with
//! KOs, and the KoAnnotation record the network is built from
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A single gene (or gene cluster) to KO annotation, as yielded by an annotation source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KoAnnotation {
    /// Gene caller ID or gene cluster ID
    pub entity_id: String,
    /// KO ID, e.g. `K00001`
    pub ko_id: String,
    /// KO display name
    pub ko_name: String,
    /// Match confidence (e-value or bitscore, depending on the annotation source)
    pub score: f64,
}

impl KoAnnotation {
    pub fn new(entity_id: &str, ko_id: &str, ko_name: &str, score: f64) -> KoAnnotation {
        KoAnnotation {
            entity_id: entity_id.to_string(),
            ko_id: ko_id.to_string(),
            ko_name: ko_name.to_string(),
            score,
        }
    }
}

/// A KO assigned to an entity, with the score of that particular match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KoMatch {
    /// Key into [`crate::network::model::ReactionNetwork::kos`]
    pub ko_id: String,
    pub score: f64,
}

/// What kind of thing the entities of a network are
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Genes of a single genome or metagenome
    Gene,
    /// Gene clusters of a pangenome
    GeneCluster,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Gene => write!(f, "gene"),
            EntityKind::GeneCluster => write!(f, "gene cluster"),
        }
    }
}

/// A gene or gene cluster in the network
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Used to identify the entity
    pub id: String,
    /// KO matches in the order they were encountered.
    ///
    /// Repeated matches of the same KO are all kept.
    pub ko_matches: Vec<KoMatch>,
}

impl Entity {
    pub fn new(id: &str) -> Entity {
        Entity {
            id: id.to_string(),
            ko_matches: Vec::new(),
        }
    }

    /// Record another KO match for this entity
    pub fn add_ko_match(&mut self, ko_id: &str, score: f64) {
        self.ko_matches.push(KoMatch {
            ko_id: ko_id.to_string(),
            score,
        });
    }

    /// Distinct KO IDs matched to this entity, in first-seen order
    pub fn ko_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for m in &self.ko_matches {
            if !ids.contains(&m.ko_id.as_str()) {
                ids.push(&m.ko_id);
            }
        }
        ids
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
