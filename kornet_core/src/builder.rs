//! Construction of a reaction network from gene-KO annotations
//!
//! The builder makes a single pass over the annotations. Each KO is resolved into reactions
//! the first time it is seen; every later annotation with the same KO only records the match
//! on its entity. A KO's aliases that earlier KOs already resolved are looked up in the
//! network's reverse indices, and only the remaining aliases are queried in the reference
//! tables.
use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::io::modelseed::ReactionRow;
use crate::network::compound::{CompoundBuilder, CompoundBuilderError};
use crate::network::entity::{Entity, EntityKind, KoAnnotation};
use crate::network::grouping::EntityNetwork;
use crate::network::ko::Ko;
use crate::network::model::AliasKind;
use crate::network::reaction::{Reaction, ReactionBuilder, ReactionBuilderError};
use crate::reference::AliasTables;
use crate::stoichiometry::{normalize, StoichiometryError};

const ALIAS_KINDS: [AliasKind; 2] = [AliasKind::KeggReaction, AliasKind::EcNumber];

/// Receives progress from a network build
///
/// All methods default to doing nothing.
pub trait BuildObserver {
    /// Called after each annotation is processed, with the running count
    fn record_processed(&mut self, _processed: usize, _annotation: &KoAnnotation) {}
    /// Called once when the build completes
    fn finished(&mut self, _report: &BuildReport) {}
}

/// Observer that ignores all progress
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}

/// Data gaps met during a build that did not stop it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildReport {
    pub records_processed: usize,
    /// Annotated KOs absent from the KEGG KO reference, which suggests the annotations were
    /// made with a different KEGG release
    pub undefined_kos: IndexSet<String>,
    /// KOs without any KEGG REACTION or EC number aliases
    pub kos_without_aliases: IndexSet<String>,
    /// ModelSEED reactions reached by an alias but left out for lack of a stoichiometry
    pub skipped_reactions: IndexSet<String>,
}

/// Incrementally builds an [`EntityNetwork`] from KO annotations
pub struct NetworkBuilder<'a> {
    tables: &'a AliasTables,
    network: EntityNetwork,
    report: BuildReport,
    /// Aliases already queried that resolved to no reaction
    dead_aliases: HashSet<(AliasKind, String)>,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(tables: &'a AliasTables, kind: EntityKind) -> Self {
        NetworkBuilder {
            tables,
            network: EntityNetwork::new_empty(kind),
            report: BuildReport::default(),
            dead_aliases: HashSet::new(),
        }
    }

    /// Build the network of a genome or metagenome, whose entities are genes
    ///
    /// # Examples
    /// ```rust
    /// use kornet_core::builder::NetworkBuilder;
    /// use kornet_core::network::entity::KoAnnotation;
    /// use kornet_core::reference::AliasTables;
    /// let tables = AliasTables::from_parts(vec![], vec![], vec![], "108.0", "abc123");
    /// let annotations = vec![KoAnnotation::new("1", "K00001", "alcohol dehydrogenase", 1e-30)];
    /// let (network, report) = NetworkBuilder::build_genomic(&tables, &annotations).unwrap();
    /// assert!(network.network.kos["K00001"].reaction_ids.is_empty());
    /// assert!(report.undefined_kos.contains("K00001"));
    /// ```
    pub fn build_genomic<'r, I>(
        tables: &'a AliasTables,
        annotations: I,
    ) -> Result<(EntityNetwork, BuildReport), BuildError>
    where
        I: IntoIterator<Item = &'r KoAnnotation>,
    {
        Self::build(tables, EntityKind::Gene, annotations, &mut NoopObserver)
    }

    /// Build the network of a pangenome, whose entities are gene clusters
    pub fn build_pangenomic<'r, I>(
        tables: &'a AliasTables,
        annotations: I,
    ) -> Result<(EntityNetwork, BuildReport), BuildError>
    where
        I: IntoIterator<Item = &'r KoAnnotation>,
    {
        Self::build(tables, EntityKind::GeneCluster, annotations, &mut NoopObserver)
    }

    /// Build a network, reporting progress to an observer
    pub fn build<'r, I>(
        tables: &'a AliasTables,
        kind: EntityKind,
        annotations: I,
        observer: &mut dyn BuildObserver,
    ) -> Result<(EntityNetwork, BuildReport), BuildError>
    where
        I: IntoIterator<Item = &'r KoAnnotation>,
    {
        let mut builder = NetworkBuilder::new(tables, kind);
        for annotation in annotations {
            builder.add_annotation(annotation)?;
            observer.record_processed(builder.report.records_processed, annotation);
        }
        let (network, report) = builder.finish();
        observer.finished(&report);
        Ok((network, report))
    }

    /// Add one annotation to the network
    pub fn add_annotation(&mut self, annotation: &KoAnnotation) -> Result<(), BuildError> {
        self.report.records_processed += 1;
        self.network
            .entities
            .entry(annotation.entity_id.clone())
            .or_insert_with(|| Entity::new(&annotation.entity_id))
            .add_ko_match(&annotation.ko_id, annotation.score);

        if self.network.network.kos.contains_key(&annotation.ko_id) {
            return Ok(());
        }
        let ko = self.resolve_ko(&annotation.ko_id, &annotation.ko_name)?;
        self.network.network.add_ko(ko);
        Ok(())
    }

    /// Finish the build, returning the network and the data gaps met along the way
    pub fn finish(self) -> (EntityNetwork, BuildReport) {
        let net = &self.network.network;
        if !self.report.undefined_kos.is_empty() {
            warn!(
                count = self.report.undefined_kos.len(),
                kos = %self.report.undefined_kos.iter().cloned().collect::<Vec<_>>().join(", "),
                "annotated KOs were not found in the KEGG reference; the annotations and the \
                 reference may come from different KEGG releases"
            );
        }
        info!(
            kind = %self.network.kind,
            entities = self.network.entities.len(),
            kos = net.kos.len(),
            reactions = net.reactions.len(),
            metabolites = net.metabolites.len(),
            "built reaction network"
        );
        (self.network, self.report)
    }

    /// Create a KO, linking it to every reaction its aliases reach
    fn resolve_ko(&mut self, ko_id: &str, ko_name: &str) -> Result<Ko, BuildError> {
        let tables = self.tables;
        let mut ko = Ko::new(ko_id, ko_name);
        let Some(reference) = tables.ko(ko_id) else {
            debug!(ko = %ko_id, "KO not in the KEGG reference");
            self.report.undefined_kos.insert(ko_id.to_string());
            return Ok(ko);
        };
        if !reference.has_aliases() {
            self.report.kos_without_aliases.insert(ko_id.to_string());
            return Ok(ko);
        }

        // Aliases an earlier KO resolved link straight to existing reactions
        let mut linked: IndexSet<String> = IndexSet::new();
        let mut unseen: Vec<(AliasKind, &'a str)> = Vec::new();
        for kind in ALIAS_KINDS {
            for alias in tables.ko_aliases(ko_id, kind) {
                if let Some(ids) = self.network.network.alias_index(kind).get(alias) {
                    linked.extend(ids.iter().cloned());
                } else if !self.dead_aliases.contains(&(kind, alias.clone())) {
                    unseen.push((kind, alias.as_str()));
                }
            }
        }

        // Rows reached through unseen KEGG and EC aliases are merged so each reaction is
        // handled once
        let mut discovered: IndexMap<&'a str, &'a ReactionRow> = IndexMap::new();
        for (kind, alias) in &unseen {
            for row in tables.reactions_for_alias(*kind, alias) {
                discovered.entry(row.id.as_str()).or_insert(row);
            }
        }
        for (reaction_id, row) in discovered {
            if !self.network.network.reactions.contains_key(reaction_id) {
                if self.report.skipped_reactions.contains(reaction_id) {
                    continue;
                }
                match self.build_reaction(row)? {
                    Some(reaction) => self.network.network.add_reaction(reaction),
                    None => {
                        debug!(reaction = %reaction_id, "reaction has no stoichiometry, skipping");
                        self.report.skipped_reactions.insert(reaction_id.to_string());
                        continue;
                    }
                }
            }
            for (kind, alias) in &unseen {
                if row_aliases(row, *kind).iter().any(|a| a == alias) {
                    self.network.network.index_alias(*kind, alias, reaction_id);
                }
            }
            linked.insert(reaction_id.to_string());
        }
        for (kind, alias) in unseen {
            if !self.network.network.alias_index(kind).contains_key(alias) {
                self.dead_aliases.insert((kind, alias.to_string()));
            }
        }

        for reaction_id in linked {
            let Some(reaction) = self.network.network.reactions.get(&reaction_id) else {
                continue;
            };
            let shared = |kind: AliasKind, reaction_aliases: &[String]| -> Vec<String> {
                tables
                    .ko_aliases(ko_id, kind)
                    .iter()
                    .filter(|a| reaction_aliases.contains(*a))
                    .cloned()
                    .collect()
            };
            let kegg = shared(AliasKind::KeggReaction, &reaction.kegg_aliases);
            let ec = shared(AliasKind::EcNumber, &reaction.ec_number_aliases);
            ko.link_reaction(&reaction_id, kegg, ec);
        }
        Ok(ko)
    }

    /// Make a reaction from its reference row, adding any compounds not yet in the network
    ///
    /// Returns None when the row has no stoichiometry.
    fn build_reaction(&mut self, row: &ReactionRow) -> Result<Option<Reaction>, BuildError> {
        let stoichiometry = normalize(row.stoichiometry.as_deref(), row.direction, row.reversibility)
            .map_err(|source| BuildError::Stoichiometry {
                reaction: row.id.clone(),
                source,
            })?;
        let Some(stoichiometry) = stoichiometry else {
            return Ok(None);
        };

        for compound_id in &stoichiometry.compound_ids {
            if self.network.network.metabolites.contains_key(compound_id) {
                continue;
            }
            let compound_row =
                self.tables
                    .compound(compound_id)
                    .ok_or_else(|| BuildError::MissingCompound {
                        reaction: row.id.clone(),
                        compound: compound_id.clone(),
                    })?;
            let compound = CompoundBuilder::default()
                .id(compound_row.id.clone())
                .name(compound_row.name.clone())
                .formula(compound_row.formula.clone())
                .charge(compound_row.charge)
                .kegg_aliases(compound_row.kegg_aliases.clone())
                .build()?;
            self.network.network.add_compound(compound);
        }

        let reaction = ReactionBuilder::default()
            .id(row.id.clone())
            .name(row.name.clone())
            .kegg_aliases(row.kegg_aliases.clone())
            .ec_number_aliases(row.ec_numbers.clone())
            .reversible(stoichiometry.reversible)
            .compound_ids(stoichiometry.compound_ids)
            .coefficients(stoichiometry.coefficients)
            .compartments(stoichiometry.compartments)
            .build()?;
        Ok(Some(reaction))
    }
}

fn row_aliases(row: &ReactionRow, kind: AliasKind) -> &[String] {
    match kind {
        AliasKind::KeggReaction => &row.kegg_aliases,
        AliasKind::EcNumber => &row.ec_numbers,
    }
}

/// Errors that abort a network build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Reaction {reaction} has an unreadable stoichiometry")]
    Stoichiometry {
        reaction: String,
        #[source]
        source: StoichiometryError,
    },
    #[error(
        "Compound {compound} in the stoichiometry of reaction {reaction} is not in the \
         ModelSEED compounds table, so the reference database is inconsistent"
    )]
    MissingCompound { reaction: String, compound: String },
    #[error("Unable to build reaction")]
    InvalidReaction(#[from] ReactionBuilderError),
    #[error("Unable to build compound")]
    InvalidCompound(#[from] CompoundBuilderError),
}
