//! Summary statistics of a finished network
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::network::grouping::EntityNetwork;
use crate::network::model::ReactionNetwork;

/// Counts and ratios describing a reaction network
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NetworkSummary {
    pub ko_count: usize,
    /// KOs linked to at least one reaction
    pub contributing_ko_count: usize,
    pub reaction_count: usize,
    pub reversible_reaction_count: usize,
    /// Fraction of reactions that are reversible, 0 for an empty network
    pub reversibility_ratio: f64,
    /// Number of reactions linked to each KO
    pub reactions_per_ko: IndexMap<String, usize>,
    /// Mean number of reactions over the KOs that contribute any
    pub mean_reactions_per_contributing_ko: f64,
    /// Reactions linked to some KO only through KEGG REACTION IDs
    pub reactions_via_kegg_only: usize,
    /// Reactions linked to some KO only through EC numbers
    pub reactions_via_ec_only: usize,
    /// Reactions linked through both kinds of alias
    pub reactions_via_both: usize,
    pub compound_count: usize,
    /// Number of reactions each compound takes part in, most connected first
    pub compound_connectivity: IndexMap<String, usize>,
    /// Compounds that are only ever reactants of irreversible reactions
    pub consumed_only: usize,
    /// Compounds that are only ever products of irreversible reactions
    pub produced_only: usize,
    /// Compounds both consumed and produced, counting reversible reactions as both
    pub consumed_and_produced: usize,
}

impl NetworkSummary {
    pub fn of(network: &ReactionNetwork) -> NetworkSummary {
        let reaction_count = network.reactions.len();
        let reversible_reaction_count = network.reactions.values().filter(|r| r.reversible).count();
        let reversibility_ratio = if reaction_count == 0 {
            0.0
        } else {
            reversible_reaction_count as f64 / reaction_count as f64
        };

        let reactions_per_ko: IndexMap<String, usize> = network
            .kos
            .values()
            .map(|ko| (ko.id.clone(), ko.reaction_ids.len()))
            .collect();
        let contributing: Vec<usize> = reactions_per_ko.values().copied().filter(|n| *n > 0).collect();
        let mean_reactions_per_contributing_ko = if contributing.is_empty() {
            0.0
        } else {
            contributing.iter().sum::<usize>() as f64 / contributing.len() as f64
        };

        let mut via_kegg: IndexSet<&str> = IndexSet::new();
        let mut via_ec: IndexSet<&str> = IndexSet::new();
        for ko in network.kos.values() {
            for (reaction_id, aliases) in &ko.kegg_reaction_aliases {
                if !aliases.is_empty() {
                    via_kegg.insert(reaction_id);
                }
            }
            for (reaction_id, aliases) in &ko.ec_number_aliases {
                if !aliases.is_empty() {
                    via_ec.insert(reaction_id);
                }
            }
        }
        let reactions_via_both = via_kegg.intersection(&via_ec).count();

        let mut connectivity: IndexMap<String, usize> = IndexMap::new();
        let mut consumed: IndexSet<&str> = IndexSet::new();
        let mut produced: IndexSet<&str> = IndexSet::new();
        for reaction in network.reactions.values() {
            let mut seen: IndexSet<&str> = IndexSet::new();
            for (compound_id, coefficient, _) in reaction.terms() {
                if seen.insert(compound_id) {
                    *connectivity.entry(compound_id.to_string()).or_default() += 1;
                }
                if reaction.reversible || coefficient < 0 {
                    consumed.insert(compound_id);
                }
                if reaction.reversible || coefficient > 0 {
                    produced.insert(compound_id);
                }
            }
        }
        connectivity.sort_by(|a_id, a_n, b_id, b_n| b_n.cmp(a_n).then_with(|| a_id.cmp(b_id)));

        NetworkSummary {
            ko_count: network.kos.len(),
            contributing_ko_count: contributing.len(),
            reaction_count,
            reversible_reaction_count,
            reversibility_ratio,
            reactions_per_ko,
            mean_reactions_per_contributing_ko,
            reactions_via_kegg_only: via_kegg.len() - reactions_via_both,
            reactions_via_ec_only: via_ec.len() - reactions_via_both,
            reactions_via_both,
            compound_count: network.metabolites.len(),
            compound_connectivity: connectivity,
            consumed_only: consumed.difference(&produced).count(),
            produced_only: produced.difference(&consumed).count(),
            consumed_and_produced: consumed.intersection(&produced).count(),
        }
    }
}

/// Summary of an entity network: the reaction network plus its entities
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntitySummary {
    pub entity_count: usize,
    /// Entities with at least one KO that contributes reactions
    pub entities_with_reactions: usize,
    pub bin_count: usize,
    pub network: NetworkSummary,
}

impl EntitySummary {
    pub fn of(net: &EntityNetwork) -> EntitySummary {
        let entities_with_reactions = net
            .entities
            .values()
            .filter(|e| {
                e.ko_matches.iter().any(|m| {
                    net.network
                        .kos
                        .get(&m.ko_id)
                        .is_some_and(|ko| ko.contributes_reactions())
                })
            })
            .count();
        EntitySummary {
            entity_count: net.entities.len(),
            entities_with_reactions,
            bin_count: net.bins.len(),
            network: NetworkSummary::of(&net.network),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NetworkBuilder;
    use crate::network::entity::KoAnnotation;
    use crate::reference::test_tables::tables;

    #[test]
    fn summary_of_built_network() {
        let tables = tables();
        let annotations: Vec<KoAnnotation> = ["K00001", "K00002", "K00003", "K00005", "K00006"]
            .iter()
            .enumerate()
            .map(|(i, ko)| KoAnnotation::new(&i.to_string(), ko, ko, 1e-10))
            .collect();
        let (net, _) = NetworkBuilder::build_genomic(&tables, &annotations).unwrap();
        let summary = EntitySummary::of(&net);
        assert_eq!(summary.entity_count, 5);
        // K00003 reaches only a reaction without stoichiometry
        assert_eq!(summary.entities_with_reactions, 4);

        let s = &summary.network;
        assert_eq!(s.ko_count, 5);
        assert_eq!(s.contributing_ko_count, 4);
        assert_eq!(s.reaction_count, 3);
        // rxn00003 (=) and rxn00004 (?) are reversible, rxn00001 is not
        assert_eq!(s.reversible_reaction_count, 2);
        assert!((s.reversibility_ratio - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.reactions_per_ko["K00003"], 0);
        assert!((s.mean_reactions_per_contributing_ko - 1.0).abs() < 1e-12);
        // rxn00001: KEGG via K00001 and EC via K00002; rxn00003: both via K00005
        assert_eq!(s.reactions_via_both, 2);
        assert_eq!(s.reactions_via_kegg_only, 1);
        assert_eq!(s.reactions_via_ec_only, 0);

        assert_eq!(s.compound_count, 5);
        // cpd00002 is in rxn00001 and rxn00003, cpd00004 in rxn00003 and rxn00004
        let top: Vec<&str> = s.compound_connectivity.keys().take(2).map(String::as_str).collect();
        assert_eq!(top, vec!["cpd00002", "cpd00004"]);
        assert_eq!(s.compound_connectivity["cpd00001"], 1);
        // rxn00001 irreversibly turns cpd00002 and cpd00003 into cpd00001; the rest are reversible
        assert_eq!(s.produced_only, 1);
        assert_eq!(s.consumed_only, 1);
        assert_eq!(s.consumed_and_produced, 3);
    }

    #[test]
    fn empty_network() {
        let summary = NetworkSummary::of(&ReactionNetwork::new_empty());
        assert_eq!(summary.reaction_count, 0);
        assert_eq!(summary.reversibility_ratio, 0.0);
        assert_eq!(summary.mean_reactions_per_contributing_ko, 0.0);
    }
}
