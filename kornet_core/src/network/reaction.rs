//! This module provides a struct for representing ModelSEED reactions
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Cellular compartment of a reactant or product
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Compartment {
    /// Inside the cell, ModelSEED compartment code `0`
    #[serde(rename = "c")]
    Cytosol,
    /// Outside the cell, ModelSEED compartment code `1`
    #[serde(rename = "e")]
    Extracellular,
}

impl Compartment {
    /// Map a ModelSEED stoichiometry compartment code onto a compartment
    pub fn from_code(code: &str) -> Option<Compartment> {
        match code.trim() {
            "0" => Some(Compartment::Cytosol),
            "1" => Some(Compartment::Extracellular),
            _ => None,
        }
    }

    /// One letter tag of the compartment
    pub fn tag(&self) -> char {
        match self {
            Compartment::Cytosol => 'c',
            Compartment::Extracellular => 'e',
        }
    }
}

impl Display for Compartment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Represents a reaction in the network
///
/// `compound_ids`, `coefficients` and `compartments` are parallel: the i-th compound takes
/// part in the reaction with the i-th coefficient in the i-th compartment. Negative
/// coefficients are reactants, positive are products.
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Reaction {
    /// ModelSEED reaction ID, e.g. `rxn00001`
    pub id: String,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// KEGG REACTION IDs aliasing the reaction
    #[builder(default = "Vec::new()")]
    pub kegg_aliases: Vec<String>,
    /// EC numbers aliasing the reaction
    #[builder(default = "Vec::new()")]
    pub ec_number_aliases: Vec<String>,
    /// Whether the reaction can run in both directions
    #[builder(default = "true")]
    pub reversible: bool,
    /// Keys into [`crate::network::model::ReactionNetwork::metabolites`]
    #[builder(default = "Vec::new()")]
    pub compound_ids: Vec<String>,
    /// Integer stoichiometric coefficients
    #[builder(default = "Vec::new()")]
    pub coefficients: Vec<i64>,
    #[builder(default = "Vec::new()")]
    pub compartments: Vec<Compartment>,
}

impl ReactionBuilder {
    fn validate(&self) -> Result<(), String> {
        let compounds = self.compound_ids.as_ref().map_or(0, Vec::len);
        let coefficients = self.coefficients.as_ref().map_or(0, Vec::len);
        let compartments = self.compartments.as_ref().map_or(0, Vec::len);
        if compounds != coefficients || compounds != compartments {
            return Err(format!(
                "{} compounds, {} coefficients and {} compartments do not line up",
                compounds, coefficients, compartments
            ));
        }
        Ok(())
    }
}

impl Reaction {
    /// Iterate over (compound ID, coefficient, compartment) terms
    pub fn terms(&self) -> impl Iterator<Item = (&str, i64, Compartment)> + '_ {
        self.compound_ids
            .iter()
            .zip(self.coefficients.iter())
            .zip(self.compartments.iter())
            .map(|((c, coef), comp)| (c.as_str(), *coef, *comp))
    }

    /// IDs of compounds consumed when the reaction runs forward
    pub fn reactant_ids(&self) -> Vec<&str> {
        self.terms()
            .filter(|(_, coef, _)| *coef < 0)
            .map(|(c, _, _)| c)
            .collect()
    }

    /// IDs of compounds produced when the reaction runs forward
    pub fn product_ids(&self) -> Vec<&str> {
        self.terms()
            .filter(|(_, coef, _)| *coef > 0)
            .map(|(c, _, _)| c)
            .collect()
    }

    /// Render the reaction as an equation of compound IDs,
    /// e.g. `cpd00001[c] + 2 cpd00012[c] <=> cpd00009[e]`
    pub fn equation(&self) -> String {
        let side = |sign: i64| -> String {
            self.terms()
                .filter(|(_, coef, _)| coef.signum() == sign)
                .map(|(c, coef, comp)| match coef.abs() {
                    1 => format!("{}[{}]", c, comp),
                    n => format!("{} {}[{}]", n, c, comp),
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        let arrow = if self.reversible { "<=>" } else { "-->" };
        format!("{} {} {}", side(-1), arrow, side(1))
    }
}

impl Display for Reaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.equation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pyrophosphatase() -> Reaction {
        ReactionBuilder::default()
            .id("rxn00001".to_string())
            .name(Some("diphosphate phosphohydrolase".to_string()))
            .kegg_aliases(vec!["R00004".to_string()])
            .ec_number_aliases(vec!["3.6.1.1".to_string()])
            .reversible(false)
            .compound_ids(vec![
                "cpd00001".to_string(),
                "cpd00012".to_string(),
                "cpd00009".to_string(),
                "cpd00067".to_string(),
            ])
            .coefficients(vec![-1, -1, 2, 1])
            .compartments(vec![Compartment::Cytosol; 4])
            .build()
            .unwrap()
    }

    #[test]
    fn compartment_codes() {
        assert_eq!(Compartment::from_code("0"), Some(Compartment::Cytosol));
        assert_eq!(Compartment::from_code("1"), Some(Compartment::Extracellular));
        assert_eq!(Compartment::from_code("2"), None);
        assert_eq!(Compartment::Extracellular.tag(), 'e');
    }

    #[test]
    fn reactants_and_products() {
        let rxn = pyrophosphatase();
        assert_eq!(rxn.reactant_ids(), vec!["cpd00001", "cpd00012"]);
        assert_eq!(rxn.product_ids(), vec!["cpd00009", "cpd00067"]);
        assert_eq!(
            rxn.equation(),
            "cpd00001[c] + cpd00012[c] --> 2 cpd00009[c] + cpd00067[c]"
        );
    }

    #[test]
    fn parallel_lengths_enforced() {
        let result = ReactionBuilder::default()
            .id("rxn_bad".to_string())
            .compound_ids(vec!["cpd00001".to_string()])
            .coefficients(vec![-1, 1])
            .compartments(vec![Compartment::Cytosol])
            .build();
        assert!(result.is_err());
    }
}
