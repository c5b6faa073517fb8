//! This module provides the Compound struct representing a ModelSEED metabolite

use std::hash::Hash;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Represents a compound (metabolite) from the ModelSEED Biochemistry database
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Compound {
    /// ModelSEED compound ID, e.g. `cpd00001` (must be unique)
    pub id: String,
    /// Human Readable name of the compound
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Chemical Formula of the compound
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Electrical charge of the compound, known only when the formula is known
    #[builder(default = "None")]
    pub charge: Option<i32>,
    /// KEGG COMPOUND IDs that alias this compound
    #[builder(default = "Vec::new()")]
    pub kegg_aliases: Vec<String>,
}

impl CompoundBuilder {
    fn validate(&self) -> Result<(), String> {
        let formula = self.formula.clone().flatten();
        let charge = self.charge.flatten();
        match (formula, charge) {
            (None, Some(_)) => Err("a compound without a formula can't have a charge".to_string()),
            (Some(_), None) => Err("a compound with a formula must have a charge".to_string()),
            _ => Ok(()),
        }
    }
}

impl Hash for Compound {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state); // Hash only depends on id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_compound() {
        let water = CompoundBuilder::default()
            .id("cpd00001".to_string())
            .name(Some("H2O".to_string()))
            .formula(Some("H2O".to_string()))
            .charge(Some(0))
            .kegg_aliases(vec!["C00001".to_string(), "C01328".to_string()])
            .build()
            .unwrap();
        assert_eq!(water.charge, Some(0));
        assert_eq!(water.kegg_aliases.len(), 2);

        let unknown = CompoundBuilder::default()
            .id("cpd99999".to_string())
            .build()
            .unwrap();
        assert!(unknown.formula.is_none());
        assert!(unknown.charge.is_none());
    }

    #[test]
    fn charge_requires_formula() {
        let result = CompoundBuilder::default()
            .id("cpd00002".to_string())
            .charge(Some(-3))
            .build();
        assert!(result.is_err());

        let result = CompoundBuilder::default()
            .id("cpd00002".to_string())
            .formula(Some("C10H13N5O13P3".to_string()))
            .build();
        assert!(result.is_err());
    }
}
