//! Conversion of ModelSEED stoichiometry strings into integer coefficients
//!
//! A ModelSEED stoichiometry is a `;` separated list of terms of the form
//! `coefficient:compound:compartment`, optionally followed by further `:` separated fields
//! (the compound index and quoted name in the Biochemistry release), which are ignored.
//! Decimal coefficients are parsed exactly and scaled by the least common multiple of all of
//! the reaction's denominators, giving integer coefficients in the same ratio.
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::reaction::Compartment;
use crate::utils::ratio::{lcm, Ratio, RatioError};

/// Direction and reversibility codes of the ModelSEED reactions table
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum DirectionCode {
    /// `>`
    Forward,
    /// `<`
    Backward,
    /// `=`
    Reversible,
    /// `?`
    Unknown,
}

impl DirectionCode {
    /// Parse a single character code, returning None for anything unrecognized
    pub fn parse(code: &str) -> Option<DirectionCode> {
        match code.trim() {
            ">" => Some(DirectionCode::Forward),
            "<" => Some(DirectionCode::Backward),
            "=" => Some(DirectionCode::Reversible),
            "?" => Some(DirectionCode::Unknown),
            _ => None,
        }
    }
}

impl Display for DirectionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            DirectionCode::Forward => '>',
            DirectionCode::Backward => '<',
            DirectionCode::Reversible => '=',
            DirectionCode::Unknown => '?',
        };
        write!(f, "{}", c)
    }
}

/// Integer stoichiometry of a reaction, in the order the terms were written
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedStoichiometry {
    pub compound_ids: Vec<String>,
    pub coefficients: Vec<i64>,
    pub compartments: Vec<Compartment>,
    /// Unknown reversibility is treated as reversible
    pub reversible: bool,
    /// Whether the coefficients were negated to match the reversibility direction
    pub negated: bool,
    /// Least common multiple of the decimal coefficients' denominators
    pub scale: i64,
}

impl NormalizedStoichiometry {
    /// Recover the written rational coefficients by dividing out the scale and undoing any
    /// negation
    pub fn rational_coefficients(&self) -> Result<Vec<Ratio>, RatioError> {
        self.coefficients
            .iter()
            .map(|c| {
                let c = if self.negated {
                    c.checked_neg().ok_or(RatioError::Overflow)?
                } else {
                    *c
                };
                Ratio::new(c, self.scale)
            })
            .collect()
    }
}

/// Normalize a reaction's stoichiometry
///
/// # Parameters
/// - `stoichiometry`: raw stoichiometry string, absent or empty for reactions without one
/// - `direction`: the reaction's written direction
/// - `reversibility`: the reaction's reversibility
///
/// # Returns
/// - `Ok(None)`: the reaction has no stoichiometry and should not be added to a network
/// - `Ok(Some(_))`: the normalized stoichiometry
/// - `Err`: the stoichiometry is malformed
///
/// # Examples
/// ```rust
/// use kornet_core::stoichiometry::{normalize, DirectionCode};
/// let stoich = normalize(
///     Some("-0.5:cpd00007:0;1:cpd00001:0"),
///     DirectionCode::Forward,
///     DirectionCode::Forward,
/// )
/// .unwrap()
/// .unwrap();
/// assert_eq!(stoich.coefficients, vec![-1, 2]);
/// assert!(!stoich.reversible);
/// ```
pub fn normalize(
    stoichiometry: Option<&str>,
    direction: DirectionCode,
    reversibility: DirectionCode,
) -> Result<Option<NormalizedStoichiometry>, StoichiometryError> {
    let Some(raw) = stoichiometry.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let mut ratios: Vec<Ratio> = Vec::new();
    let mut compound_ids: Vec<String> = Vec::new();
    let mut compartments: Vec<Compartment> = Vec::new();
    for term in raw.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        let fields: Vec<&str> = term.split(':').collect();
        if fields.len() < 3 {
            return Err(StoichiometryError::MalformedTerm(term.to_string()));
        }
        let ratio = Ratio::parse_decimal(fields[0]).map_err(|source| {
            StoichiometryError::InvalidCoefficient {
                term: term.to_string(),
                source,
            }
        })?;
        let compound_id = fields[1].trim();
        if compound_id.is_empty() {
            return Err(StoichiometryError::MalformedTerm(term.to_string()));
        }
        let compartment = Compartment::from_code(fields[2])
            .ok_or_else(|| StoichiometryError::UnknownCompartment(fields[2].to_string()))?;
        ratios.push(ratio);
        compound_ids.push(compound_id.to_string());
        compartments.push(compartment);
    }
    if ratios.is_empty() {
        return Ok(None);
    }

    let mut scale: i64 = 1;
    for ratio in &ratios {
        scale = lcm(scale, ratio.denominator).map_err(StoichiometryError::Overflow)?;
    }
    let negated = matches!(
        (direction, reversibility),
        (DirectionCode::Forward, DirectionCode::Backward)
            | (DirectionCode::Backward, DirectionCode::Forward)
    );
    let mut coefficients: Vec<i64> = Vec::with_capacity(ratios.len());
    for ratio in &ratios {
        let coefficient = ratio
            .numerator
            .checked_mul(scale / ratio.denominator)
            .ok_or(StoichiometryError::Overflow(RatioError::Overflow))?;
        let coefficient = if negated {
            coefficient
                .checked_neg()
                .ok_or(StoichiometryError::Overflow(RatioError::Overflow))?
        } else {
            coefficient
        };
        coefficients.push(coefficient);
    }
    let reversible = matches!(
        reversibility,
        DirectionCode::Reversible | DirectionCode::Unknown
    );

    Ok(Some(NormalizedStoichiometry {
        compound_ids,
        coefficients,
        compartments,
        reversible,
        negated,
        scale,
    }))
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoichiometryError {
    #[error("Stoichiometry term {0:?} is not of the form coefficient:compound:compartment")]
    MalformedTerm(String),
    #[error("Stoichiometry term {term:?} has an invalid coefficient")]
    InvalidCoefficient {
        term: String,
        #[source]
        source: RatioError,
    },
    #[error("Unknown compartment code {0:?}")]
    UnknownCompartment(String),
    #[error("Stoichiometric coefficients are too large to scale to integers")]
    Overflow(#[source] RatioError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use Compartment::{Cytosol, Extracellular};
    use DirectionCode::{Backward, Forward, Reversible, Unknown};

    #[test]
    fn contradicting_direction_negates() {
        let stoich = normalize(
            Some("-1:cpd00001:0;1:cpd00002:0;1:cpd00003:1"),
            Forward,
            Backward,
        )
        .unwrap()
        .unwrap();
        assert_eq!(stoich.coefficients, vec![1, -1, -1]);
        assert_eq!(stoich.compartments, vec![Cytosol, Cytosol, Extracellular]);
        let tags: Vec<char> = stoich.compartments.iter().map(|c| c.tag()).collect();
        assert_eq!(tags, vec!['c', 'c', 'e']);
        assert_eq!(stoich.compound_ids, vec!["cpd00001", "cpd00002", "cpd00003"]);
        assert!(stoich.negated);
        assert!(!stoich.reversible);

        let mirrored = normalize(Some("-1:cpd00001:0;1:cpd00002:0"), Backward, Forward)
            .unwrap()
            .unwrap();
        assert_eq!(mirrored.coefficients, vec![1, -1]);
    }

    #[test]
    fn agreeing_direction_keeps_signs() {
        for (direction, reversibility) in [
            (Forward, Forward),
            (Backward, Backward),
            (Reversible, Reversible),
            (Forward, Reversible),
            (Backward, Unknown),
        ] {
            let stoich = normalize(Some("-1:cpd00001:0;2:cpd00002:0"), direction, reversibility)
                .unwrap()
                .unwrap();
            assert_eq!(stoich.coefficients, vec![-1, 2]);
        }
    }

    #[test]
    fn reversibility() {
        let stoich = |r| normalize(Some("-1:cpd00001:0"), Forward, r).unwrap().unwrap();
        assert!(stoich(Reversible).reversible);
        assert!(stoich(Unknown).reversible);
        assert!(!stoich(Forward).reversible);
        assert!(!stoich(Backward).reversible);
    }

    #[test]
    fn reaction_wide_lcm() {
        let stoich = normalize(
            Some("-0.5:cpd00001:0;-0.333333:cpd00002:0;0.25:cpd00003:0;2:cpd00004:0"),
            Forward,
            Reversible,
        )
        .unwrap()
        .unwrap();
        // Denominators 2, 1000000 and 4 share the multiple 1000000
        assert_eq!(stoich.scale, 1000000);
        assert_eq!(stoich.coefficients, vec![-500000, -333333, 250000, 2000000]);
    }

    #[test]
    fn rational_round_trip() {
        let raw = "-1.5:cpd00001:0;0.75:cpd00002:1;-3:cpd00003:0;0.125:cpd00004:0";
        let literals = ["-1.5", "0.75", "-3", "0.125"];
        for reversibility in [Forward, Backward, Reversible] {
            let stoich = normalize(Some(raw), Forward, reversibility).unwrap().unwrap();
            assert_eq!(stoich.coefficients.len(), stoich.compound_ids.len());
            assert_eq!(stoich.compartments.len(), stoich.compound_ids.len());
            let recovered = stoich.rational_coefficients().unwrap();
            for (ratio, literal) in recovered.iter().zip(literals) {
                assert_eq!(*ratio, Ratio::parse_decimal(literal).unwrap());
            }
        }
    }

    #[test]
    fn modelseed_extra_fields() {
        let stoich = normalize(
            Some(r#"-1:cpd00001:0:0:"H2O";-1:cpd00012:0:0:"PPi";2:cpd00009:0:0:"Phosphate";1:cpd00067:0:0:"H+""#),
            Forward,
            Forward,
        )
        .unwrap()
        .unwrap();
        assert_eq!(stoich.coefficients, vec![-1, -1, 2, 1]);
        assert_eq!(stoich.compound_ids[3], "cpd00067");
    }

    #[test]
    fn missing_stoichiometry_is_skipped() {
        assert_eq!(normalize(None, Forward, Forward), Ok(None));
        assert_eq!(normalize(Some(""), Forward, Forward), Ok(None));
        assert_eq!(normalize(Some("  ;  "), Forward, Forward), Ok(None));
    }

    #[test]
    fn malformed_stoichiometry() {
        assert!(matches!(
            normalize(Some("-1:cpd00001:2"), Forward, Forward),
            Err(StoichiometryError::UnknownCompartment(_))
        ));
        assert!(matches!(
            normalize(Some("-1:cpd00001"), Forward, Forward),
            Err(StoichiometryError::MalformedTerm(_))
        ));
        assert!(matches!(
            normalize(Some("x:cpd00001:0"), Forward, Forward),
            Err(StoichiometryError::InvalidCoefficient { .. })
        ));
    }

    #[test]
    fn negation_overflow_is_an_error() {
        // -2^62 scaled by 2 is i64::MIN, which has no positive counterpart
        assert_eq!(
            normalize(Some("-4611686018427387904:cpd1:0;0.5:cpd2:0"), Forward, Backward),
            Err(StoichiometryError::Overflow(RatioError::Overflow))
        );
        let scaled = normalize(Some("-4611686018427387904:cpd1:0;0.5:cpd2:0"), Forward, Forward)
            .unwrap()
            .unwrap();
        assert_eq!(scaled.coefficients[0], i64::MIN);

        let stoich = NormalizedStoichiometry {
            compound_ids: vec!["cpd1".to_string()],
            coefficients: vec![i64::MIN],
            compartments: vec![Cytosol],
            reversible: false,
            negated: true,
            scale: 1,
        };
        assert_eq!(stoich.rational_coefficients(), Err(RatioError::Overflow));
    }

    #[test]
    fn direction_codes() {
        assert_eq!(DirectionCode::parse(">"), Some(Forward));
        assert_eq!(DirectionCode::parse(" = "), Some(Reversible));
        assert_eq!(DirectionCode::parse("?"), Some(Unknown));
        assert_eq!(DirectionCode::parse("x"), None);
        assert_eq!(Backward.to_string(), "<");
    }
}
