//! Exact rational arithmetic for stoichiometric coefficients written as decimal literals
use thiserror::Error;

/// A reduced fraction with a strictly positive denominator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ratio {
    pub numerator: i64,
    pub denominator: i64,
}

impl Ratio {
    /// Create a new ratio, reduced to lowest terms with a positive denominator
    pub fn new(numerator: i64, denominator: i64) -> Result<Ratio, RatioError> {
        if denominator == 0 {
            return Err(RatioError::ZeroDenominator);
        }
        let divisor = gcd(numerator, denominator).max(1);
        let (mut n, mut d) = (numerator / divisor, denominator / divisor);
        if d < 0 {
            n = n.checked_neg().ok_or(RatioError::Overflow)?;
            d = d.checked_neg().ok_or(RatioError::Overflow)?;
        }
        Ok(Ratio {
            numerator: n,
            denominator: d,
        })
    }

    /// Parse a decimal literal such as `-1`, `0.5`, `+2.000` or `.25` into an exact ratio
    ///
    /// The literal digits are used directly, so `0.333333` is exactly `333333/1000000`
    /// rather than the nearest binary float.
    pub fn parse_decimal(literal: &str) -> Result<Ratio, RatioError> {
        let text = literal.trim();
        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(RatioError::InvalidLiteral(literal.to_string()));
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(RatioError::InvalidLiteral(literal.to_string()));
        }
        // Trailing zeros in the fraction carry no information
        let fraction = fraction.trim_end_matches('0');

        let mut numerator: i64 = 0;
        for digit in whole.bytes().chain(fraction.bytes()) {
            numerator = numerator
                .checked_mul(10)
                .and_then(|n| n.checked_add(i64::from(digit - b'0')))
                .ok_or(RatioError::Overflow)?;
        }
        let exponent = u32::try_from(fraction.len()).map_err(|_| RatioError::Overflow)?;
        let denominator = 10i64.checked_pow(exponent).ok_or(RatioError::Overflow)?;
        if negative {
            numerator = -numerator;
        }
        Ratio::new(numerator, denominator)
    }
}

/// Greatest common divisor (always non-negative, `gcd(0, 0) == 0`)
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a as i64
}

/// Least common multiple of two positive integers
pub fn lcm(a: i64, b: i64) -> Result<i64, RatioError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b))
        .checked_mul(b)
        .map(i64::abs)
        .ok_or(RatioError::Overflow)
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RatioError {
    #[error("Invalid decimal literal: {0:?}")]
    InvalidLiteral(String),
    #[error("Denominator of zero")]
    ZeroDenominator,
    #[error("Integer overflow while computing an exact ratio")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_integers() {
        assert_eq!(Ratio::parse_decimal("-1").unwrap(), Ratio::new(-1, 1).unwrap());
        assert_eq!(Ratio::parse_decimal("2").unwrap(), Ratio::new(2, 1).unwrap());
        assert_eq!(Ratio::parse_decimal("+3").unwrap(), Ratio::new(3, 1).unwrap());
    }

    #[test]
    fn parse_fractions() {
        let half = Ratio::parse_decimal("0.5").unwrap();
        assert_eq!(half.numerator, 1);
        assert_eq!(half.denominator, 2);

        let third = Ratio::parse_decimal("-0.333333").unwrap();
        assert_eq!(third.numerator, -333333);
        assert_eq!(third.denominator, 1000000);

        let trailing = Ratio::parse_decimal("2.000").unwrap();
        assert_eq!(trailing, Ratio::new(2, 1).unwrap());

        let bare = Ratio::parse_decimal(".25").unwrap();
        assert_eq!(bare, Ratio::new(1, 4).unwrap());
    }

    #[test]
    fn reject_bad_literals() {
        assert!(Ratio::parse_decimal("").is_err());
        assert!(Ratio::parse_decimal("-").is_err());
        assert!(Ratio::parse_decimal("1e-3").is_err());
        assert!(Ratio::parse_decimal("one").is_err());
        assert!(Ratio::parse_decimal("1.2.3").is_err());
    }

    #[test]
    fn gcd_lcm() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(-4, 6), 2);
        assert_eq!(gcd(0, 5), 5);
        assert_eq!(lcm(4, 6).unwrap(), 12);
        assert_eq!(lcm(1, 1000000).unwrap(), 1000000);
    }
}
