use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::RangeInclusive;
use std::str::FromStr;

use workbench_expr::DomainExpression;
use workbench_expr::ParseError;
use workbench_expr::RangeExpression;

/// Misuse of a constructor; reported immediately rather than during validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ArgumentError {
    #[error("a name must not be empty")]
    EmptyName,
    #[error("the lower band {lower} exceeds the upper band {upper}")]
    InvertedBand { lower: i32, upper: i32 },
}

pub(crate) fn check_name(name: String) -> Result<String, ArgumentError> {
    if name.trim().is_empty() {
        Err(ArgumentError::EmptyName)
    } else {
        Ok(name)
    }
}

/// An inclusive, non-empty range of integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Band {
    lower: i32,
    upper: i32,
}

impl Band {
    pub fn new(lower: i32, upper: i32) -> Result<Band, ArgumentError> {
        if lower > upper {
            return Err(ArgumentError::InvertedBand { lower, upper });
        }

        Ok(Band { lower, upper })
    }

    /// The band containing only `value`.
    pub fn fixed(value: i32) -> Band {
        Band {
            lower: value,
            upper: value,
        }
    }

    pub fn lower(&self) -> i32 {
        self.lower
    }

    pub fn upper(&self) -> i32 {
        self.upper
    }

    /// The number of values in the band.
    pub fn size(&self) -> u64 {
        (i64::from(self.upper) - i64::from(self.lower) + 1) as u64
    }

    pub fn values(&self) -> RangeInclusive<i32> {
        self.lower..=self.upper
    }

    pub fn contains(&self, value: i32) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn is_subset_of(&self, other: &Band) -> bool {
        other.lower <= self.lower && self.upper <= other.upper
    }
}

impl TryFrom<RangeExpression> for Band {
    type Error = ArgumentError;

    fn try_from(range: RangeExpression) -> Result<Self, Self::Error> {
        Band::new(range.lower, range.upper)
    }
}

impl From<Band> for RangeExpression {
    fn from(band: Band) -> Self {
        RangeExpression {
            lower: band.lower,
            upper: band.upper,
        }
    }
}

impl FromStr for Band {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let range: RangeExpression = s.parse()?;
        // The range parser rejects inverted bands.
        debug_assert!(range.lower <= range.upper);

        Ok(Band {
            lower: range.lower,
            upper: range.upper,
        })
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.lower, self.upper)
    }
}

/// The domain of a variable: either a band of its own, or the name of a [`SharedDomain`] declared
/// on the model.
///
/// Shared domains are looked up by name whenever the domain is needed, so a variable may refer
/// to a shared domain that is declared after it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    Inline(Band),
    Shared(String),
}

impl Domain {
    pub fn shared(name: impl Into<String>) -> Domain {
        Domain::Shared(name.into())
    }
}

impl From<Band> for Domain {
    fn from(band: Band) -> Self {
        Domain::Inline(band)
    }
}

impl FromStr for Domain {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<DomainExpression>()? {
            DomainExpression::Inline(range) => Ok(Domain::Inline(Band {
                lower: range.lower,
                upper: range.upper,
            })),
            DomainExpression::Shared(name) => Ok(Domain::Shared(name)),
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Inline(band) => write!(f, "{band}"),
            Domain::Shared(name) => write!(f, "{name}"),
        }
    }
}

/// A named band that several variables can refer to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SharedDomain {
    name: String,
    band: Band,
}

impl SharedDomain {
    pub fn new(name: impl Into<String>, band: Band) -> Result<SharedDomain, ArgumentError> {
        Ok(SharedDomain {
            name: check_name(name.into())?,
            band,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn set_band(&mut self, band: Band) {
        self.band = band;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_rejects_inverted_bounds() {
        assert_eq!(
            Err(ArgumentError::InvertedBand { lower: 5, upper: 4 }),
            Band::new(5, 4)
        );
    }

    #[test]
    fn band_values_and_size() {
        let band: Band = "1..9".parse().expect("valid band");

        assert_eq!(9, band.size());
        assert_eq!((1..=9).collect::<Vec<_>>(), band.values().collect::<Vec<_>>());
        assert!(band.contains(1));
        assert!(band.contains(9));
        assert!(!band.contains(10));
    }

    #[test]
    fn subset() {
        let outer = Band::new(1, 10).expect("valid band");

        assert!(Band::new(2, 5).expect("valid band").is_subset_of(&outer));
        assert!(outer.is_subset_of(&outer));
        assert!(!Band::new(0, 5).expect("valid band").is_subset_of(&outer));
        assert!(!Band::new(5, 11).expect("valid band").is_subset_of(&outer));
    }

    #[test]
    fn domain_parses_both_forms() {
        assert_eq!(
            Ok(Domain::Inline(Band::fixed(3))),
            "3..3".parse::<Domain>()
        );
        assert_eq!(Ok(Domain::shared("digits")), "digits".parse::<Domain>());
        assert!("".parse::<Domain>().is_err());
    }

    #[test]
    fn shared_domain_requires_a_name() {
        assert_eq!(
            Err(ArgumentError::EmptyName),
            SharedDomain::new(" ", Band::fixed(1))
        );
    }
}
