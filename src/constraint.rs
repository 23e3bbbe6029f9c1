//! Matching constraints governing cardinality in collection comparisons.
use std::fmt::Display;
use std::str::FromStr;

use crate::errors::SimatchError;

/// Cardinality constraint applied when matching two collections.
///
/// # Conversion from/into string representation
///
/// The [`FromStr`] trait is implemented to allow instantiating
/// a [`MatchingKind`] from its string representation, as follows:
///
/// ```rust
/// use simatch::MatchingKind;
///
/// assert_eq!("<->".parse::<MatchingKind>(), Ok(MatchingKind::OneToOne));
/// assert_eq!("1:1".parse::<MatchingKind>(), Ok(MatchingKind::OneToOne));
/// assert_eq!("~".parse::<MatchingKind>(), Ok(MatchingKind::ManyToMany));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchingKind {
    /// Every item on either side is matched at most once.
    OneToOne,

    /// One prediction item may cover many reference items.
    OneToMany,

    /// Many prediction items may map onto one reference item.
    ManyToOne,

    /// No cardinality restriction.
    ManyToMany,
}

impl Display for MatchingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::OneToOne => write!(f, "1:1"),
            Self::OneToMany => write!(f, "1:*"),
            Self::ManyToOne => write!(f, "*:1"),
            Self::ManyToMany => write!(f, "*:*"),
        }
    }
}

impl FromStr for MatchingKind {
    type Err = SimatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<->" | "1:1" => Ok(Self::OneToOne),
            "<-" | "1:*" => Ok(Self::OneToMany),
            "->" | "*:1" => Ok(Self::ManyToOne),
            "~" | "*:*" => Ok(Self::ManyToMany),
            _ => Err(SimatchError::InvalidConfiguration(format!(
                "Unknown matching kind: {s}"
            ))),
        }
    }
}
