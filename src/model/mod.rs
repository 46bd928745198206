pub mod displays;
pub mod goal;
pub mod polynomial;
pub mod restriction;
pub mod term;

use std::str::FromStr;

use crate::Error;

pub use goal::Goal;
pub use polynomial::Polynomial;
pub use restriction::Restriction;
pub use term::Term;

/// Optimization direction of a [`Goal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Min,
    Max,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Min => "min",
            Direction::Max => "max",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(Direction::Min),
            "max" => Ok(Direction::Max),
            _ => Err(Error::InvalidArgument("unknown goal direction")),
        }
    }
}

/// Relation of a [`Restriction`] to its right side. Strict comparisons are
/// not part of LP syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::LessEqual => "<=",
            Relation::GreaterEqual => ">=",
            Relation::Equal => "==",
        }
    }
}

impl FromStr for Relation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<=" => Ok(Relation::LessEqual),
            ">=" => Ok(Relation::GreaterEqual),
            "==" => Ok(Relation::Equal),
            _ => Err(Error::InvalidArgument("unknown restriction relation")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trip() {
        assert_eq!("min".parse::<Direction>(), Ok(Direction::Min));
        assert_eq!("max".parse::<Direction>(), Ok(Direction::Max));
        assert!("chewy".parse::<Direction>().is_err());
        assert_eq!(Direction::Max.as_str(), "max");
    }

    #[test]
    fn test_relation_round_trip() {
        assert_eq!("<=".parse::<Relation>(), Ok(Relation::LessEqual));
        assert_eq!(">=".parse::<Relation>(), Ok(Relation::GreaterEqual));
        assert_eq!("==".parse::<Relation>(), Ok(Relation::Equal));
        assert!("<".parse::<Relation>().is_err());
        assert!("--->".parse::<Relation>().is_err());
    }
}
