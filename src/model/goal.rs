use std::str::FromStr;

use crate::Error;
use crate::rational::{Cursor, Rational};

use super::{Direction, Polynomial, Term};

/// A linear form together with the optimization direction, written
/// `<polynomial> => min|max` in the DSL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    poly: Polynomial,
    direction: Direction,
}

impl Goal {
    pub fn new(direction: Direction) -> Self {
        Self { poly: Polynomial::new(), direction }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn poly(&self) -> &Polynomial {
        &self.poly
    }

    pub fn add_term(&mut self, term: Term) {
        self.poly.add_term(term);
    }

    pub fn remove_term(&mut self, idx: usize) {
        self.poly.remove_term(idx);
    }

    pub fn term(&self, idx: usize) -> Result<Term, Error> {
        self.poly.term(idx)
    }

    pub fn terms(&self) -> &[Term] {
        self.poly.terms()
    }

    pub fn coeff(&self, idx: usize) -> Result<Rational, Error> {
        self.poly.coeff(idx)
    }

    pub fn coeff_mut(&mut self, idx: usize) -> Result<&mut Rational, Error> {
        self.poly.coeff_mut(idx)
    }

    pub fn is_big(&self, idx: usize) -> bool {
        self.poly.is_big(idx)
    }

    pub fn indices(&self) -> Vec<usize> {
        self.poly.indices()
    }

    pub fn len(&self) -> usize {
        self.poly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poly.is_empty()
    }

    pub fn last_idx(&self) -> usize {
        self.poly.last_idx()
    }

    pub fn next_idx(&self) -> usize {
        self.poly.next_idx()
    }

    /// True when some coefficient still sits on the big-M track.
    pub fn has_big(&self) -> bool {
        self.poly.terms().iter().any(Term::is_big)
    }
}

impl Default for Goal {
    fn default() -> Self {
        Self::new(Direction::Min)
    }
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const BAD: Error = Error::InvalidArgument("malformed goal");

        let (poly, rest) = Polynomial::parse_prefix(s, true).ok_or(BAD)?;

        let mut cur = Cursor::new(rest);
        if cur.next() != Some(b'=') || cur.next() != Some(b'>') {
            return Err(BAD);
        }
        // the direction word must close the input
        if cur.next().is_none() {
            return Err(BAD);
        }
        cur.back();
        let direction = cur.rest().parse::<Direction>().map_err(|_| BAD)?;

        Ok(Self { poly, direction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::Rational;

    #[test]
    fn test_parsing() {
        let g: Goal = "x2 + 3x4 => max".parse().unwrap();
        assert_eq!(g.to_string(), "[Goal: 0{X1} 1{X2} 0{X3} 3{X4} => max]");

        let g: Goal = "-4x1 + 5x3 => max".parse().unwrap();
        assert_eq!(g.to_string(), "[Goal: -4{X1} 0{X2} 5{X3} => max]");

        let g: Goal = "3x1 - 5x2 + 0x3 => min".parse().unwrap();
        assert_eq!(g.to_string(), "[Goal: 3{X1} -5{X2} 0{X3} => min]");

        assert!("3x1 - 5x2 + 0x3 > min".parse::<Goal>().is_err());
        assert!("3x1 - 5x2 + 0x3 >> max".parse::<Goal>().is_err());
        assert!("3x1 - 5x2 + 0x3 >= min".parse::<Goal>().is_err());
        assert!("3x1 - 5x2 => middle".parse::<Goal>().is_err());
        assert!("3x1 - 5x2 =>".parse::<Goal>().is_err());
    }

    #[test]
    fn test_accessors() {
        let mut g: Goal = "x2 + 3x4 => max".parse().unwrap();
        g.remove_term(1);
        g.remove_term(3);
        assert_eq!(g.len(), 2);
        assert_eq!(g.to_string(), "[Goal: 1{X2} 3{X4} => max]");

        g.add_term(Term::new(1, Rational::new(2, 3).unwrap()));
        assert_eq!(g.to_string(), "[Goal: 2/3{X1} 1{X2} 0{X3} 3{X4} => max]");

        // a zero term merges without changing anything
        g.add_term(Term::zero(1));
        assert_eq!(g.to_string(), "[Goal: 2/3{X1} 1{X2} 0{X3} 3{X4} => max]");

        g.add_term(Term::big_m(5, Rational::from(1)));
        assert_eq!(g.to_string(), "[Goal: 2/3{X1} 1{X2} 0{X3} 3{X4} 1M{X5} => max]");
        assert!(g.has_big());

        assert_eq!(g.direction(), Direction::Max);
        g.set_direction(Direction::Min);
        assert_eq!(g.direction(), Direction::Min);
    }
}
