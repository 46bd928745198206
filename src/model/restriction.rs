use std::str::FromStr;

use crate::Error;
use crate::rational::{Cursor, Rational};

use super::{Polynomial, Relation, Term};

/// A linear restriction `<polynomial> <=|>=|== <signed integer>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    poly: Polynomial,
    relation: Relation,
    right: Rational,
}

impl Restriction {
    pub fn new(relation: Relation) -> Self {
        Self {
            poly: Polynomial::new(),
            relation,
            right: Rational::default(),
        }
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn set_relation(&mut self, relation: Relation) {
        self.relation = relation;
    }

    pub fn right(&self) -> Rational {
        self.right
    }

    pub fn right_mut(&mut self) -> &mut Rational {
        &mut self.right
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
}

impl FromStr for Restriction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const BAD: Error = Error::InvalidArgument("malformed restriction");

        let (poly, rest) = Polynomial::parse_prefix(s, true).ok_or(BAD)?;

        let mut cur = Cursor::new(rest);
        let relation = match (cur.next(), cur.next()) {
            (Some(b'<'), Some(b'=')) => Relation::LessEqual,
            (Some(b'>'), Some(b'=')) => Relation::GreaterEqual,
            (Some(b'='), Some(b'=')) => Relation::Equal,
            _ => return Err(BAD),
        };

        let negative = match cur.next() {
            Some(ch) if ch.is_ascii_digit() => {
                cur.back();
                false
            }
            Some(b'-') => true,
            Some(b'+') => false,
            _ => return Err(BAD),
        };
        match cur.next() {
            Some(ch) if ch.is_ascii_digit() => cur.back(),
            _ => return Err(BAD),
        }
        let mut right = cur.scan_integer().ok_or(BAD)?;
        if negative {
            right = -right;
        }
        if cur.next().is_some() {
            return Err(BAD);
        }

        Ok(Self {
            poly,
            relation,
            right: Rational::from(right),
        })
    }
}
